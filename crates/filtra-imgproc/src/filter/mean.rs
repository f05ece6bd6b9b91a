use std::str::FromStr;

use crate::error::FilterError;

/// Strategy used to combine the magnitudes of several kernels at one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeanFormula {
    /// `sum(m) / K`
    #[default]
    Arithmetic,
    /// `prod(m) ^ (1 / K)`
    Geometric,
    /// `(sum(m²) / K) ^ (1 / K)`
    ///
    /// NOTE: the exponent is `1 / K` rather than `1 / 2`, so this only matches a true
    /// root mean square for two kernels.
    RootMeanSquare,
}

impl MeanFormula {
    /// The value the accumulator starts from.
    #[inline]
    pub fn identity(self) -> f64 {
        match self {
            MeanFormula::Arithmetic | MeanFormula::RootMeanSquare => 0.0,
            MeanFormula::Geometric => 1.0,
        }
    }

    /// Fold the magnitude of one kernel into the accumulator.
    #[inline]
    pub fn fold(self, acc: f64, magnitude: f64) -> f64 {
        match self {
            MeanFormula::Arithmetic => acc + magnitude,
            MeanFormula::Geometric => acc * magnitude,
            MeanFormula::RootMeanSquare => acc + magnitude * magnitude,
        }
    }

    /// Turn the accumulator into the final value after `count` kernels were folded.
    #[inline]
    pub fn normalize(self, acc: f64, count: usize) -> f64 {
        let k = count as f64;
        match self {
            MeanFormula::Arithmetic => acc / k,
            MeanFormula::Geometric => acc.powf(1.0 / k),
            MeanFormula::RootMeanSquare => (acc / k).powf(1.0 / k),
        }
    }

    /// Combine a sequence of kernel magnitudes.
    ///
    /// # Examples
    ///
    /// ```
    /// use filtra_imgproc::filter::MeanFormula;
    ///
    /// assert_eq!(MeanFormula::Arithmetic.combine([2.0, 4.0]), 3.0);
    /// assert_eq!(MeanFormula::Geometric.combine([2.0, 8.0]), 4.0);
    /// ```
    pub fn combine(self, magnitudes: impl IntoIterator<Item = f64>) -> f64 {
        let mut count = 0;
        let acc = magnitudes.into_iter().fold(self.identity(), |acc, m| {
            count += 1;
            self.fold(acc, m)
        });
        self.normalize(acc, count)
    }
}

impl TryFrom<i32> for MeanFormula {
    type Error = FilterError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(MeanFormula::Arithmetic),
            1 => Ok(MeanFormula::Geometric),
            2 => Ok(MeanFormula::RootMeanSquare),
            _ => Err(FilterError::UnknownMeanFormula(tag.to_string())),
        }
    }
}

impl FromStr for MeanFormula {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arithmetic" => Ok(MeanFormula::Arithmetic),
            "geometric" => Ok(MeanFormula::Geometric),
            "rms" | "root_mean_square" => Ok(MeanFormula::RootMeanSquare),
            _ => Err(FilterError::UnknownMeanFormula(s.to_string())),
        }
    }
}

impl std::fmt::Display for MeanFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            MeanFormula::Arithmetic => "arithmetic",
            MeanFormula::Geometric => "geometric",
            MeanFormula::RootMeanSquare => "root_mean_square",
        };
        f.write_str(name)
    }
}
