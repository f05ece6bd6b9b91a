/// How kernel taps that fall outside the image are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderMode {
    /// Mirror the coordinate around zero, `|i + k - kd|`. A coordinate that is still
    /// outside the image after mirroring falls back to the unshifted center coordinate.
    ///
    /// Example: `len = 4`, center `c = 3`: ...2 1 | 0 1 2 3 | 3 3...
    #[default]
    Legacy,

    /// Repeat the outermost pixel into the border.
    ///
    /// Example: ...a a | a b c d | d d...
    Replicate,

    /// Reflect the pixel values at the boundary, starting with the pixel 'next' to the edge.
    ///
    /// Example: ...c b | a b c d | c b...
    Reflect101,
}

impl BorderMode {
    /// Map a kernel tap to a valid index along one axis.
    ///
    /// # Arguments
    ///
    /// * `axis` - The coordinate of the output pixel along the axis.
    /// * `k` - The kernel index along the axis.
    /// * `kd` - The kernel center offset along the axis.
    /// * `len` - The image dimension along the axis.
    ///
    /// PRECONDITION: `axis < len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use filtra_imgproc::filter::BorderMode;
    ///
    /// // a 3 tap kernel at the first column mirrors to the right
    /// let taps: Vec<usize> = (0..3).map(|k| BorderMode::Legacy.sample(0, k, 1, 5)).collect();
    /// assert_eq!(taps, vec![1, 0, 1]);
    ///
    /// // past the last column the center column is reused
    /// assert_eq!(BorderMode::Legacy.sample(4, 2, 1, 5), 4);
    /// ```
    #[inline]
    pub fn sample(self, axis: usize, k: usize, kd: usize, len: usize) -> usize {
        let i = axis as isize + k as isize - kd as isize;
        match self {
            BorderMode::Legacy => {
                let c = i.unsigned_abs();
                if c >= len {
                    axis
                } else {
                    c
                }
            }
            BorderMode::Replicate => i.clamp(0, len as isize - 1) as usize,
            BorderMode::Reflect101 => reflect101(i, len),
        }
    }
}

#[inline]
fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * len - i - 2;
        }
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taps(mode: BorderMode, axis: usize, size: usize, len: usize) -> Vec<usize> {
        (0..size).map(|k| mode.sample(axis, k, size / 2, len)).collect()
    }

    #[test]
    fn test_legacy_interior() {
        assert_eq!(taps(BorderMode::Legacy, 2, 3, 5), vec![1, 2, 3]);
        assert_eq!(taps(BorderMode::Legacy, 2, 5, 5), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_legacy_low_edge_mirrors() {
        assert_eq!(taps(BorderMode::Legacy, 0, 3, 5), vec![1, 0, 1]);
        assert_eq!(taps(BorderMode::Legacy, 0, 5, 5), vec![2, 1, 0, 1, 2]);
        assert_eq!(taps(BorderMode::Legacy, 1, 5, 5), vec![1, 0, 1, 2, 3]);
    }

    #[test]
    fn test_legacy_high_edge_falls_back_to_center() {
        assert_eq!(taps(BorderMode::Legacy, 4, 3, 5), vec![3, 4, 4]);
        assert_eq!(taps(BorderMode::Legacy, 4, 5, 5), vec![2, 3, 4, 4, 4]);
        assert_eq!(taps(BorderMode::Legacy, 3, 5, 5), vec![1, 2, 3, 4, 3]);
    }

    #[test]
    fn test_legacy_kernel_larger_than_image() {
        // mirrored taps that are still outside fall back to the center
        assert_eq!(taps(BorderMode::Legacy, 0, 7, 2), vec![0, 0, 1, 0, 1, 0, 0]);
        assert_eq!(taps(BorderMode::Legacy, 0, 3, 1), vec![0, 0, 0]);
    }

    #[test]
    fn test_replicate() {
        assert_eq!(taps(BorderMode::Replicate, 0, 5, 5), vec![0, 0, 0, 1, 2]);
        assert_eq!(taps(BorderMode::Replicate, 4, 5, 5), vec![2, 3, 4, 4, 4]);
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(taps(BorderMode::Reflect101, 0, 5, 5), vec![2, 1, 0, 1, 2]);
        assert_eq!(taps(BorderMode::Reflect101, 4, 5, 5), vec![2, 3, 4, 3, 2]);
        assert_eq!(taps(BorderMode::Reflect101, 0, 3, 1), vec![0, 0, 0]);
    }
}
