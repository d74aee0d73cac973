//! Raised-cosine (Hann) analysis window

use super::DspError;

/// Hann window coefficients precomputed for a fixed chunk length.
///
/// Tapering each chunk before the FFT reduces spectral leakage from the
/// discontinuity at the chunk edges.
pub struct HannWindow {
    coeffs: Vec<f32>,
}

impl HannWindow {
    /// Precompute w(i) = 0.5 * (1 - cos(2*pi*i / (len-1))) for i in [0, len).
    pub fn new(len: usize) -> Result<Self, DspError> {
        if len < 2 {
            return Err(DspError::InvalidLength(len));
        }

        let denom = (len - 1) as f32;
        let coeffs = (0..len)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos()))
            .collect();

        Ok(Self { coeffs })
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Multiply a chunk by the window, returning a new buffer.
    pub fn apply(&self, chunk: &[f32]) -> Result<Vec<f32>, DspError> {
        if chunk.len() != self.coeffs.len() {
            return Err(DspError::LengthMismatch {
                expected: self.coeffs.len(),
                actual: chunk.len(),
            });
        }

        Ok(chunk
            .iter()
            .zip(self.coeffs.iter())
            .map(|(&s, &w)| s * w)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_matches_input() {
        let window = HannWindow::new(2048).unwrap();
        let chunk = vec![1.0; 2048];
        assert_eq!(window.apply(&chunk).unwrap().len(), 2048);
    }

    #[test]
    fn endpoints_are_zero() {
        let window = HannWindow::new(1024).unwrap();
        let windowed = window.apply(&vec![1.0; 1024]).unwrap();
        assert!(windowed[0].abs() < 1e-6);
        assert!(windowed[1023].abs() < 1e-6);
    }

    #[test]
    fn midpoint_is_unity_for_odd_length() {
        let window = HannWindow::new(1025).unwrap();
        let windowed = window.apply(&vec![1.0; 1025]).unwrap();
        assert!((windowed[512] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn windowing_is_not_idempotent() {
        let window = HannWindow::new(64).unwrap();
        let chunk = vec![1.0; 64];
        let once = window.apply(&chunk).unwrap();
        let twice = window.apply(&once).unwrap();
        // Re-windowing squares the taper, so interior samples must shrink.
        assert!(twice[20] < once[20]);
    }

    #[test]
    fn rejects_length_below_two() {
        assert!(matches!(HannWindow::new(0), Err(DspError::InvalidLength(0))));
        assert!(matches!(HannWindow::new(1), Err(DspError::InvalidLength(1))));
    }

    #[test]
    fn rejects_mismatched_chunk() {
        let window = HannWindow::new(64).unwrap();
        assert!(window.apply(&vec![0.0; 63]).is_err());
    }
}
