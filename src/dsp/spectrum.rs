//! FFT magnitude spectrum

use super::DspError;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Computes the half-spectrum magnitude of fixed-length real chunks.
///
/// The forward FFT is planned once per configuration. rustfft picks a
/// radix-2 kernel for power-of-two sizes and falls back to mixed-radix
/// otherwise, so the chunk size does not have to be a power of two.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize) -> Result<Self, DspError> {
        if size < 2 {
            return Err(DspError::InvalidLength(size));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Ok(Self { fft, size })
    }

    /// Number of output bins: N/2 + 1 (DC through Nyquist).
    pub fn num_bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Magnitude spectrum of a windowed chunk.
    ///
    /// Real input gives a Hermitian-symmetric spectrum, so only the
    /// non-negative frequency bins are returned.
    pub fn magnitudes(&self, samples: &[f32]) -> Result<Vec<f32>, DspError> {
        if samples.len() != self.size {
            return Err(DspError::LengthMismatch {
                expected: self.size,
                actual: samples.len(),
            });
        }

        let mut buffer: Vec<Complex<f32>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        self.fft.process(&mut buffer);

        Ok(buffer
            .iter()
            .take(self.num_bins())
            .map(|c| c.norm())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn zero_input_gives_zero_spectrum() {
        let analyzer = SpectrumAnalyzer::new(1024).unwrap();
        let magnitudes = analyzer.magnitudes(&vec![0.0; 1024]).unwrap();
        assert_eq!(magnitudes.len(), 513);
        assert!(magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn bin_aligned_sine_peaks_at_its_bin() {
        let n = 1024;
        let k = 32;
        let analyzer = SpectrumAnalyzer::new(n).unwrap();
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();

        let magnitudes = analyzer.magnitudes(&signal).unwrap();
        assert_eq!(argmax(&magnitudes), k);
    }

    #[test]
    fn supports_non_power_of_two_sizes() {
        let n = 1000;
        let k = 50;
        let analyzer = SpectrumAnalyzer::new(n).unwrap();
        let signal: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();

        let magnitudes = analyzer.magnitudes(&signal).unwrap();
        assert_eq!(magnitudes.len(), 501);
        assert_eq!(argmax(&magnitudes), k);
    }

    #[test]
    fn rejects_wrong_input_length() {
        let analyzer = SpectrumAnalyzer::new(1024).unwrap();
        assert!(analyzer.magnitudes(&vec![0.0; 512]).is_err());
    }
}
