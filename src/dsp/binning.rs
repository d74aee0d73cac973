//! Logarithmic frequency binning

use super::DspError;

/// Aggregates FFT bins into a fixed number of log-spaced frequency bars.
///
/// The (start, end) bin-index table is a pure function of
/// (bar count, sample rate, chunk size, minimum frequency) and is
/// computed once at construction. Bars are ordered low to high
/// frequency; consecutive ranges share an edge, so every bin from the
/// first edge to Nyquist belongs to exactly one bar.
pub struct LogBinner {
    ranges: Vec<(usize, usize)>,
    num_bins: usize,
}

impl LogBinner {
    pub fn new(
        num_bars: usize,
        sample_rate: u32,
        chunk_size: usize,
        min_frequency: f32,
    ) -> Result<Self, DspError> {
        if num_bars == 0 {
            return Err(DspError::InvalidLength(0));
        }
        if chunk_size < 2 {
            return Err(DspError::InvalidLength(chunk_size));
        }

        let num_bins = chunk_size / 2 + 1;
        let freq_resolution = f64::from(sample_rate) / chunk_size as f64;
        let log_min = f64::from(min_frequency).log10();
        let log_max = (f64::from(sample_rate) / 2.0).log10();

        // num_bars + 1 log-spaced edges from min_frequency to Nyquist,
        // truncated to bin indices and clamped to the spectrum range.
        let edge_bin = |i: usize| -> usize {
            let t = i as f64 / num_bars as f64;
            let freq = 10f64.powf(log_min + t * (log_max - log_min));
            ((freq / freq_resolution) as usize).min(num_bins - 1)
        };

        let ranges = (0..num_bars)
            .map(|i| (edge_bin(i), edge_bin(i + 1)))
            .collect();

        Ok(Self { ranges, num_bins })
    }

    pub fn num_bars(&self) -> usize {
        self.ranges.len()
    }

    /// The cached (start, end) bin-index table, one entry per bar.
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }

    /// Aggregate a magnitude spectrum into one value per bar.
    ///
    /// A bar whose range spans at least one bin takes the arithmetic
    /// mean over [start, end). Narrow high-resolution bars whose edges
    /// truncate to the same bin fall back to that single bin's
    /// magnitude.
    pub fn bin(&self, magnitudes: &[f32]) -> Result<Vec<f32>, DspError> {
        if magnitudes.len() != self.num_bins {
            return Err(DspError::LengthMismatch {
                expected: self.num_bins,
                actual: magnitudes.len(),
            });
        }

        let mut bars = Vec::with_capacity(self.ranges.len());
        for &(start, end) in &self.ranges {
            if start < end {
                let sum: f32 = magnitudes[start..end].iter().sum();
                bars.push(sum / (end - start) as f32);
            } else {
                bars.push(magnitudes[start]);
            }
        }
        Ok(bars)
    }
}
