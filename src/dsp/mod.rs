//! Signal-processing pipeline
//!
//! Windowing, FFT magnitude, decibel scaling, logarithmic binning and
//! temporal smoothing. Everything here is deterministic and free of
//! shared state, so the pipeline can run inside the audio callback
//! without any locking of its own.

mod binning;
mod db;
mod smoothing;
mod spectrum;
mod window;

pub use binning::LogBinner;
pub use db::{convert_to_db, to_db, DB_EPSILON};
pub use smoothing::TemporalSmoother;
pub use spectrum::SpectrumAnalyzer;
pub use window::HannWindow;

use crate::audio::AudioConfig;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum DspError {
    #[error("Invalid buffer length: {0}")]
    InvalidLength(usize),

    #[error("Buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Every intermediate stage of one chunk's analysis, for diagnostic
/// display. Recomputed on demand, never on the real-time path.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    /// Raw mono chunk as captured
    pub raw_chunk: Vec<f32>,

    /// Chunk after the Hann taper
    pub windowed: Vec<f32>,

    /// Half-spectrum linear magnitude (N/2 + 1 bins)
    pub magnitude: Vec<f32>,

    /// Log-binned bars converted to dB
    pub binned_db: Vec<f32>,
}

/// The chunk-to-bands pipeline: Hann window -> FFT magnitude ->
/// logarithmic binning.
///
/// Window coefficients, the FFT plan and the bin-index table are all
/// precomputed from the configuration; changing chunk size or bar
/// count means building a new pipeline.
pub struct SpectrumPipeline {
    window: HannWindow,
    analyzer: SpectrumAnalyzer,
    binner: LogBinner,
    db_floor: f32,
}

impl SpectrumPipeline {
    pub fn new(config: &AudioConfig) -> Result<Self, DspError> {
        Ok(Self {
            window: HannWindow::new(config.chunk_size)?,
            analyzer: SpectrumAnalyzer::new(config.chunk_size)?,
            binner: LogBinner::new(
                config.num_bars,
                config.sample_rate,
                config.chunk_size,
                config.min_frequency,
            )?,
            db_floor: config.db_floor,
        })
    }

    /// Real-time path: one chunk in, linear-magnitude bars out.
    pub fn process(&self, chunk: &[f32]) -> Result<Vec<f32>, DspError> {
        let windowed = self.window.apply(chunk)?;
        let magnitude = self.analyzer.magnitudes(&windowed)?;
        self.binner.bin(&magnitude)
    }

    /// Diagnostic path: recompute the whole pipeline and keep every
    /// intermediate array. The binned bars are additionally converted
    /// to dB.
    pub fn snapshot(&self, chunk: &[f32]) -> Result<PipelineSnapshot, DspError> {
        let windowed = self.window.apply(chunk)?;
        let magnitude = self.analyzer.magnitudes(&windowed)?;
        let binned = self.binner.bin(&magnitude)?;
        let binned_db = to_db(&binned, self.db_floor);

        Ok(PipelineSnapshot {
            raw_chunk: chunk.to_vec(),
            windowed,
            magnitude,
            binned_db,
        })
    }

    /// The binner's cached (start, end) bin-index table.
    pub fn bin_ranges(&self) -> &[(usize, usize)] {
        self.binner.ranges()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn test_config() -> AudioConfig {
        AudioConfig::default()
    }

    fn sine_chunk(freq: f32, config: &AudioConfig) -> Vec<f32> {
        (0..config.chunk_size)
            .map(|i| (2.0 * PI * freq * i as f32 / config.sample_rate as f32).sin())
            .collect()
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn one_khz_sine_peaks_in_the_bar_containing_one_khz() {
        let config = test_config();
        let pipeline = SpectrumPipeline::new(&config).unwrap();
        let bands = pipeline.process(&sine_chunk(1000.0, &config)).unwrap();
        assert_eq!(bands.len(), config.num_bars);

        // The FFT bin holding 1 kHz at 44.1 kHz / 2048 samples.
        let target_bin =
            (1000.0 * config.chunk_size as f32 / config.sample_rate as f32) as usize;
        let target_bar = pipeline
            .bin_ranges()
            .iter()
            .position(|&(start, end)| {
                if start < end {
                    (start..end).contains(&target_bin)
                } else {
                    start == target_bin
                }
            })
            .unwrap();

        assert_eq!(argmax(&bands), target_bar);
    }

    #[test]
    fn silent_chunk_produces_zero_bands() {
        let config = test_config();
        let pipeline = SpectrumPipeline::new(&config).unwrap();
        let bands = pipeline.process(&vec![0.0; config.chunk_size]).unwrap();
        assert!(bands.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn snapshot_exposes_every_stage() {
        let config = test_config();
        let pipeline = SpectrumPipeline::new(&config).unwrap();
        let chunk = sine_chunk(440.0, &config);
        let snapshot = pipeline.snapshot(&chunk).unwrap();

        assert_eq!(snapshot.raw_chunk, chunk);
        assert_eq!(snapshot.windowed.len(), config.chunk_size);
        assert_eq!(snapshot.magnitude.len(), config.chunk_size / 2 + 1);
        assert_eq!(snapshot.binned_db.len(), config.num_bars);
        assert!(snapshot
            .binned_db
            .iter()
            .all(|&db| db >= config.db_floor));
    }

    #[test]
    fn process_rejects_malformed_chunk() {
        let config = test_config();
        let pipeline = SpectrumPipeline::new(&config).unwrap();
        assert!(pipeline.process(&vec![0.0; config.chunk_size - 1]).is_err());
    }
}
