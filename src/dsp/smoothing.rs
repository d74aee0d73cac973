//! Exponential smoothing across display refreshes

/// Per-bar exponential moving average owned by the display timeline.
///
/// state <- alpha * state + (1 - alpha) * input on every refresh tick.
/// Alpha closer to 1 means smoother and slower; the effective time
/// constant is relative to the tick cadence, so changing the refresh
/// interval changes how the display feels.
pub struct TemporalSmoother {
    state: Vec<f32>,
    alpha: f32,
}

impl TemporalSmoother {
    pub fn new(num_bars: usize, alpha: f32) -> Self {
        Self {
            state: vec![0.0; num_bars],
            alpha,
        }
    }

    /// Fold the newest bands into the state and return it.
    pub fn update(&mut self, bands: &[f32]) -> &[f32] {
        for (s, &v) in self.state.iter_mut().zip(bands.iter()) {
            *s = self.alpha * *s + (1.0 - self.alpha) * v;
        }
        &self.state
    }

    pub fn values(&self) -> &[f32] {
        &self.state
    }
}
