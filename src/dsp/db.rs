//! Linear magnitude to decibel conversion

/// Floor applied before log10 so silent bins don't produce -infinity.
pub const DB_EPSILON: f32 = 1e-10;

/// 20 * log10(max(m, epsilon)), clamped below at `floor`.
///
/// Only the snapshot path uses dB; the real-time path keeps linear
/// magnitude. There is no ceiling, clipping on top is left to the
/// display scale.
pub fn convert_to_db(magnitude: f32, floor: f32) -> f32 {
    let db = 20.0 * magnitude.max(DB_EPSILON).log10();
    db.max(floor)
}

/// Element-wise `convert_to_db` over a slice.
pub fn to_db(magnitudes: &[f32], floor: f32) -> Vec<f32> {
    magnitudes
        .iter()
        .map(|&m| convert_to_db(m, floor))
        .collect()
}
