use std::f32::consts::PI;

/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, flooring silence at -100 dB.
#[inline]
pub fn lin_to_db(lin: f32) -> f32 {
    if lin > 1e-10 {
        20.0 * lin.log10()
    } else {
        -100.0
    }
}

/// One-pole smoothing coefficient for a cutoff frequency.
///
/// Returns `exp(-2π · cutoff_hz / rate_hz)`. Used as the feedback term `a` in
/// `y[n] = (1 - a)·x[n] + a·y[n-1]`.
#[inline]
pub fn one_pole_coefficient(cutoff_hz: f32, rate_hz: f32) -> f32 {
    (-2.0 * PI * cutoff_hz / rate_hz).exp()
}

/// Exponential (log-frequency) mapping of `normalized` in [0,1] onto `[min, max]`.
///
/// `min · (max / min)^normalized`
#[inline]
pub fn map_exponential(normalized: f32, min: f32, max: f32) -> f32 {
    min * (max / min).powf(normalized.clamp(0.0, 1.0))
}

/// Clamp a caller-supplied value, mapping NaN to `min`.
#[inline]
pub fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Soft knee above `threshold` for a magnitude `abs`.
///
/// `threshold + (abs - threshold) · scale · tanh(hardness · (abs - threshold))`
///
/// Callers only use it when `abs > threshold` and restore the sign afterwards.
#[inline]
pub fn soft_knee(abs: f32, threshold: f32, hardness: f32, scale: f32) -> f32 {
    let over = abs - threshold;
    threshold + over * scale * (hardness * over).tanh()
}
