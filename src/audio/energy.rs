//! Energy measurement for voice activity detection.

/// Calculates the normalized Root Mean Square (RMS) energy of a PCM block.
///
/// # Arguments
/// * `samples` - Audio samples as 16-bit PCM
///
/// # Returns
/// Normalized RMS value (0.0 to 1.0), where:
/// - 0.0 represents silence (and is returned for an empty block)
/// - ~0.707 represents a full-scale sine wave
/// - 1.0 represents maximum amplitude
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let value = sample as f64;
            value * value
        })
        .sum();

    let mean_square = sum_squares / samples.len() as f64;
    (mean_square.sqrt() / 32768.0) as f32
}
