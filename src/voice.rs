//! Audio metric synthesis
//!
//! Combines the sample and spectral reducers into one `VoiceMetrics` record
//! per audio callback. The synthesizer runs on the capture callback path and
//! allocates nothing; inputs are borrowed, the output record is six scalars.

use crate::error::EngineError;
use crate::reducers::{
    count_spectral_peaks, dominant_frequency, rms_volume, run_length_below_threshold,
    spectral_centroid_clarity,
};
use crate::types::{AudioConfig, VoiceMetrics};

/// Amplitude under which a sample counts toward a pause run
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Byte-scale magnitude a spectral peak must exceed (half of 255)
pub const PEAK_MAGNITUDE_FLOOR: f32 = 128.0;

/// Spectral peaks per estimated word (5 peaks ~ 1 syllable cluster ~ 1 word;
/// a fixed calibration constant, not derived)
pub const PEAKS_PER_WORD: usize = 5;

/// Each window is treated as one second of audio when extrapolating words
/// per minute; the caller is responsible for invoking once per
/// second-equivalent window
pub const WINDOWS_PER_MINUTE: u32 = 60;

/// Synthesize voice metrics from one callback's time-domain window and the
/// time-aligned spectrum captured at the same instant.
///
/// The window must have exactly `config.window_len` samples and the spectrum
/// exactly `config.fft_size / 2` bins; anything else is a caller bug and
/// fails with [`EngineError::ConfigurationMismatch`] rather than being
/// silently truncated.
pub fn synthesize_voice_metrics(
    window: &[f32],
    spectrum: &[f32],
    config: &AudioConfig,
) -> Result<VoiceMetrics, EngineError> {
    if window.len() != config.window_len {
        return Err(EngineError::ConfigurationMismatch(format!(
            "window has {} samples, configured length is {}",
            window.len(),
            config.window_len
        )));
    }
    if spectrum.len() != config.spectrum_len() {
        return Err(EngineError::ConfigurationMismatch(format!(
            "spectrum has {} bins, fft size {} requires {}",
            spectrum.len(),
            config.fft_size,
            config.spectrum_len()
        )));
    }

    let volume = rms_volume(window);
    let pitch_hz = dominant_frequency(spectrum, config.sample_rate, config.fft_size);
    let clarity = spectral_centroid_clarity(spectrum);

    let peaks = count_spectral_peaks(spectrum, PEAK_MAGNITUDE_FLOOR);
    let word_count = (peaks / PEAKS_PER_WORD).max(1) as u32;
    let speaking_rate_wpm = word_count * WINDOWS_PER_MINUTE;

    let pause_count = run_length_below_threshold(window, SILENCE_THRESHOLD) as u32;

    Ok(VoiceMetrics {
        pitch_hz,
        volume,
        clarity,
        word_count,
        speaking_rate_wpm,
        pause_count,
    })
}
