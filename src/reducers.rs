//! Sample and spectral reducers
//!
//! Pure, total functions that collapse a raw time-domain window or a
//! frequency-domain magnitude array into scalar summary statistics. Every
//! function here guards its own divide-by-zero cases and is safe to call on
//! the audio callback path.

/// RMS energy of a time-domain window, scaled to 0-100.
///
/// `100 * min(1, sqrt(mean(sample_i^2)))`. An empty window reduces to 0.
pub fn rms_volume(window: &[f32]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let mean_square = window
        .iter()
        .map(|&s| f64::from(s) * f64::from(s))
        .sum::<f64>()
        / window.len() as f64;
    100.0 * mean_square.sqrt().min(1.0)
}

/// Frequency of the maximum-magnitude bin, in Hz.
///
/// Converted as `index * sample_rate / fft_size`. Ties break to the first
/// index attaining the maximum, so the lowest frequency wins and the result
/// is deterministic. An empty spectrum reduces to 0 Hz.
pub fn dominant_frequency(spectrum: &[f32], sample_rate: f64, fft_size: usize) -> f64 {
    if spectrum.is_empty() || fft_size == 0 {
        return 0.0;
    }
    let mut max_index = 0;
    let mut max_magnitude = spectrum[0];
    for (i, &magnitude) in spectrum.iter().enumerate().skip(1) {
        if magnitude > max_magnitude {
            max_magnitude = magnitude;
            max_index = i;
        }
    }
    max_index as f64 * sample_rate / fft_size as f64
}

/// Spectral-centroid clarity, scaled to 0-100.
///
/// `100 * min(1, (sum(i * mag_i) / sum(mag_i)) / len)` — the centroid bin
/// position as a fraction of the spectrum length. An all-zero spectrum
/// reduces to 0.
pub fn spectral_centroid_clarity(spectrum: &[f32]) -> f64 {
    let total: f64 = spectrum.iter().map(|&m| f64::from(m)).sum();
    if total == 0.0 {
        return 0.0;
    }
    let weighted: f64 = spectrum
        .iter()
        .enumerate()
        .map(|(i, &m)| i as f64 * f64::from(m))
        .sum();
    let centroid_fraction = (weighted / total) / spectrum.len() as f64;
    100.0 * centroid_fraction.min(1.0)
}

/// Number of contiguous runs where `|sample_i| < threshold`.
///
/// A run is counted once, at the sample that enters the sub-threshold region
/// from above — transition counting, not a total of sub-threshold samples.
pub fn run_length_below_threshold(window: &[f32], threshold: f32) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for &sample in window {
        if sample.abs() < threshold {
            if !in_run {
                runs += 1;
                in_run = true;
            }
        } else {
            in_run = false;
        }
    }
    runs
}

/// Number of strict local maxima in `spectrum` whose magnitude exceeds
/// `floor`.
///
/// A peak must strictly exceed both neighbors, so endpoints and plateau bins
/// never count.
pub fn count_spectral_peaks(spectrum: &[f32], floor: f32) -> usize {
    spectrum
        .windows(3)
        .filter(|w| w[1] > floor && w[1] > w[0] && w[1] > w[2])
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rms_volume_all_zero() {
        let window = vec![0.0f32; 4096];
        assert_eq!(rms_volume(&window), 0.0);
    }

    #[test]
    fn test_rms_volume_empty_window() {
        assert_eq!(rms_volume(&[]), 0.0);
    }

    #[test]
    fn test_rms_volume_alternating_half() {
        // Alternating +/-0.5 has RMS exactly 0.5 -> volume 50.
        let window: Vec<f32> = (0..4096)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        assert!((rms_volume(&window) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rms_volume_saturates_at_100() {
        let window = vec![2.0f32; 64];
        assert_eq!(rms_volume(&window), 100.0);
    }

    #[test]
    fn test_dominant_frequency_single_bin() {
        let mut spectrum = vec![0.0f32; 1024];
        spectrum[100] = 255.0;

        let hz = dominant_frequency(&spectrum, 44_100.0, 2048);
        assert_eq!(hz, 100.0 * 44_100.0 / 2048.0);
    }

    #[test]
    fn test_dominant_frequency_tie_breaks_low() {
        let mut spectrum = vec![0.0f32; 512];
        spectrum[10] = 200.0;
        spectrum[300] = 200.0;

        let hz = dominant_frequency(&spectrum, 44_100.0, 1024);
        assert_eq!(hz, 10.0 * 44_100.0 / 1024.0);
    }

    #[test]
    fn test_dominant_frequency_empty() {
        assert_eq!(dominant_frequency(&[], 44_100.0, 2048), 0.0);
    }

    #[test]
    fn test_centroid_clarity_zero_spectrum() {
        let spectrum = vec![0.0f32; 1024];
        assert_eq!(spectral_centroid_clarity(&spectrum), 0.0);
    }

    #[test]
    fn test_centroid_clarity_uniform_spectrum() {
        // Uniform magnitudes put the centroid at the midpoint of the bin
        // indices: (len-1)/2 / len, just under 50.
        let spectrum = vec![100.0f32; 1024];
        let clarity = spectral_centroid_clarity(&spectrum);
        let expected = 100.0 * ((1023.0 / 2.0) / 1024.0);
        assert!((clarity - expected).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_clarity_top_bin() {
        // All energy in the highest bin -> centroid fraction just under 1.
        let mut spectrum = vec![0.0f32; 8];
        spectrum[7] = 50.0;
        let clarity = spectral_centroid_clarity(&spectrum);
        assert!((clarity - 100.0 * (7.0 / 8.0)).abs() < 1e-9);
    }

    #[test]
    fn test_run_length_two_runs() {
        let window = [0.02f32, 0.0, 0.0, 0.02, 0.0];
        assert_eq!(run_length_below_threshold(&window, 0.01), 2);
    }

    #[test]
    fn test_run_length_counts_transitions_not_samples() {
        // One long run of 4 sub-threshold samples is a single pause.
        let window = [0.5f32, 0.0, 0.0, 0.0, 0.0, 0.5];
        assert_eq!(run_length_below_threshold(&window, 0.01), 1);
    }

    #[test]
    fn test_run_length_negative_samples() {
        // Threshold applies to |sample|.
        let window = [-0.5f32, -0.001, 0.5, 0.001, 0.5];
        assert_eq!(run_length_below_threshold(&window, 0.01), 2);
    }

    #[test]
    fn test_run_length_none_below() {
        let window: Vec<f32> = (0..4096)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        assert_eq!(run_length_below_threshold(&window, 0.01), 0);
    }

    #[test]
    fn test_count_peaks_strict_maxima_only() {
        // 200 at index 2 and a plateau of 200s at 5..=6; only the strict
        // maximum counts.
        let spectrum = [0.0f32, 130.0, 200.0, 130.0, 0.0, 200.0, 200.0, 0.0];
        assert_eq!(count_spectral_peaks(&spectrum, 128.0), 1);
    }

    #[test]
    fn test_count_peaks_floor_filters() {
        let spectrum = [0.0f32, 100.0, 0.0, 0.0, 129.0, 0.0];
        assert_eq!(count_spectral_peaks(&spectrum, 128.0), 1);
    }

    #[test]
    fn test_count_peaks_endpoints_excluded() {
        let spectrum = [255.0f32, 0.0, 0.0, 255.0];
        assert_eq!(count_spectral_peaks(&spectrum, 128.0), 0);
    }
}
