use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::window::{apply_window, hann_window};
use crate::config::SpectrumMethod;

/// Number of bins produced by the subsampled DFT.
pub const SUBSAMPLED_BINS: usize = 512;
const SUBSAMPLE_STRIDE: usize = 4;

/// Magnitude spectrum of one analysis frame.
#[derive(Clone, Debug)]
pub struct SpectrumFrame {
    /// Frame start in seconds.
    pub time: f32,
    /// Index of the frame's first sample.
    pub start: usize,
    pub magnitudes: Vec<f32>,
}

/// Start indices of every full frame. A frame is only taken while
/// `start + frame_size < len`, so a waveform of exactly one frame yields none.
pub fn frame_starts(len: usize, frame_size: usize, hop_size: usize) -> impl Iterator<Item = usize> {
    let hop_size = hop_size.max(1);
    let count = if len > frame_size {
        (len - frame_size - 1) / hop_size + 1
    } else {
        0
    };
    (0..count).map(move |i| i * hop_size)
}

/// Computes Hann-windowed magnitude spectra for every frame of `samples`.
///
/// Frames are processed in parallel; the result is in chronological order.
pub fn spectrogram(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    method: SpectrumMethod,
) -> Vec<SpectrumFrame> {
    let starts: Vec<usize> = frame_starts(samples.len(), frame_size, hop_size).collect();
    if starts.is_empty() {
        return Vec::new();
    }

    let hann = hann_window(frame_size);
    let fft = match method {
        SpectrumMethod::Fft => Some(plan_fft(frame_size)),
        SpectrumMethod::Subsampled => None,
    };

    starts
        .into_par_iter()
        .map(|start| {
            let frame = &samples[start..start + frame_size];
            let windowed = apply_window(frame, &hann);
            let magnitudes = match &fft {
                Some(fft) => fft_magnitudes(fft.as_ref(), &windowed),
                None => subsampled_dft(&windowed, SUBSAMPLED_BINS),
            };
            SpectrumFrame {
                time: start as f32 / sample_rate as f32,
                start,
                magnitudes,
            }
        })
        .collect()
}

/// Full-resolution magnitudes of an already windowed frame: the lower
/// `len / 2` bins of `fft`, which must be planned for `windowed.len()`.
pub fn fft_magnitudes(fft: &dyn Fft<f32>, windowed: &[f32]) -> Vec<f32> {
    let mut buffer: Vec<Complex<f32>> = windowed.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);
    buffer[..windowed.len() / 2].iter().map(|c| c.norm()).collect()
}

/// Plans a forward transform for frames of `frame_size` samples.
pub fn plan_fft(frame_size: usize) -> Arc<dyn Fft<f32>> {
    FftPlanner::<f32>::new().plan_fft_forward(frame_size)
}

/// Coarse DFT magnitudes: bin `k` sums `x[n]·e^(-i2πkn/len)` over every
/// fourth sample only. Bin spacing still follows the full frame length.
pub fn subsampled_dft(windowed: &[f32], bins: usize) -> Vec<f32> {
    let len = windowed.len() as f32;
    (0..bins)
        .map(|k| {
            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for n in (0..windowed.len()).step_by(SUBSAMPLE_STRIDE) {
                let angle = -2.0 * std::f32::consts::PI * k as f32 * n as f32 / len;
                re += windowed[n] * angle.cos();
                im += windowed[n] * angle.sin();
            }
            (re * re + im * im).sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn peak_bin(mags: &[f32]) -> usize {
        mags.iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
            .0
    }

    #[test]
    fn frame_starts_require_strictly_more_samples() {
        assert_eq!(frame_starts(2048, 2048, 512).count(), 0);
        assert_eq!(frame_starts(2049, 2048, 512).collect::<Vec<_>>(), vec![0]);
        assert_eq!(frame_starts(3073, 2048, 512).collect::<Vec<_>>(), vec![0, 512, 1024]);
    }

    #[test]
    fn short_input_has_no_frames() {
        let frames = spectrogram(&[0.5; 100], 44100, 2048, 512, SpectrumMethod::Fft);
        assert!(frames.is_empty());
    }

    #[test]
    fn fft_peak_lands_on_tone_bin() {
        // 44100 / 2048 ≈ 21.5 Hz per bin, so 430.66 Hz sits on bin 20.
        let sr = 44100;
        let tone = sine(430.664, sr, 2048);
        let mags = fft_magnitudes(
            plan_fft(2048).as_ref(),
            &crate::transcribe::window::apply_hann(&tone),
        );
        assert_eq!(mags.len(), 1024);
        assert_eq!(peak_bin(&mags), 20);
    }

    #[test]
    fn spectrogram_frames_match_single_frame_transform() {
        let sr = 44100;
        let tone = sine(430.664, sr, 4096);
        let frames = spectrogram(&tone, sr, 2048, 1024, SpectrumMethod::Fft);
        assert_eq!(frames.len(), 2);
        let fft = plan_fft(2048);
        for frame in &frames {
            let slice = &tone[frame.start..frame.start + 2048];
            let expected =
                fft_magnitudes(fft.as_ref(), &crate::transcribe::window::apply_hann(slice));
            assert_eq!(frame.magnitudes, expected);
        }
    }

    #[test]
    fn subsampled_peak_lands_on_tone_bin() {
        let sr = 44100;
        let tone = sine(430.664, sr, 2048);
        let mags = subsampled_dft(&crate::transcribe::window::apply_hann(&tone), SUBSAMPLED_BINS);
        assert_eq!(mags.len(), SUBSAMPLED_BINS);
        // The upper half mirrors the lower half after decimation.
        assert_eq!(peak_bin(&mags[..SUBSAMPLED_BINS / 2]), 20);
        assert!(mags.iter().all(|m| *m >= 0.0));
    }

    #[test]
    fn frames_carry_start_times_in_order() {
        let sr = 8000;
        let samples = sine(300.0, sr, 8000);
        for method in [SpectrumMethod::Fft, SpectrumMethod::Subsampled] {
            let frames = spectrogram(&samples, sr, 1024, 256, method);
            assert_eq!(frames.len(), frame_starts(8000, 1024, 256).count());
            for (i, frame) in frames.iter().enumerate() {
                assert_eq!(frame.start, i * 256);
                assert!((frame.time - (i * 256) as f32 / sr as f32).abs() < 1e-6);
            }
        }
    }
}
