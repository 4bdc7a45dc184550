use std::sync::Arc;

use rayon::prelude::*;

/// Commands sent from the session to the real-time playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Seek { sample: u64 },
}

/// Status messages sent back from the real-time playback engine.
///
/// The engine owns the actual clock; the session drains these on poll and
/// never writes the position itself except through an explicit seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Current transport position in samples.
    Position(u64),
}

/// Shared, immutable audio sample data.
///
/// `AudioArc` provides cheap cloning through reference counting while keeping
/// the sample data immutable and shareable. The sample data lives in an
/// `Arc<[f32]>`, so the whole structure stays small and many clips can point
/// at the same underlying audio without wrapping the metadata in the Arc.
///
/// # Memory Layout
///
/// ```text
/// AudioArc (24 bytes on stack)
/// ├─ samples: Arc<[f32]> (16 bytes) ────> Heap: [f32; N]
/// ├─ sample_rate: u32 (4 bytes)
/// └─ channels: u16 (2 bytes)
/// ```
///
/// Cloning an `AudioArc` only increments the reference count.
///
/// # Examples
///
/// ```
/// use studio_transport::AudioArc;
///
/// let samples = vec![0.0, 0.5, 1.0, 0.5];
/// let audio = AudioArc::new(samples, 44100, 2);
///
/// // Clone is cheap - just bumps refcount
/// let audio2 = audio.clone();
/// assert_eq!(audio.frames(), 2);
/// assert_eq!(audio2.frames(), 2);
/// ```
#[derive(Clone)]
pub struct AudioArc {
    /// Raw interleaved samples stored in a reference-counted slice.
    samples: Arc<[f32]>,
    /// Sample rate in Hz (e.g., 44100, 48000)
    sample_rate: u32,
    /// Number of interleaved channels (e.g., 1 for mono, 2 for stereo)
    channels: u16,
}

impl AudioArc {
    /// Create a new `AudioArc` from owned sample data.
    ///
    /// # Arguments
    ///
    /// * `samples` - Interleaved audio samples. For stereo, the format is [L, R, L, R, ...].
    /// * `sample_rate` - Sample rate in Hz (e.g., 44100, 48000)
    /// * `channels` - Number of channels (e.g., 1 for mono, 2 for stereo)
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or if `samples.len()` is not divisible by `channels`.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert_eq!(
            samples.len() % channels as usize,
            0,
            "samples.len() must be divisible by channels"
        );
        Self {
            samples: Arc::from(samples),
            sample_rate,
            channels,
        }
    }

    /// Create an `AudioArc` from an existing `Arc<[f32]>`, avoiding an extra
    /// allocation when the data is already shared.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or if `samples.len()` is not divisible by `channels`.
    pub fn from_arc(samples: Arc<[f32]>, sample_rate: u32, channels: u16) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert_eq!(
            samples.len() % channels as usize,
            0,
            "samples.len() must be divisible by channels"
        );
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Get a slice of all interleaved samples.
    ///
    /// For stereo audio, the format is [L, R, L, R, ...].
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get a reference to the inner `Arc<[f32]>` for advanced use cases
    /// (e.g., checking reference counts).
    pub fn samples_arc(&self) -> &Arc<[f32]> {
        &self.samples
    }

    /// Get the sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of channels.
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the number of frames (samples per channel).
    ///
    /// For stereo with 4 samples, this returns 2 frames.
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the total number of samples (frames * channels).
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the audio buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

impl std::fmt::Debug for AudioArc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioArc")
            .field("frames", &self.frames())
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("duration_secs", &self.duration_secs())
            .finish()
    }
}

/// Precomputed min/max peak envelope used for fast waveform rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformData {
    pub peaks: Vec<(f32, f32)>,
    pub samples_per_bucket: usize,
}

impl WaveformData {
    /// Generate waveform data from an `AudioArc`.
    ///
    /// This computes min/max peaks for visualization, downsampling the audio
    /// into buckets of `samples_per_bucket` frames each. Each peak is the
    /// mix-down to mono of all channels, so one bucket backs one rendered
    /// column when `samples_per_bucket` matches the samples-per-pixel zoom.
    ///
    /// # Examples
    ///
    /// ```
    /// use studio_transport::{AudioArc, WaveformData};
    ///
    /// let audio = AudioArc::new(vec![0.0; 44100 * 2], 44100, 2);
    /// let waveform = WaveformData::from_audio_arc(&audio, 512);
    /// assert_eq!(waveform.peaks.len(), 44100usize.div_ceil(512));
    /// ```
    pub fn from_audio_arc(audio: &AudioArc, samples_per_bucket: usize) -> Self {
        assert!(
            samples_per_bucket > 0,
            "samples_per_bucket must be greater than 0"
        );
        let frames = audio.frames();
        let num_buckets = frames.div_ceil(samples_per_bucket);
        let channels = audio.channels() as usize;
        let samples = audio.samples();

        let peaks: Vec<(f32, f32)> = (0..num_buckets)
            .into_par_iter()
            .map(|bucket_idx| {
                let start = bucket_idx * samples_per_bucket;
                let end = ((bucket_idx + 1) * samples_per_bucket).min(frames);

                let mut min_val: f32 = 0.0;
                let mut max_val: f32 = 0.0;

                for frame_idx in start..end {
                    // Mix down to mono
                    let mut sum: f32 = 0.0;
                    for ch in 0..channels {
                        let idx = frame_idx * channels + ch;
                        if idx < samples.len() {
                            sum += samples[idx];
                        }
                    }
                    let mono_sample = sum / channels as f32;
                    min_val = min_val.min(mono_sample);
                    max_val = max_val.max(mono_sample);
                }

                (min_val, max_val)
            })
            .collect();

        Self {
            peaks,
            samples_per_bucket,
        }
    }

    /// Scale the peaks to pixel offsets for a lane of the given height.
    ///
    /// Peaks are mapped from [-1, 1] to [-height/2, height/2], multiplied by
    /// `magnification`, and clamped so an overdriven buffer never draws
    /// outside its lane.
    pub fn normalize(&self, height: f32, magnification: f32) -> Vec<(f32, f32)> {
        let half = height / 2.0;
        self.peaks
            .iter()
            .map(|&(min, max)| {
                (
                    (min * half * magnification).clamp(-half, half),
                    (max * half * magnification).clamp(-half, half),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_arc_new() {
        let samples = vec![0.0, 0.1, 0.2, 0.3];
        let audio = AudioArc::new(samples, 44100, 2);

        assert_eq!(audio.sample_rate(), 44100);
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.len(), 4);
        assert!(!audio.is_empty());
    }

    #[test]
    #[should_panic(expected = "channels must be greater than 0")]
    fn test_audio_arc_zero_channels() {
        AudioArc::new(vec![0.0], 44100, 0);
    }

    #[test]
    #[should_panic(expected = "samples.len() must be divisible by channels")]
    fn test_audio_arc_invalid_length() {
        // 5 samples with 2 channels is invalid
        AudioArc::new(vec![0.0, 0.1, 0.2, 0.3, 0.4], 44100, 2);
    }

    #[test]
    fn test_audio_arc_clone_is_cheap() {
        let samples = vec![0.0; 100000];
        let audio = AudioArc::new(samples, 44100, 2);

        let audio2 = audio.clone();

        // Both should point to the same data
        assert_eq!(Arc::strong_count(audio.samples_arc()), 2);
        assert_eq!(Arc::strong_count(audio2.samples_arc()), 2);
    }

    #[test]
    fn test_audio_arc_duration() {
        // 44100 frames at 44100 Hz = 1 second
        let audio = AudioArc::new(vec![0.0; 44100 * 2], 44100, 2);
        assert!((audio.duration_secs() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_audio_arc_from_arc() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        let arc_samples = Arc::from(samples.clone());

        let audio = AudioArc::from_arc(arc_samples, 44100, 2);
        assert_eq!(audio.samples(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_audio_arc_empty() {
        let audio = AudioArc::new(vec![], 44100, 1);
        assert!(audio.is_empty());
        assert_eq!(audio.len(), 0);
        assert_eq!(audio.frames(), 0);
    }

    #[test]
    fn test_waveform_bucket_count() {
        // 1000 frames, 512 per bucket -> 2 buckets
        let audio = AudioArc::new(vec![0.0; 1000], 44100, 1);
        let waveform = WaveformData::from_audio_arc(&audio, 512);
        assert_eq!(waveform.peaks.len(), 2);
        assert_eq!(waveform.samples_per_bucket, 512);
    }

    #[test]
    fn test_waveform_peaks_capture_extremes() {
        // One bucket: a dip to -0.5 and a spike to 0.25
        let mut samples = vec![0.0f32; 64];
        samples[10] = -0.5;
        samples[20] = 0.25;
        let audio = AudioArc::new(samples, 44100, 1);

        let waveform = WaveformData::from_audio_arc(&audio, 64);
        assert_eq!(waveform.peaks.len(), 1);
        assert_eq!(waveform.peaks[0], (-0.5, 0.25));
    }

    #[test]
    fn test_waveform_stereo_mixdown() {
        // L=1.0, R=-1.0 cancels to 0.0; L=0.5, R=0.5 stays 0.5
        let samples = vec![1.0, -1.0, 0.5, 0.5];
        let audio = AudioArc::new(samples, 44100, 2);

        let waveform = WaveformData::from_audio_arc(&audio, 2);
        assert_eq!(waveform.peaks.len(), 1);
        assert_eq!(waveform.peaks[0], (0.0, 0.5));
    }

    #[test]
    fn test_normalize_scales_to_lane_height() {
        let waveform = WaveformData {
            peaks: vec![(-1.0, 1.0), (-0.5, 0.25)],
            samples_per_bucket: 512,
        };

        let normalized = waveform.normalize(80.0, 1.0);
        assert_eq!(normalized[0], (-40.0, 40.0));
        assert_eq!(normalized[1], (-20.0, 10.0));
    }

    #[test]
    fn test_normalize_clamps_magnified_peaks() {
        let waveform = WaveformData {
            peaks: vec![(-1.0, 1.0)],
            samples_per_bucket: 512,
        };

        // 3x magnification would draw outside the lane; clamp to half height
        let normalized = waveform.normalize(80.0, 3.0);
        assert_eq!(normalized[0], (-40.0, 40.0));
    }
}
