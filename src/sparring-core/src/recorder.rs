//! Voice recording control.
//!
//! A [`Recorder`] owns the microphone exclusively while recording. Captured
//! chunks are buffered and, on stop, joined into one WAV [`AudioClip`].

use async_trait::async_trait;
use std::io::Cursor;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::SparringError;

/// Sample rate used by the simulated microphone.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// A block of mono 16-bit PCM delivered by the microphone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl AudioChunk {
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }
}

/// The single audio object produced when a recording stops.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// WAV-encoded audio.
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub sample_count: usize,
}

impl AudioClip {
    /// Concatenate chunks in capture order and encode them as WAV.
    ///
    /// All chunks must share one sample rate.
    pub fn from_chunks(chunks: &[AudioChunk]) -> Result<Self, SparringError> {
        let sample_rate = chunks
            .first()
            .map(|c| c.sample_rate)
            .unwrap_or(DEFAULT_SAMPLE_RATE);

        if sample_rate == 0 {
            return Err(SparringError::CaptureError(
                "Recording reported a sample rate of 0 Hz".to_string(),
            ));
        }

        if let Some(odd) = chunks.iter().find(|c| c.sample_rate != sample_rate) {
            return Err(SparringError::CaptureError(format!(
                "Mixed sample rates in recording: {} Hz and {} Hz",
                sample_rate, odd.sample_rate
            )));
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut sample_count = 0;
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in chunks.iter().flat_map(|c| c.samples.iter()) {
                writer.write_sample(*sample)?;
                sample_count += 1;
            }
            writer.finalize()?;
        }

        Ok(Self {
            wav: cursor.into_inner(),
            sample_rate,
            sample_count,
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.sample_count as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Exclusive access to an audio input device.
#[async_trait]
pub trait Microphone: Send {
    /// Ask for access and begin capturing. Fails if permission is denied.
    async fn acquire(&mut self) -> Result<(), SparringError>;

    /// Take the chunks captured since the last drain.
    fn drain(&mut self) -> Vec<AudioChunk>;

    /// Stop capturing and give the device back.
    fn release(&mut self);

    /// Whether the device is currently held.
    fn is_held(&self) -> bool;
}

/// Microphone stand-in that records silence for as long as it is held.
#[derive(Debug)]
pub struct SimulatedMicrophone {
    sample_rate: u32,
    allow: bool,
    since: Option<Instant>,
}

impl SimulatedMicrophone {
    pub fn new() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            allow: true,
            since: None,
        }
    }

    /// A microphone whose permission prompt is always declined.
    pub fn denied() -> Self {
        Self {
            allow: false,
            ..Self::new()
        }
    }
}

impl Default for SimulatedMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Microphone for SimulatedMicrophone {
    async fn acquire(&mut self) -> Result<(), SparringError> {
        if !self.allow {
            return Err(SparringError::MicrophoneDenied(
                "permission prompt declined".to_string(),
            ));
        }
        self.since = Some(Instant::now());
        Ok(())
    }

    fn drain(&mut self) -> Vec<AudioChunk> {
        let Some(since) = self.since else {
            return Vec::new();
        };

        let now = Instant::now();
        let elapsed = now.duration_since(since);
        self.since = Some(now);

        let count = (elapsed.as_secs_f64() * self.sample_rate as f64) as usize;
        if count == 0 {
            return Vec::new();
        }
        vec![AudioChunk::new(self.sample_rate, vec![0; count])]
    }

    fn release(&mut self) {
        self.since = None;
    }

    fn is_held(&self) -> bool {
        self.since.is_some()
    }
}

/// Recording control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

/// Idle/recording state machine over an exclusively owned microphone.
pub struct Recorder {
    mic: Box<dyn Microphone>,
    state: RecordingState,
    chunks: Vec<AudioChunk>,
}

impl Recorder {
    pub fn new(mic: Box<dyn Microphone>) -> Self {
        Self {
            mic,
            state: RecordingState::Idle,
            chunks: Vec::new(),
        }
    }

    /// Start capturing.
    ///
    /// Returns `Ok(false)` without touching the device when already recording.
    /// On permission denial the recorder stays idle.
    pub async fn start(&mut self) -> Result<bool, SparringError> {
        if self.state == RecordingState::Recording {
            return Ok(false);
        }

        self.mic.acquire().await?;
        self.chunks.clear();
        self.state = RecordingState::Recording;
        tracing::debug!("recording started");
        Ok(true)
    }

    /// Move whatever the device has captured into the buffer.
    pub fn capture(&mut self) {
        if self.state == RecordingState::Recording {
            let drained = self.mic.drain();
            self.chunks.extend(drained);
        }
    }

    /// Stop capturing, release the device, and join the buffered audio.
    ///
    /// Returns `Ok(None)` when not recording.
    pub fn stop(&mut self) -> Result<Option<AudioClip>, SparringError> {
        if self.state == RecordingState::Idle {
            return Ok(None);
        }

        self.capture();
        self.mic.release();
        self.state = RecordingState::Idle;

        let chunks = std::mem::take(&mut self.chunks);
        let clip = AudioClip::from_chunks(&chunks)?;
        tracing::debug!(
            samples = clip.sample_count,
            bytes = clip.wav.len(),
            "recording stopped"
        );
        Ok(Some(clip))
    }

    /// Drop any recording in progress and free the device.
    pub fn release(&mut self) {
        if self.mic.is_held() {
            self.mic.release();
        }
        self.chunks.clear();
        self.state = RecordingState::Idle;
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts acquisitions and hands out pre-scripted chunks.
    struct ScriptedMicrophone {
        acquisitions: Arc<AtomicUsize>,
        held: Arc<AtomicUsize>,
        pending: Vec<AudioChunk>,
    }

    impl ScriptedMicrophone {
        fn new(pending: Vec<AudioChunk>) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let acquisitions = Arc::new(AtomicUsize::new(0));
            let held = Arc::new(AtomicUsize::new(0));
            let mic = Self {
                acquisitions: Arc::clone(&acquisitions),
                held: Arc::clone(&held),
                pending,
            };
            (mic, acquisitions, held)
        }
    }

    #[async_trait]
    impl Microphone for ScriptedMicrophone {
        async fn acquire(&mut self) -> Result<(), SparringError> {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            self.held.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn drain(&mut self) -> Vec<AudioChunk> {
            std::mem::take(&mut self.pending)
        }

        fn release(&mut self) {
            self.held.store(0, Ordering::SeqCst);
        }

        fn is_held(&self) -> bool {
            self.held.load(Ordering::SeqCst) > 0
        }
    }

    #[test]
    fn test_clip_concatenates_chunks() {
        let chunks = vec![
            AudioChunk::new(8_000, vec![1, 2, 3]),
            AudioChunk::new(8_000, vec![4, 5]),
        ];
        let clip = AudioClip::from_chunks(&chunks).unwrap();
        assert_eq!(clip.sample_count, 5);
        assert_eq!(clip.sample_rate, 8_000);

        let reader = hound::WavReader::new(Cursor::new(clip.wav)).unwrap();
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_clip_rejects_mixed_sample_rates() {
        let chunks = vec![
            AudioChunk::new(8_000, vec![1]),
            AudioChunk::new(16_000, vec![2]),
        ];
        assert!(matches!(
            AudioClip::from_chunks(&chunks),
            Err(SparringError::CaptureError(_))
        ));
    }

    #[test]
    fn test_clip_rejects_zero_sample_rate() {
        assert!(matches!(
            AudioClip::from_chunks(&[AudioChunk::new(0, vec![1, 2])]),
            Err(SparringError::CaptureError(_))
        ));
    }

    #[test]
    fn test_empty_clip_is_valid_wav() {
        let clip = AudioClip::from_chunks(&[]).unwrap();
        assert!(clip.is_empty());
        assert_eq!(clip.duration(), Duration::ZERO);
        assert!(hound::WavReader::new(Cursor::new(clip.wav)).is_ok());
    }

    #[tokio::test]
    async fn test_double_start_acquires_once() {
        let (mic, acquisitions, _) = ScriptedMicrophone::new(vec![]);
        let mut recorder = Recorder::new(Box::new(mic));

        assert!(recorder.start().await.unwrap());
        assert!(!recorder.start().await.unwrap());
        assert_eq!(acquisitions.load(Ordering::SeqCst), 1);
        assert!(recorder.is_recording());
    }

    #[tokio::test]
    async fn test_stop_releases_device_and_returns_clip() {
        let (mic, _, held) = ScriptedMicrophone::new(vec![AudioChunk::new(16_000, vec![7; 160])]);
        let mut recorder = Recorder::new(Box::new(mic));

        recorder.start().await.unwrap();
        let clip = recorder.stop().unwrap().expect("clip");
        assert_eq!(clip.sample_count, 160);
        assert_eq!(held.load(Ordering::SeqCst), 0);
        assert_eq!(recorder.state(), RecordingState::Idle);

        // Stopping again is a no-op
        assert!(recorder.stop().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_denied_microphone_stays_idle() {
        let mut recorder = Recorder::new(Box::new(SimulatedMicrophone::denied()));
        let result = recorder.start().await;
        assert!(matches!(result, Err(SparringError::MicrophoneDenied(_))));
        assert_eq!(recorder.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn test_drop_releases_device() {
        let (mic, _, held) = ScriptedMicrophone::new(vec![]);
        let mut recorder = Recorder::new(Box::new(mic));
        recorder.start().await.unwrap();
        assert_eq!(held.load(Ordering::SeqCst), 1);

        drop(recorder);
        assert_eq!(held.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_microphone_records_elapsed_silence() {
        let mut recorder = Recorder::new(Box::new(SimulatedMicrophone::new()));
        recorder.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let clip = recorder.stop().unwrap().expect("clip");
        assert_eq!(clip.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(clip.sample_count, (DEFAULT_SAMPLE_RATE / 2) as usize);
    }
}
