//! Placeholder speech-to-text.
//!
//! Recorded audio is never inspected; after a short artificial delay one of a
//! few fixed sentences stands in for what the user "said".

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::error::SparringError;
use crate::recorder::AudioClip;

/// Used as the draft when capture or transcription fails.
pub const FALLBACK_TRANSCRIPT: &str =
    "Voice recording captured - please edit this text with your actual argument";

pub const CANNED_TRANSCRIPTS: [&str; 4] = [
    "I believe this topic is important because it affects how we interact with technology in our daily lives.",
    "From an economic perspective, the implementation costs need to be carefully considered before moving forward.",
    "The historical context shows that similar policies have had mixed results in other countries.",
    "We must balance innovation with responsible oversight to achieve the best outcomes for society.",
];

/// Turns a recorded clip into argument text.
#[async_trait]
pub trait Transcriber: Send {
    async fn transcribe(&mut self, clip: &AudioClip) -> Result<String, SparringError>;
}

/// Returns a random canned sentence after a fixed delay.
pub struct CannedTranscriber<R = StdRng> {
    rng: R,
    delay: Duration,
}

impl CannedTranscriber<StdRng> {
    pub fn new(delay: Duration) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            delay,
        }
    }

    pub fn seeded(seed: u64, delay: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            delay,
        }
    }
}

#[async_trait]
impl<R: Rng + Send> Transcriber for CannedTranscriber<R> {
    async fn transcribe(&mut self, clip: &AudioClip) -> Result<String, SparringError> {
        tracing::debug!(
            bytes = clip.wav.len(),
            seconds = clip.duration().as_secs_f32(),
            "simulating transcription"
        );
        tokio::time::sleep(self.delay).await;

        let index = self.rng.gen_range(0..CANNED_TRANSCRIPTS.len());
        Ok(CANNED_TRANSCRIPTS[index].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::AudioChunk;
    use tokio::time::Instant;

    fn clip() -> AudioClip {
        AudioClip::from_chunks(&[AudioChunk::new(16_000, vec![0; 32])]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcript_is_canned_and_delayed() {
        let mut transcriber = CannedTranscriber::seeded(5, Duration::from_millis(1500));
        let started = Instant::now();
        let text = transcriber.transcribe(&clip()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(CANNED_TRANSCRIPTS.contains(&text.as_str()));
    }

    #[tokio::test]
    async fn test_seeded_transcripts_repeat() {
        let mut a = CannedTranscriber::seeded(11, Duration::ZERO);
        let mut b = CannedTranscriber::seeded(11, Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(
                a.transcribe(&clip()).await.unwrap(),
                b.transcribe(&clip()).await.unwrap()
            );
        }
    }
}
