//! Sparring Core Library
//!
//! Provides the round lifecycle, countdown timer, canned rebuttal selection,
//! and voice recording stubs behind the debate sparring partner.

pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod recorder;
pub mod remote;
pub mod responder;
pub mod session;
pub mod timer;
pub mod transcription;

pub use config::{Config, RemoteConfig, SessionConfig, TimingConfig};
pub use controller::{DebateController, Signal, SparringCallback, SparringEvent, SubmitOutcome};
pub use error::SparringError;
pub use message::{ConversationLog, Message, Sender};
pub use recorder::{AudioChunk, AudioClip, Microphone, Recorder, SimulatedMicrophone};
pub use remote::{HttpNotifier, RemoteReply, RoundNotifier, RoundStartRequest};
pub use responder::{CannedRebuttals, RebuttalSource, select_rebuttal};
pub use session::{Language, Session, Stance, VoiceGender};
pub use timer::{RoundTimer, TickSource, TimerState, format_time};
pub use transcription::{CannedTranscriber, Transcriber};
