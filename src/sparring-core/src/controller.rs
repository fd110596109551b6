//! Debate round controller.
//!
//! Owns the session, the conversation log, the tick source, the recorder and
//! the response/transcription stubs. Spawned tasks (ticks, remote replies)
//! never touch state directly; they send [`Signal`]s that the owner feeds back
//! through [`DebateController::handle_signal`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::config::TimingConfig;
use crate::error::SparringError;
use crate::message::{ConversationLog, Message, Sender};
use crate::recorder::{Microphone, Recorder, SimulatedMicrophone};
use crate::remote::{RemoteReply, RoundNotifier, RoundStartRequest};
use crate::responder::{CannedRebuttals, FALLBACK_RESPONSE, RebuttalSource};
use crate::session::{Language, MAX_ROUNDS, RoundAdvance, Session, Stance, VoiceGender};
use crate::timer::{TickOutcome, TickSource, format_time};
use crate::transcription::{CannedTranscriber, FALLBACK_TRANSCRIPT, Transcriber};

/// Status shown before the first round.
pub const INITIAL_STATUS: &str = "Start a new round to begin the debate!";

/// Alert raised when the microphone cannot be opened.
pub const MICROPHONE_ALERT: &str = "Please allow microphone access to use voice recording.";

/// Wake-ups delivered to the controller by its spawned tasks.
#[derive(Debug, Clone)]
pub enum Signal {
    /// One countdown interval elapsed on the tick source of this generation.
    Tick { generation: u64 },
    /// The backend answered the round-start notification for a session.
    Remote { session_id: String, reply: RemoteReply },
}

/// Events emitted as the debate progresses.
#[derive(Debug, Clone)]
pub enum SparringEvent {
    /// Round 1 of a new session began.
    RoundStarted {
        session_id: String,
        banner: String,
    },
    /// The countdown moved.
    TimerTick { time_left: u32, display: String },
    /// The countdown hit zero; an automatic submission follows.
    TimerExpired,
    /// Processing started or finished.
    LoadingChanged(bool),
    /// A message was added to the conversation log.
    MessageAppended(Message),
    /// A round was answered by the AI opponent.
    RoundCompleted {
        round: u8,
        rebuttal: String,
        status: String,
    },
    /// Response generation failed; the fallback text is shown instead.
    RoundFailed { fallback: String },
    /// The final round was answered.
    DebateCompleted,
    RecordingStarted,
    RecordingStopped,
    /// The draft was replaced by a transcription.
    InputTranscribed(String),
    /// Something the user must acknowledge.
    Alert(String),
    /// The backend acknowledged the round start.
    RemoteStatus { status: String, timer: String },
}

/// Callback for sparring events.
pub type SparringCallback = Box<dyn Fn(SparringEvent) + Send + Sync>;

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to submit and no round running, or already processing.
    Skipped,
    /// The round was answered.
    Completed { round: u8, rebuttal: String },
    /// Response generation failed and the fallback text was surfaced.
    Fallback,
}

/// Runs the rounds of a sparring session.
pub struct DebateController {
    session: Session,
    log: ConversationLog,
    timing: TimingConfig,
    ticks: TickSource,
    /// The next tick from the live source resumes a paused countdown.
    resume_pending: bool,
    status: String,
    input: String,
    last_response: Option<String>,
    last_remote: Option<RemoteReply>,
    loading: bool,
    rebuttals: Box<dyn RebuttalSource>,
    transcriber: Box<dyn Transcriber>,
    recorder: Recorder,
    notifier: Option<Arc<dyn RoundNotifier>>,
    callback: Option<SparringCallback>,
    tx: UnboundedSender<Signal>,
    rx: UnboundedReceiver<Signal>,
}

impl DebateController {
    /// Create a controller with canned rebuttals, canned transcription, a
    /// simulated microphone, and no remote notifier.
    pub fn new(session: Session, timing: TimingConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let transcriber = CannedTranscriber::new(timing.transcription_delay());

        Self {
            session,
            log: ConversationLog::new(),
            timing,
            ticks: TickSource::new(),
            resume_pending: false,
            status: INITIAL_STATUS.to_string(),
            input: String::new(),
            last_response: None,
            last_remote: None,
            loading: false,
            rebuttals: Box::new(CannedRebuttals::new()),
            transcriber: Box::new(transcriber),
            recorder: Recorder::new(Box::new(SimulatedMicrophone::new())),
            notifier: None,
            callback: None,
            tx,
            rx,
        }
    }

    /// Replace the rebuttal source.
    pub fn with_rebuttals(mut self, rebuttals: Box<dyn RebuttalSource>) -> Self {
        self.rebuttals = rebuttals;
        self
    }

    /// Replace the transcriber.
    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = transcriber;
        self
    }

    /// Record from a different microphone.
    pub fn with_microphone(mut self, mic: Box<dyn Microphone>) -> Self {
        self.recorder = Recorder::new(mic);
        self
    }

    /// Notify a backend on every round start.
    pub fn with_notifier(mut self, notifier: Arc<dyn RoundNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set a callback for sparring events.
    pub fn with_callback(mut self, callback: SparringCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.session.topic = topic.into();
    }

    pub fn set_stance(&mut self, stance: Stance) {
        self.session.stance = stance;
    }

    pub fn set_language(&mut self, language: Language) {
        self.session.language = language;
    }

    pub fn set_voice(&mut self, voice: VoiceGender) {
        self.session.voice = voice;
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Add a line to the draft argument.
    pub fn append_input(&mut self, line: &str) {
        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(line);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Start round 1 of a new session.
    ///
    /// Starting while a round is active resets everything. Must be called
    /// from within a tokio runtime.
    pub fn start_round(&mut self) {
        self.ticks.cancel();
        self.resume_pending = false;

        let session_id = format!("session_{}", Uuid::new_v4().simple());
        self.session.begin(session_id.clone());
        self.log.clear();
        self.input.clear();
        self.last_response = None;
        self.last_remote = None;

        self.notify_round_start(&session_id);

        self.status = round_banner(&self.session);
        self.start_ticking(Duration::ZERO);

        tracing::info!(
            session_id = %session_id,
            topic = %self.session.topic,
            stance = %self.session.stance,
            "round 1 started"
        );
        self.emit_event(SparringEvent::RoundStarted {
            session_id,
            banner: self.status.clone(),
        });
    }

    /// Submit the current draft.
    pub async fn submit_pending(&mut self) -> SubmitOutcome {
        let text = self.input.clone();
        self.submit_round(&text).await
    }

    /// Submit an argument and collect the opponent's rebuttal.
    ///
    /// Skipped when `user_text` is blank and no round is active, or while a
    /// previous submission is still processing. Loading and the draft are
    /// always cleared afterwards.
    pub async fn submit_round(&mut self, user_text: &str) -> SubmitOutcome {
        if self.loading || (user_text.trim().is_empty() && !self.session.is_active()) {
            return SubmitOutcome::Skipped;
        }

        self.stop_timer();
        self.set_loading(true);

        let outcome = match self.complete_round(user_text).await {
            Ok((round, rebuttal)) => SubmitOutcome::Completed { round, rebuttal },
            Err(e) => {
                tracing::warn!(error = %e, "round processing failed, showing fallback");
                self.last_response = Some(FALLBACK_RESPONSE.to_string());
                self.emit_event(SparringEvent::RoundFailed {
                    fallback: FALLBACK_RESPONSE.to_string(),
                });
                SubmitOutcome::Fallback
            }
        };

        self.input.clear();
        self.set_loading(false);
        outcome
    }

    async fn complete_round(&mut self, user_text: &str) -> Result<(u8, String), SparringError> {
        tracing::debug!(delay_ms = self.timing.processing_delay_ms, "simulating processing");
        tokio::time::sleep(self.timing.processing_delay()).await;

        let rebuttal = self
            .rebuttals
            .rebuttal(&self.session.topic, self.session.stance)?;
        let round = self.session.round();

        if !user_text.trim().is_empty() {
            let message = self.log.append(Sender::User, user_text);
            self.emit_event(SparringEvent::MessageAppended(message));
        }
        let message = self.log.append(Sender::Ai, rebuttal.clone());
        self.emit_event(SparringEvent::MessageAppended(message));
        self.last_response = Some(rebuttal.clone());

        let advance = self.session.advance_round();
        self.status = completion_status(round, &rebuttal, advance);

        tracing::info!(round, ?advance, "round completed");
        self.emit_event(SparringEvent::RoundCompleted {
            round,
            rebuttal: rebuttal.clone(),
            status: self.status.clone(),
        });

        match advance {
            RoundAdvance::Next(_) => {
                // Decided on the state just updated, not a snapshot from before the round
                if self.session.is_active() {
                    self.resume_pending = true;
                    self.start_ticking(self.timing.restart_delay());
                }
            }
            RoundAdvance::Finished => self.emit_event(SparringEvent::DebateCompleted),
        }

        Ok((round, rebuttal))
    }

    fn start_ticking(&mut self, initial_delay: Duration) {
        self.ticks.start(
            self.tx.clone(),
            initial_delay,
            self.timing.tick_interval(),
            |generation| Signal::Tick { generation },
        );
    }

    fn stop_timer(&mut self) {
        self.ticks.cancel();
        self.resume_pending = false;
        self.session.timer_mut().stop();
    }

    /// Recompute the mm:ss display from the remaining time.
    pub fn refresh_timer(&self) -> String {
        format_time(self.session.time_left())
    }

    pub fn timer_running(&self) -> bool {
        self.ticks.is_running()
    }

    /// Wait for the next wake-up from a spawned task.
    pub async fn next_signal(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }

    /// Apply a wake-up. An expiring tick runs the automatic submission.
    pub async fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Tick { generation } => self.on_tick(generation).await,
            Signal::Remote { session_id, reply } => self.on_remote_reply(session_id, reply),
        }
    }

    async fn on_tick(&mut self, generation: u64) {
        if !self.ticks.is_current(generation) {
            tracing::debug!(generation, "dropping tick from superseded source");
            return;
        }

        if self.resume_pending {
            self.resume_pending = false;
            self.session.timer_mut().resume();
        }

        match self.session.timer_mut().tick() {
            TickOutcome::Running(time_left) => {
                self.emit_event(SparringEvent::TimerTick {
                    time_left,
                    display: format_time(time_left),
                });
            }
            TickOutcome::Expired => {
                self.ticks.cancel();
                self.emit_event(SparringEvent::TimerTick {
                    time_left: 0,
                    display: format_time(0),
                });
                self.emit_event(SparringEvent::TimerExpired);
                tracing::info!(round = self.session.round(), "time expired, auto-submitting");
                self.submit_pending().await;
            }
            TickOutcome::Ignored => {}
        }
    }

    fn on_remote_reply(&mut self, session_id: String, reply: RemoteReply) {
        if self.session.session_id() != Some(session_id.as_str()) {
            tracing::debug!(%session_id, "dropping reply for superseded session");
            return;
        }

        tracing::debug!(status = %reply.status, timer = %reply.timer, "backend acknowledged round");
        self.emit_event(SparringEvent::RemoteStatus {
            status: reply.status.clone(),
            timer: reply.timer.clone(),
        });
        self.last_remote = Some(reply);
    }

    fn notify_round_start(&self, session_id: &str) {
        let Some(notifier) = self.notifier.as_ref().map(Arc::clone) else {
            return;
        };

        let request = RoundStartRequest::from_session(&self.session, session_id);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match notifier.announce(&request).await {
                Ok(reply) => {
                    let _ = tx.send(Signal::Remote {
                        session_id: request.session_id,
                        reply,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "start round call failed, using local timer");
                }
            }
        });
    }

    /// Begin voice capture. Returns whether a new recording started.
    pub async fn start_recording(&mut self) -> bool {
        if self.loading {
            return false;
        }

        match self.recorder.start().await {
            Ok(true) => {
                self.emit_event(SparringEvent::RecordingStarted);
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(error = %e, "recording unavailable");
                self.emit_event(SparringEvent::Alert(MICROPHONE_ALERT.to_string()));
                false
            }
        }
    }

    /// Buffer audio captured so far.
    pub fn poll_recording(&mut self) {
        self.recorder.capture();
    }

    /// Stop capture and replace the draft with the transcription.
    ///
    /// Returns the new draft, or `None` when nothing was being recorded.
    pub async fn stop_recording(&mut self) -> Option<String> {
        if !self.recorder.is_recording() {
            return None;
        }

        let clip = self.recorder.stop();
        self.emit_event(SparringEvent::RecordingStopped);
        self.set_loading(true);

        let text = match clip {
            Ok(Some(clip)) => match self.transcriber.transcribe(&clip).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "transcription failed");
                    FALLBACK_TRANSCRIPT.to_string()
                }
            },
            Ok(None) => FALLBACK_TRANSCRIPT.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "capture failed");
                FALLBACK_TRANSCRIPT.to_string()
            }
        };

        self.input = text.clone();
        self.emit_event(SparringEvent::InputTranscribed(text.clone()));
        self.set_loading(false);
        Some(text)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Halt the timer and release the microphone.
    pub fn shutdown(&mut self) {
        self.stop_timer();
        self.recorder.release();
        tracing::debug!("controller shut down");
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn last_remote(&self) -> Option<&RemoteReply> {
        self.last_remote.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.emit_event(SparringEvent::LoadingChanged(loading));
        }
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: SparringEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Status text shown when round 1 begins.
pub fn round_banner(session: &Session) -> String {
    format!(
        "🎯 ROUND {} STARTED!\n\nTopic: {}\nYour stance: {}\n\nYou have 5 minutes to present your arguments. The timer will auto-submit when time expires.",
        session.round(),
        session.topic,
        session.stance
    )
}

/// Status text shown after `round` was answered.
pub fn completion_status(round: u8, rebuttal: &str, advance: RoundAdvance) -> String {
    let next = match advance {
        RoundAdvance::Next(next) if next <= MAX_ROUNDS => format!("🎯 Ready for Round {}?", next),
        _ => "🏁 DEBATE COMPLETED!\n\nThank you for the debate!".to_string(),
    };
    format!(
        "✅ Round {} completed!\n\n🤖 AI Response:\n{}\n\n{}",
        round, rebuttal, next
    )
}
