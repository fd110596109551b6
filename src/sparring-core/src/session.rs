//! Debate session state.
//!
//! Holds the user's configuration (topic, stance, language, voice) and the
//! progress of the current debate (round, countdown, session token).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SparringError;
use crate::timer::{ROUND_SECONDS, RoundTimer};

/// Number of rounds in a debate.
pub const MAX_ROUNDS: u8 = 2;

/// Topic a fresh session starts with.
pub const DEFAULT_TOPIC: &str = "Artificial intelligence should be heavily regulated by government";

/// The side of the topic the user argues.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Stance {
    #[default]
    For,
    Against,
}

impl Stance {
    /// The opposing side, argued by the AI opponent.
    pub fn invert(self) -> Self {
        match self {
            Stance::For => Stance::Against,
            Stance::Against => Stance::For,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stance::For => "For",
            Stance::Against => "Against",
        }
    }

    /// Lowercase form used inside rebuttal text.
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            Stance::For => "for",
            Stance::Against => "against",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Stance {
    type Err = SparringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" | "pro" => Ok(Stance::For),
            "against" | "con" => Ok(Stance::Against),
            _ => Err(SparringError::InvalidChoice {
                kind: "stance",
                value: s.to_string(),
                expected: "for, against",
            }),
        }
    }
}

/// Language the debate is held in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    English,
    Yoruba,
    Hausa,
    Igbo,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Yoruba,
        Language::Hausa,
        Language::Igbo,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Yoruba => "Yoruba",
            Language::Hausa => "Hausa",
            Language::Igbo => "Igbo",
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Yoruba => "yo",
            Language::Hausa => "ha",
            Language::Igbo => "ig",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = SparringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.display_name().to_lowercase() == wanted || lang.code() == wanted)
            .ok_or_else(|| SparringError::InvalidChoice {
                kind: "language",
                value: s.to_string(),
                expected: "English, Yoruba, Hausa, Igbo",
            })
    }
}

/// Gender of the AI opponent's voice.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VoiceGender {
    #[default]
    Male,
    Female,
}

impl VoiceGender {
    pub fn display_name(&self) -> &'static str {
        match self {
            VoiceGender::Male => "Male",
            VoiceGender::Female => "Female",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for VoiceGender {
    type Err = SparringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(VoiceGender::Male),
            "female" | "f" => Ok(VoiceGender::Female),
            _ => Err(SparringError::InvalidChoice {
                kind: "voice",
                value: s.to_string(),
                expected: "male, female",
            }),
        }
    }
}

/// Voice names available for a language and gender.
pub fn voice_roster(language: Language, gender: VoiceGender) -> &'static [&'static str] {
    match (language, gender) {
        (Language::Yoruba, VoiceGender::Female) => &["sade", "funmi"],
        (Language::Yoruba, VoiceGender::Male) => &["segun", "femi"],
        (Language::Hausa, VoiceGender::Female) => &["amina", "zainab"],
        (Language::Hausa, VoiceGender::Male) => &["hasan", "aliyu"],
        (Language::Igbo, VoiceGender::Female) => &["ngozi", "amara"],
        (Language::Igbo, VoiceGender::Male) => &["obinna", "ebuka"],
        (Language::English, VoiceGender::Female) => &["lucy", "lina", "kani"],
        (Language::English, VoiceGender::Male) => &["john", "jude", "henry"],
    }
}

/// What happened to the session after a round was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAdvance {
    /// Moved on to this round; the debate is still active.
    Next(u8),
    /// The final round is done.
    Finished,
}

/// In-memory state of one debate.
#[derive(Debug, Clone)]
pub struct Session {
    pub topic: String,
    pub stance: Stance,
    pub language: Language,
    pub voice: VoiceGender,
    active: bool,
    round: u8,
    session_id: Option<String>,
    timer: RoundTimer,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC, Stance::default(), Language::default(), VoiceGender::default())
    }
}

impl Session {
    pub fn new(
        topic: impl Into<String>,
        stance: Stance,
        language: Language,
        voice: VoiceGender,
    ) -> Self {
        Self {
            topic: topic.into(),
            stance,
            language,
            voice,
            active: false,
            round: 1,
            session_id: None,
            timer: RoundTimer::new(),
        }
    }

    /// Begin round 1 under a new session token, starting the countdown.
    pub fn begin(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
        self.active = true;
        self.round = 1;
        self.timer.start();
    }

    /// Move past the round just submitted.
    ///
    /// Round 1 rolls over to round 2 with a full clock left at rest (the
    /// caller resumes it); round 2 ends the debate and zeroes the clock.
    pub fn advance_round(&mut self) -> RoundAdvance {
        if self.round < MAX_ROUNDS {
            self.round += 1;
            self.active = true;
            self.timer.reset(ROUND_SECONDS);
            RoundAdvance::Next(self.round)
        } else {
            self.active = false;
            self.timer.reset(0);
            RoundAdvance::Finished
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn time_left(&self) -> u32 {
        self.timer.time_left()
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RoundTimer {
        &mut self.timer
    }

    /// Default voice name for the configured language and gender.
    pub fn voice_name(&self) -> &'static str {
        voice_roster(self.language, self.voice)
            .first()
            .copied()
            .unwrap_or("default")
    }
}
