//! Sparring CLI - Debate Sparring Partner
//!
//! An interactive terminal front end for practicing debate rounds against a
//! simulated AI opponent.

use clap::Parser;
use colored::Colorize;
use sparring_core::session::voice_roster;
use sparring_core::{
    CannedRebuttals, CannedTranscriber, Config, DebateController, HttpNotifier, Language,
    SparringEvent, Stance, VoiceGender, format_time,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sparring",
    version,
    about = "Debate Sparring Partner - argue a topic against an AI opponent",
    long_about = "An interactive two-round debate practice tool. Write (or record) your argument before the five-minute timer runs out and the AI opponent answers with a rebuttal."
)]
struct Cli {
    /// The topic to debate
    #[arg(long, value_name = "TOPIC")]
    topic: Option<String>,

    /// Your stance on the topic (for or against)
    #[arg(long, value_name = "STANCE")]
    stance: Option<Stance>,

    /// Debate language (English, Yoruba, Hausa, Igbo)
    #[arg(long, value_name = "LANGUAGE")]
    language: Option<Language>,

    /// Gender of the AI opponent's voice (male or female)
    #[arg(long, value_name = "VOICE")]
    voice: Option<VoiceGender>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend URL for round-start notifications
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Do not contact the backend at all
    #[arg(long)]
    offline: bool,

    /// Seed for rebuttal and transcription selection
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Whether the REPL keeps going after a line.
#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(topic) = &cli.topic {
        config.session.topic = topic.clone();
    }
    if let Some(stance) = cli.stance {
        config.session.stance = stance;
    }
    if let Some(language) = cli.language {
        config.session.language = language;
    }
    if let Some(voice) = cli.voice {
        config.session.voice = voice;
    }
    if let Some(url) = cli.api_url.clone().or_else(|| env::var("SPARRING_API_URL").ok()) {
        config.remote.api_url = url;
    }
    if cli.offline {
        config.remote.enabled = false;
    }
    config.validate()?;

    let mut controller = DebateController::new(config.new_session(), config.timing.clone())
        .with_callback(create_console_callback());

    if let Some(seed) = cli.seed {
        controller = controller
            .with_rebuttals(Box::new(CannedRebuttals::seeded(seed)))
            .with_transcriber(Box::new(CannedTranscriber::seeded(
                seed.wrapping_add(1),
                config.timing.transcription_delay(),
            )));
    }

    if config.remote.enabled {
        let notifier = HttpNotifier::new(
            config.remote.api_url.clone(),
            Duration::from_secs(config.remote.timeout_secs),
        )?;
        controller = controller.with_notifier(Arc::new(notifier));
    } else {
        tracing::info!("backend notifications disabled");
    }

    print_header(&controller);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if handle_line(&mut controller, line.trim_end()).await == Flow::Quit {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(signal) = controller.next_signal() => {
                controller.handle_signal(signal).await;
            }
        }
    }

    controller.shutdown();
    println!();
    println!("{}", "  Goodbye.".bright_green().bold());
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,sparring_core={level},sparring={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Apply one line of user input.
async fn handle_line(controller: &mut DebateController, line: &str) -> Flow {
    let Some(command) = line.strip_prefix('/') else {
        if !line.trim().is_empty() {
            controller.append_input(line);
        }
        return Flow::Continue;
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name.to_lowercase().as_str() {
        "topic" => {
            if arg.is_empty() {
                println!("{} {}", "Topic:".bold(), controller.session().topic.bright_white());
            } else {
                controller.set_topic(arg);
                println!("{} {}", "Topic set:".bold(), arg.bright_white());
            }
        }
        "stance" => match arg.parse::<Stance>() {
            Ok(stance) => {
                controller.set_stance(stance);
                println!("{} {}", "Your stance:".bold(), stance.to_string().yellow());
            }
            Err(e) => print_error(&e.to_string()),
        },
        "language" => match arg.parse::<Language>() {
            Ok(language) => {
                controller.set_language(language);
                println!("{} {}", "Language:".bold(), language.to_string().cyan());
            }
            Err(e) => print_error(&e.to_string()),
        },
        "voice" => match arg.parse::<VoiceGender>() {
            Ok(voice) => {
                controller.set_voice(voice);
                println!(
                    "{} {} ({})",
                    "AI voice:".bold(),
                    voice.to_string().cyan(),
                    voice_roster(controller.session().language, voice).join(", ").dimmed()
                );
            }
            Err(e) => print_error(&e.to_string()),
        },
        "start" => {
            if controller.session().is_active() {
                print_warning("A debate is already in progress. Submit your rounds first.");
            } else {
                controller.start_round();
            }
        }
        "submit" => {
            if !controller.session().is_active() {
                print_warning("No active round. Use /start to begin.");
            } else if controller.is_loading() {
                print_warning("Still processing the previous submission.");
            } else {
                controller.submit_pending().await;
            }
        }
        "timer" => {
            println!(
                "{} {}",
                "Time remaining:".bold(),
                controller.refresh_timer().bright_blue().bold()
            );
        }
        "record" => {
            if controller.is_recording() {
                print_warning("Already recording. Use /stop to finish.");
            } else {
                controller.start_recording().await;
            }
        }
        "stop" => {
            if controller.stop_recording().await.is_none() {
                print_warning("Not recording.");
            }
        }
        "status" => print_status(controller),
        "history" => print_history(controller),
        "clear" => {
            controller.clear_input();
            println!("{}", "Draft cleared.".dimmed());
        }
        "help" => print_help(),
        "quit" | "exit" => return Flow::Quit,
        other => print_warning(&format!("Unknown command '/{}'. Type /help.", other)),
    }

    Flow::Continue
}

fn print_header(controller: &DebateController) {
    let session = controller.session();
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - Live Demo", "Debate Sparring Partner".bold())
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Topic:".bold(), session.topic.bright_white());
    println!("{} {}", "Your stance:".bold(), session.stance.to_string().yellow());
    println!(
        "{} {} / {} voice ({})",
        "Language:".bold(),
        session.language.to_string().cyan(),
        session.voice,
        session.voice_name().dimmed()
    );
    println!();
    println!("{}", controller.status());
    println!("{}", "─".repeat(70).dimmed());
}

fn print_help() {
    let commands = [
        ("/topic <text>", "Set the debate topic"),
        ("/stance <for|against>", "Choose your side"),
        ("/language <name>", "English, Yoruba, Hausa, or Igbo"),
        ("/voice <male|female>", "Gender of the AI voice"),
        ("/start", "Start a new debate (round 1)"),
        ("/submit", "Submit your draft argument"),
        ("/timer", "Show the time remaining"),
        ("/record, /stop", "Record your argument by voice"),
        ("/status", "Show debate status"),
        ("/history", "Show the conversation so far"),
        ("/clear", "Discard the current draft"),
        ("/quit", "Leave"),
    ];

    println!("{}", "Commands:".bold());
    for (command, description) in commands {
        println!("  {:<24} {}", command.bright_cyan(), description.dimmed());
    }
    println!("  {}", "Any other line is added to your draft argument.".dimmed());
    println!();
}

fn print_status(controller: &DebateController) {
    let session = controller.session();
    println!("{}", "─".repeat(70).dimmed());
    for line in wrap_paragraphs(controller.status(), 68).lines() {
        println!("  {}", line);
    }
    println!();
    println!(
        "  {} {}   {} {}   {} {}",
        "Round:".bold(),
        session.round(),
        "Active:".bold(),
        if session.is_active() { "yes".green() } else { "no".red() },
        "Timer:".bold(),
        format_time(session.time_left()).bright_blue()
    );
    if !controller.input().is_empty() {
        println!("  {}", "Draft:".bold());
        for line in wrap_paragraphs(controller.input(), 64).lines() {
            println!("    {}", line.italic());
        }
    }
    println!("{}", "─".repeat(70).dimmed());
}

fn print_history(controller: &DebateController) {
    let messages = controller.messages();
    if messages.is_empty() {
        println!("{}", "No messages yet.".dimmed());
        return;
    }

    println!("{}", "💬 Conversation History".bold());
    for message in messages {
        let who = match message.sender {
            sparring_core::Sender::User => message.sender.display_name().bright_cyan().bold(),
            sparring_core::Sender::Ai => message.sender.display_name().bright_magenta().bold(),
        };
        println!("{} {}", who, message.timestamp.dimmed());
        for line in wrap_paragraphs(&message.text, 66).lines() {
            println!("  {}", line);
        }
        println!();
    }
}

fn print_warning(text: &str) {
    println!("{}", text.yellow());
}

fn print_error(text: &str) {
    eprintln!("{} {}", "Error:".red().bold(), text);
}

/// Create a callback that prints sparring events to the console.
fn create_console_callback() -> Box<dyn Fn(SparringEvent) + Send + Sync> {
    Box::new(move |event| match event {
        SparringEvent::RoundStarted { banner, .. } => {
            println!();
            println!("{}", "═".repeat(70).bright_magenta());
            for line in wrap_paragraphs(&banner, 66).lines() {
                println!("  {}", line.bright_magenta());
            }
            println!("{}", "═".repeat(70).bright_magenta());
            println!();
        }
        SparringEvent::TimerTick { time_left, display } => {
            if time_left % 60 == 0 || time_left == 30 || (time_left <= 10 && time_left > 0) {
                println!("{} {}", "⏱".bright_blue(), format!("{} remaining", display).dimmed());
            }
        }
        SparringEvent::TimerExpired => {
            println!("{}", "⏰ Time's up! Submitting your round...".yellow().bold());
        }
        SparringEvent::LoadingChanged(true) => {
            println!("{}", "Processing...".dimmed());
        }
        SparringEvent::LoadingChanged(false) => {}
        SparringEvent::MessageAppended(_) => {
            // Shown through RoundCompleted and /history
        }
        SparringEvent::RoundCompleted { status, .. } => {
            println!();
            println!("{}", "─".repeat(70).bright_green());
            for line in wrap_paragraphs(&status, 66).lines() {
                println!("  {}", line);
            }
            println!("{}", "─".repeat(70).bright_green());
            println!();
        }
        SparringEvent::RoundFailed { fallback } => {
            println!("{}", fallback.yellow());
        }
        SparringEvent::DebateCompleted => {
            println!("{}", "  Use /start to debate again.".dimmed());
        }
        SparringEvent::RecordingStarted => {
            println!("{}", "🎤 Recording... type /stop to finish.".bright_red());
        }
        SparringEvent::RecordingStopped => {
            println!("{}", "⏹ Recording stopped, transcribing...".dimmed());
        }
        SparringEvent::InputTranscribed(text) => {
            println!("{}", "Draft replaced with transcription:".bold());
            for line in wrap_paragraphs(&text, 64).lines() {
                println!("    {}", line.italic());
            }
        }
        SparringEvent::Alert(message) => {
            eprintln!("{} {}", "⚠".red().bold(), message.red().bold());
        }
        SparringEvent::RemoteStatus { status, .. } => {
            println!("{} {}", "server:".dimmed(), status.dimmed());
        }
    })
}

/// Word-wrap each line of `text` separately, keeping blank lines.
fn wrap_paragraphs(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| textwrap(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_line_len + word_len + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textwrap_respects_width() {
        let wrapped = textwrap("one two three four five six seven", 10);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= 10);
        }
        assert_eq!(wrapped.split_whitespace().count(), 7);
    }

    #[test]
    fn test_wrap_paragraphs_keeps_blank_lines() {
        let wrapped = wrap_paragraphs("Title\n\nBody text", 40);
        assert_eq!(wrapped, "Title\n\nBody text");
    }

    #[test]
    fn test_cli_parses_choices() {
        let cli = Cli::try_parse_from([
            "sparring",
            "--topic",
            "Remote work is here to stay",
            "--stance",
            "against",
            "--language",
            "yoruba",
            "--voice",
            "female",
            "--offline",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.topic.as_deref(), Some("Remote work is here to stay"));
        assert_eq!(cli.stance, Some(Stance::Against));
        assert_eq!(cli.language, Some(Language::Yoruba));
        assert_eq!(cli.voice, Some(VoiceGender::Female));
        assert!(cli.offline);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_bad_stance() {
        assert!(Cli::try_parse_from(["sparring", "--stance", "sideways"]).is_err());
    }

    #[tokio::test]
    async fn test_plain_lines_build_draft() {
        let mut controller = DebateController::new(
            Config::default().new_session(),
            sparring_core::TimingConfig::instant(),
        );
        handle_line(&mut controller, "First line").await;
        handle_line(&mut controller, "").await;
        handle_line(&mut controller, "Second line").await;
        assert_eq!(controller.input(), "First line\nSecond line");

        handle_line(&mut controller, "/clear").await;
        assert_eq!(controller.input(), "");
    }

    #[tokio::test]
    async fn test_commands_edit_session() {
        let mut controller = DebateController::new(
            Config::default().new_session(),
            sparring_core::TimingConfig::instant(),
        );
        handle_line(&mut controller, "/topic Universal basic income").await;
        handle_line(&mut controller, "/stance against").await;
        handle_line(&mut controller, "/language hausa").await;
        handle_line(&mut controller, "/voice female").await;

        let session = controller.session();
        assert_eq!(session.topic, "Universal basic income");
        assert_eq!(session.stance, Stance::Against);
        assert_eq!(session.language, Language::Hausa);
        assert_eq!(session.voice, VoiceGender::Female);
        assert!(handle_line(&mut controller, "/quit").await == Flow::Quit);
    }
}
