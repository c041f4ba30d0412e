//! Objection! CLI — play timed debate rounds against Judge AI in the
//! terminal.
//!
//! ```bash
//! # Live judge (requires GEMINI_API_KEY)
//! GEMINI_API_KEY=... objection
//!
//! # Offline against the deterministic judge
//! objection --offline
//!
//! # Shorter drills
//! objection --offline --rounds 1 --seconds 30
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use objection::{
    CannedJudge, GameConfig, GameEngine, GameError, GamePhase, GeminiJudge, JudgeSource,
    PromptChoice, RoundOutcome, TickOutcome,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Practice your argumentation skills against Judge AI")]
struct Args {
    /// Rounds per session (overrides OBJECTION_ROUNDS)
    #[arg(long)]
    rounds: Option<u32>,

    /// Seconds per round (overrides OBJECTION_ROUND_SECONDS)
    #[arg(long)]
    seconds: Option<u32>,

    /// Play offline against the deterministic judge
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Tell the player when the judge ignored the scoring format
    #[arg(long, default_value_t = false)]
    surface_degraded: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = GameConfig::from_env();
    if let Some(rounds) = args.rounds {
        config.total_rounds = rounds;
    }
    if let Some(seconds) = args.seconds {
        config.round_seconds = seconds;
    }
    if args.surface_degraded {
        config.surface_degraded = true;
    }

    let judge: Arc<dyn JudgeSource> = if args.offline {
        Arc::new(CannedJudge::new())
    } else {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) => Arc::new(
                GeminiJudge::with_timeout(
                    key,
                    Duration::from_secs(config.request_timeout_secs),
                )
                .context("building Gemini judge")?,
            ),
            Err(_) => {
                warn!("GEMINI_API_KEY not set — playing offline against the canned judge");
                Arc::new(CannedJudge::new())
            }
        }
    };

    run_game(GameEngine::new(judge, config)).await
}

async fn run_game(mut engine: GameEngine) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "⚖  Objection! — face Judge AI across {} rounds.",
        engine.session().total_rounds
    );
    engine.start()?;

    loop {
        let session = engine.session();
        println!("\n── Round {} of {} ──", session.current_round, session.total_rounds);
        println!("Enter your own debate topic, or press Enter to have one generated:");

        let choice = match lines.next_line().await? {
            Some(line) if !line.trim().is_empty() => PromptChoice::Custom(line),
            _ => PromptChoice::Generated,
        };
        let topic = match engine.start_round(choice).await {
            Ok(topic) => topic,
            Err(err @ GameError::EmptyPrompt) => {
                println!("{err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        println!("\nTHE CASE: {topic}");
        println!(
            "You have {}s. State your argument; finish with an empty line.",
            engine.session().round_seconds
        );

        let outcome = compose_and_submit(&mut engine, &mut lines).await?;
        print_verdict(&outcome);

        if engine.advance()? == GamePhase::End {
            break;
        }
    }

    let session = engine.session();
    println!(
        "\nTrial complete! Final score: {}/100 across {} rounds.",
        engine.final_score(),
        session.scores.len()
    );
    for (index, score) in session.scores.iter().enumerate() {
        println!("  Round {}: {}", index + 1, score);
    }
    Ok(())
}

/// Drive the composing phase: collect argument lines while the countdown
/// runs, submitting on a blank line, EOF, or expiry.
async fn compose_and_submit(
    engine: &mut GameEngine,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<RoundOutcome> {
    enum Event {
        Line(Option<String>),
        Tick(Option<TickOutcome>),
    }

    let mut buffer = String::new();
    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            tick = engine.next_tick() => Event::Tick(tick),
        };

        match event {
            Event::Line(Some(line)) => {
                if line.trim().is_empty() && !buffer.trim().is_empty() {
                    println!("Judge AI is deliberating…");
                    return Ok(engine.submit().await?);
                }
                buffer.push_str(&line);
                buffer.push('\n');
                engine.set_argument(&buffer);
            }
            // stdin closed — force submission with whatever exists.
            Event::Line(None) => {
                println!("Judge AI is deliberating…");
                return Ok(engine.submit_expired().await?);
            }
            Event::Tick(Some(TickOutcome::Running(remaining))) => {
                if remaining % 30 == 0 || remaining == 10 {
                    println!("⏱  {remaining}s remaining");
                }
            }
            Event::Tick(Some(TickOutcome::Expired)) => {
                println!("Time! Submitting what you have…");
                return Ok(engine.submit_expired().await?);
            }
            Event::Tick(_) => {}
        }
    }
}

fn print_verdict(outcome: &RoundOutcome) {
    println!("\n── Round {} Verdict ──", outcome.round);
    println!("{}", outcome.verdict);
    if let Some(notice) = &outcome.notice {
        println!("({notice})");
    }
}
