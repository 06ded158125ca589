use clap::Args;
use interval_timer_core::format::clock;
use interval_timer_core::storage::{Config, Database, PresetStore};
use interval_timer_core::{
    Control, Event, EventSink, FeedbackConfig, FeedbackDispatcher, RawWorkoutConfig, Scheduler,
    SessionEngine, SessionError, WorkoutConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::render::{TerminalCuePlayer, TerminalRenderer};
use super::WorkoutArgs;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    workout: WorkoutArgs,
    /// Start from a saved preset (id or name) instead of the last-used settings
    #[arg(long)]
    preset: Option<String>,
    /// Print events as JSON lines instead of the live display
    #[arg(long)]
    json: bool,
    /// Disable beeps, speech and vibration cues
    #[arg(long)]
    quiet: bool,
}

#[derive(Args)]
pub struct TotalArgs {
    #[command(flatten)]
    workout: WorkoutArgs,
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// Map one line of keyboard input to a control.
fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "resume" => Some(Control::TogglePause),
        "s" | "skip" => Some(Control::Skip),
        "r" | "reset" | "q" | "quit" => Some(Control::Reset),
        _ => None,
    }
}

/// Forward stdin lines as controls. Keeps the sender alive after EOF so a
/// closed stdin never aborts the workout.
async fn read_controls(tx: mpsc::Sender<Control>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_control(&line) {
            Some(control) => {
                if tx.send(control).await.is_err() {
                    return;
                }
            }
            None => tracing::debug!(%line, "unrecognized input"),
        }
    }
    std::future::pending::<()>().await;
}

async fn drive(
    raw: RawWorkoutConfig,
    feedback: FeedbackConfig,
    json: bool,
    quiet: bool,
) -> Result<Option<Event>, Box<dyn std::error::Error>> {
    let mut engine = SessionEngine::new();
    let countdown = engine.start_raw(raw)?;

    let mut renderer = TerminalRenderer::new(*engine.config(), json);
    let (mut cues, player) = if quiet {
        (None, None)
    } else {
        let (dispatcher, handle) = FeedbackDispatcher::spawn(feedback, TerminalCuePlayer);
        (Some(dispatcher), Some(handle))
    };

    let (tx, mut rx) = mpsc::channel(16);
    let reader = tokio::spawn(read_controls(tx));

    let last = {
        let mut sink = (&mut renderer, CueSink(cues.as_mut()));
        sink.emit(&countdown);
        Scheduler::run(&mut engine, &mut rx, &mut sink).await
    };

    reader.abort();
    drop(cues);
    if let Some(player) = player {
        join_player(player).await;
    }
    Ok(last)
}

/// Wait for the cue player to drain. Returns false if it panicked or was
/// cancelled; the workout result stands either way.
async fn join_player(player: JoinHandle<()>) -> bool {
    match player.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("cue player stopped abnormally: {e}");
            false
        }
    }
}

/// Optional cue dispatcher as a sink.
struct CueSink<'a>(Option<&'a mut FeedbackDispatcher>);

impl EventSink for CueSink<'_> {
    fn emit(&mut self, event: &Event) {
        if let Some(dispatcher) = self.0.as_mut() {
            dispatcher.emit(event);
        }
    }
}

fn base_config(preset: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    match preset {
        Some(id) => {
            let db = Database::open()?;
            Ok(PresetStore::new(&db).get(id)?.settings)
        }
        None => Ok(Config::load_or_default()),
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = base_config(args.preset.as_deref())?;
    let raw = args.workout.overlay(config.workout);

    // Validate before touching the saved settings.
    config.workout = WorkoutConfig::try_from(raw).map_err(SessionError::InvalidConfiguration)?;
    if let Err(e) = config.save() {
        tracing::warn!("could not save last-used settings: {e}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(raw, config.feedback.clone(), args.json, args.quiet));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();

    if let Some(Event::SessionEnded { summary }) = result? {
        tracing::info!(total_elapsed_secs = summary.total_elapsed_secs, "workout finished");
    }
    Ok(())
}

pub fn total(args: TotalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let workout = WorkoutConfig::try_from(args.workout.overlay(config.workout))
        .map_err(SessionError::InvalidConfiguration)?;
    let total = workout.total_secs();

    if args.json {
        let value = serde_json::json!({
            "workout": workout,
            "per_interval_secs": workout.per_interval_secs(),
            "total_secs": total,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Total workout time: {} ({total}s)", clock(total));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_control_accepts_short_and_long_forms() {
        assert_eq!(parse_control("p"), Some(Control::TogglePause));
        assert_eq!(parse_control(" Pause \n"), Some(Control::TogglePause));
        assert_eq!(parse_control("s"), Some(Control::Skip));
        assert_eq!(parse_control("q"), Some(Control::Reset));
        assert_eq!(parse_control("reset"), Some(Control::Reset));
        assert_eq!(parse_control("x"), None);
    }

    #[tokio::test]
    async fn join_player_reports_a_panicked_player() {
        let clean = tokio::spawn(async {});
        assert!(join_player(clean).await);

        let crashed = tokio::spawn(async { panic!("audio device gone") });
        assert!(!join_player(crashed).await);
    }
}
