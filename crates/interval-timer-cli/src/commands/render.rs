//! Terminal presentation of session events and cues.

use std::io::Write;

use interval_timer_core::format::{clock, countdown, progress_bar};
use interval_timer_core::{Cue, CuePlayer, Event, EventSink, Summary, WorkoutConfig};

const BAR_WIDTH: usize = 24;

/// Draws events on stdout: a live status line for ticks, one line per
/// transition, and the summary at the end. In JSON mode every event except
/// ticks is printed as one JSON object per line.
pub struct TerminalRenderer {
    config: WorkoutConfig,
    json: bool,
    status_line_open: bool,
}

impl TerminalRenderer {
    pub fn new(config: WorkoutConfig, json: bool) -> Self {
        Self {
            config,
            json,
            status_line_open: false,
        }
    }

    fn line(&mut self, text: &str) {
        if self.status_line_open {
            println!();
            self.status_line_open = false;
        }
        println!("{text}");
    }

    fn status(&mut self, event: &Event) {
        let Event::Tick {
            remaining_ms,
            progress_fraction,
            phase,
            total_remaining_secs,
            current_interval,
            current_exercise,
        } = event
        else {
            return;
        };
        print!(
            "\r{:<8} {} {} Exercise {}/{} • Interval {}/{}  Total left: {}   ",
            phase.label(),
            countdown(*remaining_ms),
            progress_bar(*progress_fraction, BAR_WIDTH),
            current_exercise,
            self.config.exercises_per_interval,
            current_interval,
            self.config.intervals,
            clock(*total_remaining_secs),
        );
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!("status line flush failed: {e}");
        }
        self.status_line_open = true;
    }
}

impl EventSink for TerminalRenderer {
    fn emit(&mut self, event: &Event) {
        if self.json {
            if !matches!(event, Event::Tick { .. }) {
                if let Ok(json) = serde_json::to_string(event) {
                    println!("{json}");
                }
            }
            return;
        }

        match event {
            Event::Tick { .. } => self.status(event),
            Event::CountdownStarting { total_secs, .. } => self.line(&format!(
                "Workout starting: {} total. Controls: p = pause/resume, s = skip, r/q = reset (then Enter)",
                clock(*total_secs)
            )),
            Event::ExerciseBegins {
                exercise_number, ..
            } => self.line(&format!("Exercise {exercise_number}")),
            Event::RestBegins { .. } => self.line("Rest"),
            Event::IntervalBegins {
                interval_number, ..
            } => self.line(&format!("Interval {interval_number} begins")),
            Event::Paused { remaining_ms, .. } => {
                self.line(&format!("Paused ({} left in phase)", countdown(*remaining_ms)))
            }
            Event::Resumed { .. } => self.line("Resuming"),
            Event::SessionReset { .. } => self.line("Workout reset"),
            Event::SessionEnded { summary } => {
                let text = summary_text(summary);
                self.line(&text);
            }
        }
    }
}

pub fn summary_text(summary: &Summary) -> String {
    format!(
        "Workout complete\n  Total elapsed: {}\n  Active time: {} • Rest time: {}\n  Intervals: {} • Exercises per interval: {}",
        clock(summary.total_elapsed_secs),
        clock(summary.active_secs),
        clock(summary.rest_secs),
        summary.intervals,
        summary.exercises_per_interval,
    )
}

/// Plays cues with what a terminal has: the bell for beeps and a text line
/// for speech. Vibration has no terminal equivalent and is only logged.
pub struct TerminalCuePlayer;

impl CuePlayer for TerminalCuePlayer {
    fn play(&mut self, cue: &Cue, volume: f64) {
        match cue {
            Cue::Beep { freq_hz, .. } => {
                tracing::trace!(freq_hz, volume, "beep");
                eprint!("\x07");
            }
            Cue::Speak { text } => eprintln!("  >> {text}"),
            Cue::Vibrate { pattern } => tracing::debug!(?pattern, "vibrate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn summary_text_lists_every_figure() {
        let summary = Summary {
            total_elapsed_secs: 765,
            active_secs: 540,
            rest_secs: 225,
            intervals: 3,
            exercises_per_interval: 6,
            started_at: Utc::now(),
            ended_at: Utc::now(),
        };
        let text = summary_text(&summary);
        assert!(text.contains("Total elapsed: 12:45"));
        assert!(text.contains("Active time: 09:00"));
        assert!(text.contains("Rest time: 03:45"));
        assert!(text.contains("Intervals: 3"));
        assert!(text.contains("Exercises per interval: 6"));
    }
}
