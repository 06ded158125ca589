//! Audio, speech and vibration cues keyed to session events.
//!
//! Cues are derived from events after the transition has happened and are
//! played on a separate task. Nothing here can delay or influence the engine.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::{Event, EventSink};

/// Which cue channels are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub vibrate: bool,
    #[serde(default = "default_true")]
    pub voice: bool,
    /// 0.0 .. 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Volume to restore when unmuting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted_volume: Option<f64>,
}

fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    0.7
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sound: true,
            vibrate: true,
            voice: true,
            volume: default_volume(),
            muted_volume: None,
        }
    }
}

impl FeedbackConfig {
    /// Mute, remembering the current volume, or restore the remembered one.
    /// Returns the new volume.
    pub fn toggle_mute(&mut self) -> f64 {
        if self.volume > 0.0 {
            self.muted_volume = Some(self.volume);
            self.volume = 0.0;
        } else {
            self.volume = self.muted_volume.take().unwrap_or_else(default_volume);
        }
        self.volume
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cue {
    Beep { freq_hz: u32, duration_ms: u32 },
    Speak { text: String },
    /// Alternating on/off durations in milliseconds.
    Vibrate { pattern: Vec<u32> },
}

fn beep(freq_hz: u32, duration_ms: u32) -> Cue {
    Cue::Beep {
        freq_hz,
        duration_ms,
    }
}

fn speak(text: impl Into<String>) -> Cue {
    Cue::Speak { text: text.into() }
}

fn vibrate(pattern: &[u32]) -> Cue {
    Cue::Vibrate {
        pattern: pattern.to_vec(),
    }
}

/// Cues for one event, filtered by the enabled channels.
pub fn cues_for(event: &Event, config: &FeedbackConfig) -> Vec<Cue> {
    let cues = match event {
        Event::CountdownStarting { .. } => vec![
            speak("Exercise starts in 3, 2, 1"),
            beep(600, 100),
            beep(700, 100),
            beep(800, 200),
        ],
        Event::IntervalBegins {
            interval_number, ..
        } => vec![
            speak(format!("Interval {interval_number} begins. Exercise.")),
            beep(900, 150),
            vibrate(&[200, 60, 200]),
        ],
        Event::RestBegins { .. } => vec![speak("Rest"), beep(500, 120), vibrate(&[120])],
        Event::ExerciseBegins {
            exercise_number, ..
        } => vec![
            speak(format!("Exercise {exercise_number}")),
            beep(800, 150),
            vibrate(&[200]),
        ],
        Event::Paused { .. } => vec![speak("Paused")],
        Event::Resumed { .. } => vec![speak("Resuming")],
        Event::SessionEnded { .. } => vec![speak("Workout complete")],
        Event::Tick { .. } | Event::SessionReset { .. } => Vec::new(),
    };

    cues.into_iter()
        .filter(|cue| match cue {
            Cue::Beep { .. } => config.sound && config.volume > 0.0,
            Cue::Speak { .. } => config.voice,
            Cue::Vibrate { .. } => config.vibrate,
        })
        .collect()
}

/// Output device for cues.
pub trait CuePlayer: Send + 'static {
    fn play(&mut self, cue: &Cue, volume: f64);
}

/// [`EventSink`] that turns events into cues and hands them to a player task
/// without waiting for playback.
pub struct FeedbackDispatcher {
    config: FeedbackConfig,
    tx: mpsc::UnboundedSender<Cue>,
}

impl FeedbackDispatcher {
    /// Spawn the player task on the current tokio runtime.
    ///
    /// The task exits once the dispatcher is dropped and queued cues drain.
    pub fn spawn<P: CuePlayer>(config: FeedbackConfig, mut player: P) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Cue>();
        let volume = config.volume;
        let handle = tokio::spawn(async move {
            while let Some(cue) = rx.recv().await {
                player.play(&cue, volume);
            }
        });
        (Self { config, tx }, handle)
    }
}

impl EventSink for FeedbackDispatcher {
    fn emit(&mut self, event: &Event) {
        for cue in cues_for(event, &self.config) {
            if self.tx.send(cue).is_err() {
                debug!("cue player has stopped; dropping cue");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[test]
    fn interval_start_has_distinct_announcement() {
        let cues = cues_for(
            &Event::IntervalBegins {
                interval_number: 2,
                at: Utc::now(),
            },
            &FeedbackConfig::default(),
        );
        assert_eq!(
            cues,
            vec![
                speak("Interval 2 begins. Exercise."),
                beep(900, 150),
                vibrate(&[200, 60, 200]),
            ]
        );
    }

    #[test]
    fn mute_toggle_restores_previous_volume() {
        let mut config = FeedbackConfig {
            volume: 0.4,
            ..FeedbackConfig::default()
        };
        assert_eq!(config.toggle_mute(), 0.0);
        assert_eq!(config.muted_volume, Some(0.4));
        assert_eq!(config.toggle_mute(), 0.4);
        assert_eq!(config.muted_volume, None);

        // Zero volume set by hand unmutes to the default.
        config.volume = 0.0;
        assert_eq!(config.toggle_mute(), 0.7);
    }

    #[test]
    fn disabled_channels_are_filtered() {
        let config = FeedbackConfig {
            sound: true,
            vibrate: false,
            voice: false,
            volume: 0.0,
            muted_volume: None,
        };
        let cues = cues_for(
            &Event::ExerciseBegins {
                exercise_number: 3,
                at: Utc::now(),
            },
            &config,
        );
        assert!(cues.is_empty());
    }

    #[test]
    fn ticks_produce_no_cues() {
        let tick = Event::Tick {
            remaining_ms: 1,
            progress_fraction: 0.9,
            phase: crate::timer::Phase::Exercise,
            total_remaining_secs: 1,
            current_interval: 1,
            current_exercise: 1,
        };
        assert!(cues_for(&tick, &FeedbackConfig::default()).is_empty());
    }

    struct Recorder(Arc<Mutex<Vec<Cue>>>);

    impl CuePlayer for Recorder {
        fn play(&mut self, cue: &Cue, _volume: f64) {
            if let Ok(mut played) = self.0.lock() {
                played.push(cue.clone());
            }
        }
    }

    #[tokio::test]
    async fn dispatcher_plays_cues_on_player_task() {
        let played = Arc::new(Mutex::new(Vec::new()));
        let (mut dispatcher, handle) =
            FeedbackDispatcher::spawn(FeedbackConfig::default(), Recorder(played.clone()));

        dispatcher.emit(&Event::RestBegins { at: Utc::now() });
        drop(dispatcher);
        handle.await.unwrap();

        assert_eq!(played.lock().unwrap().len(), 3);
    }
}
