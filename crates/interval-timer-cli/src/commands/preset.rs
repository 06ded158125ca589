//! Preset management commands.
//!
//! A preset is a named snapshot of the whole configuration: workout shape
//! and feedback settings.

use clap::Subcommand;
use interval_timer_core::format::clock;
use interval_timer_core::storage::{Config, Database, Preset, PresetStore};

#[derive(Subcommand)]
pub enum PresetAction {
    /// List saved presets
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the current configuration under a name
    Save {
        /// Preset name
        name: String,
    },
    /// Show one preset
    Show {
        /// Preset id or name
        id: String,
    },
    /// Delete a preset
    Delete {
        /// Preset id or name
        id: String,
    },
    /// Make a preset the current configuration
    Apply {
        /// Preset id or name
        id: String,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let store = PresetStore::new(&db);

    match action {
        PresetAction::List { json } => {
            let presets = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&presets)?);
            } else if presets.is_empty() {
                println!("No presets saved.");
            } else {
                for preset in &presets {
                    println!("  {}", describe(preset));
                }
            }
        }
        PresetAction::Save { name } => {
            let config = Config::load()?;
            let preset = store.save(&name, &config)?;
            println!("Preset saved: {}", describe(&preset));
        }
        PresetAction::Show { id } => {
            let preset = store.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&preset)?);
        }
        PresetAction::Delete { id } => {
            let preset = store.get(&id)?;
            store.delete(&preset.id)?;
            println!("Preset deleted: {}", preset.name);
        }
        PresetAction::Apply { id } => {
            let preset = store.get(&id)?;
            preset.settings.save()?;
            println!("Preset applied: {}", describe(&preset));
        }
    }
    Ok(())
}

fn describe(preset: &Preset) -> String {
    let w = &preset.settings.workout;
    format!(
        "{} - {} ({}s exercise / {}s rest, {} x {}, total {})",
        preset.id,
        preset.name,
        w.exercise_secs,
        w.rest_secs,
        w.exercises_per_interval,
        w.intervals,
        clock(w.total_secs()),
    )
}
