//! Named configuration presets.
//!
//! Presets live as one JSON list under a single key of the kv store.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Config, Database};
use crate::error::{CoreError, Result, ValidationError};

const PRESETS_KEY: &str = "interval_timer:presets";

/// A named snapshot of the full configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub settings: Config,
}

/// Preset CRUD on top of the kv store.
pub struct PresetStore<'a> {
    db: &'a Database,
}

impl<'a> PresetStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All presets in insertion order. A corrupt blob reads as empty.
    pub fn list(&self) -> Result<Vec<Preset>> {
        let Some(raw) = self.db.kv_get(PRESETS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(presets) => Ok(presets),
            Err(e) => {
                debug!("ignoring unreadable presets: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn write(&self, presets: &[Preset]) -> Result<()> {
        let json = serde_json::to_string(presets)?;
        self.db.kv_set(PRESETS_KEY, &json)?;
        Ok(())
    }

    /// Store a new preset with a fresh id.
    ///
    /// # Errors
    /// Returns a validation error for a blank name.
    pub fn save(&self, name: &str, settings: &Config) -> Result<Preset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "preset name must not be empty".into(),
            }
            .into());
        }
        let preset = Preset {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            settings: settings.clone(),
        };
        let mut presets = self.list()?;
        presets.push(preset.clone());
        self.write(&presets)?;
        debug!(id = %preset.id, name = %preset.name, "preset saved");
        Ok(preset)
    }

    /// Look a preset up by id, falling back to an exact name match.
    pub fn find(&self, id_or_name: &str) -> Result<Option<Preset>> {
        let presets = self.list()?;
        let by_id = presets.iter().position(|p| p.id == id_or_name);
        let index = by_id.or_else(|| presets.iter().position(|p| p.name == id_or_name));
        Ok(index.map(|i| presets[i].clone()))
    }

    /// Like [`find`](Self::find) but a miss is an error.
    pub fn get(&self, id_or_name: &str) -> Result<Preset> {
        self.find(id_or_name)?
            .ok_or_else(|| CoreError::Custom(format!("preset not found: {id_or_name}")))
    }

    /// Remove a preset by id. Returns whether one was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut presets = self.list()?;
        let before = presets.len();
        presets.retain(|p| p.id != id);
        if presets.len() == before {
            return Ok(false);
        }
        self.write(&presets)?;
        Ok(true)
    }
}
