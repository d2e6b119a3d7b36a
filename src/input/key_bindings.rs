use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::DrumKind;

const KEY_BINDINGS_FILE: &str = "keybindings.json";

/// Keyboard key assigned to each drum. Keys are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: BTreeMap<DrumKind, String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = DrumKind::all()
            .iter()
            .map(|&drum| (drum, drum.default_key().to_string()))
            .collect();
        Self { keys }
    }
}

impl KeyBindings {
    pub fn key_for(&self, drum: DrumKind) -> &str {
        self.keys.get(&drum).map(String::as_str).unwrap_or_default()
    }

    /// Rebind `drum`. Another drum already bound to the same key keeps it;
    /// lookups then resolve to the first drum in kit order.
    pub fn set(&mut self, drum: DrumKind, key: &str) {
        self.keys.insert(drum, key.to_lowercase());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drum bound to `key`, compared case-insensitively.
    pub fn drum_for_key(&self, key: &str) -> Option<DrumKind> {
        let key = key.to_lowercase();
        self.keys
            .iter()
            .find(|(_, bound)| **bound == key)
            .map(|(&drum, _)| drum)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrumKind, &str)> + '_ {
        self.keys.iter().map(|(&drum, key)| (drum, key.as_str()))
    }

    /// Load bindings from the default file.
    pub fn load() -> Result<Self> {
        Self::load_from(KEY_BINDINGS_FILE)
    }

    /// Load bindings from a specific path. Missing drums get their default key.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut bindings: Self = serde_json::from_str(&content)?;
        bindings.normalize();
        Ok(bindings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(KEY_BINDINGS_FILE)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub(crate) fn normalize(&mut self) {
        for key in self.keys.values_mut() {
            *key = key.to_lowercase();
        }
        for &drum in DrumKind::all() {
            self.keys
                .entry(drum)
                .or_insert_with(|| drum.default_key().to_string());
        }
    }
}
