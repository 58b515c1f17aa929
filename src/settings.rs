//! Player preferences
//!
//! Persisted separately from progression, one flag per key, stored as
//! `"true"` / `"false"` so older saves stay readable.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, keys, set_or_warn};

/// Player preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// All audio muted
    pub muted: bool,
    /// Controls tutorial already shown
    pub onboarding_seen: bool,
}

fn read_flag(store: &impl KeyValueStore, key: &str) -> bool {
    match store.get(key).as_deref() {
        Some("true") => true,
        Some("false") | None => false,
        Some(other) => {
            log::warn!("Ignoring unexpected value {:?} for `{}`", other, key);
            false
        }
    }
}

impl Settings {
    /// Load from `store`, falling back to defaults for anything missing
    pub fn load(store: &impl KeyValueStore) -> Self {
        let settings = Self {
            muted: read_flag(store, keys::AUDIO_MUTED),
            onboarding_seen: read_flag(store, keys::ONBOARDING_SEEN),
        };
        log::info!("Loaded settings: {:?}", settings);
        settings
    }

    /// Write every flag. Returns false if any write failed.
    pub fn save(&self, store: &mut impl KeyValueStore) -> bool {
        let muted = set_or_warn(store, keys::AUDIO_MUTED, bool_str(self.muted));
        let onboarding = set_or_warn(store, keys::ONBOARDING_SEEN, bool_str(self.onboarding_seen));
        muted && onboarding
    }

    /// Flip mute and persist it; returns the new state
    pub fn toggle_mute(&mut self, store: &mut impl KeyValueStore) -> bool {
        self.muted = !self.muted;
        set_or_warn(store, keys::AUDIO_MUTED, bool_str(self.muted));
        self.muted
    }

    pub fn mark_onboarding_seen(&mut self, store: &mut impl KeyValueStore) {
        if !self.onboarding_seen {
            self.onboarding_seen = true;
            set_or_warn(store, keys::ONBOARDING_SEEN, "true");
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
