//! Player settings and preferences
//!
//! Persisted separately from the ship save in the same key-value store.

use serde::{Deserialize, Serialize};

use crate::persistence::KvStore;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Star population generated at startup
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 1500,
            QualityPreset::Medium => 4000,
            QualityPreset::High => 9000,
        }
    }

    /// Trail length multiplier (1.0 = full)
    pub fn trail_quality(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.25,
            QualityPreset::Medium => 0.6,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether stars twinkle (otherwise drawn at base opacity)
    pub fn twinkle_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Whether radar pulse arcs are drawn
    pub fn radar_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Ship trail ribbon
    pub trails: bool,
    /// Radar pulse arcs near planets
    pub radar: bool,
    /// Planet interaction rings while in range
    pub range_rings: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when the page is hidden
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no twinkle, no radar)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            trails: true,
            radar: true,
            range_rings: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "space_map_settings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective radar (respects reduced_motion and quality)
    pub fn effective_radar(&self) -> bool {
        self.radar && self.quality.radar_enabled() && !self.reduced_motion
    }

    /// Effective twinkle (respects reduced_motion and quality)
    pub fn effective_twinkle(&self) -> bool {
        self.quality.twinkle_enabled() && !self.reduced_motion
    }

    /// Maximum trail points drawn
    pub fn trail_points(&self, max_points: usize) -> usize {
        if !self.trails {
            0
        } else {
            ((max_points as f32) * self.quality.trail_quality()).round() as usize
        }
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(store: &impl KvStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(err) => log::warn!("Ignoring malformed settings: {}", err),
            },
            Ok(None) => {}
            Err(err) => log::warn!("Settings unavailable: {}", err),
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut impl KvStore) {
        let result = serde_json::to_string(self)
            .map_err(Into::into)
            .and_then(|json| store.set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("Settings save failed: {}", err),
        }
    }
}
