//! Simulation settings and tuning
//!
//! Loaded from a JSON file named by `SPELLROOM_SETTINGS`; every field is
//! optional and falls back to the defaults below. Stat blocks that are
//! present but incomplete get zero for the missing stats.

use serde::{Deserialize, Serialize};

use crate::consts::{PIXEL_SIZE, TICK_RATE_HZ};
use crate::sim::Stats;

/// How many cosmetic effects may be alive at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffectDensity {
    Low,
    #[default]
    Medium,
    High,
}

impl EffectDensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectDensity::Low => "Low",
            EffectDensity::Medium => "Medium",
            EffectDensity::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(EffectDensity::Low),
            "medium" | "med" => Some(EffectDensity::Medium),
            "high" => Some(EffectDensity::High),
            _ => None,
        }
    }

    /// Cap on live effect objects for this preset
    pub fn max_effects(&self) -> usize {
        match self {
            EffectDensity::Low => 32,
            EffectDensity::Medium => 128,
            EffectDensity::High => 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for tile variants, frog jumps and effect jitter
    pub seed: u64,
    /// Simulation ticks per second
    pub tick_rate_hz: f64,
    /// Screen pixels per simulation unit
    pub pixel_size: f32,

    // === Timers ===
    /// Mana regen period
    pub mana_regen_interval_ms: f64,
    /// Lifetime of a projectile that never hits anything
    pub projectile_ttl_ms: f64,

    // === Rooms ===
    /// Chance (0-100) that a tile with variants is swapped for one
    pub variant_chance_percent: u32,

    // === Effects ===
    /// Cosmetic particle spawning on/off
    pub effects: bool,
    pub density: EffectDensity,

    // === Archetypes ===
    pub character: Stats,
    pub frog: Stats,
    pub chest: Stats,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            tick_rate_hz: TICK_RATE_HZ,
            pixel_size: PIXEL_SIZE,

            mana_regen_interval_ms: 100.0,
            projectile_ttl_ms: 3000.0,

            variant_chance_percent: 20,

            effects: true,
            density: EffectDensity::Medium,

            character: Stats {
                hp: 100.0,
                max_hp: 100.0,
                mana: 100.0,
                max_mana: 100.0,
                mana_usage: 10.0,
                mana_regen: 1.0,
                speed: 0.15,
                fire_rate: 500.0,
                damage: 10.0,
                projectile_speed: 1.0,
                jump_delay: 0.0,
            },
            frog: Stats {
                hp: 30.0,
                max_hp: 30.0,
                speed: 1.2,
                jump_delay: 900.0,
                ..Stats::default()
            },
            chest: Stats {
                hp: 20.0,
                max_hp: 20.0,
                ..Stats::default()
            },
        }
    }
}

impl Settings {
    /// Environment variable naming a JSON settings file
    pub const PATH_ENV: &'static str = "SPELLROOM_SETTINGS";
    /// Environment variable overriding the seed
    pub const SEED_ENV: &'static str = "SPELLROOM_SEED";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Effective cap on live effects (0 when effects are off)
    pub fn max_effects(&self) -> usize {
        if !self.effects {
            0
        } else {
            self.density.max_effects()
        }
    }

    /// Load from `SPELLROOM_SETTINGS`, falling back to defaults
    pub fn load() -> Self {
        let mut settings = match std::env::var(Self::PATH_ENV) {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(json) => match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from {}", path);
                        settings
                    }
                    Err(e) => {
                        log::warn!("Bad settings file {}: {} - using defaults", path, e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Cannot read settings file {}: {} - using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Some(seed) = std::env::var(Self::SEED_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            settings.seed = seed;
        }
        settings
    }
}
