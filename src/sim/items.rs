//! Loot records
//!
//! Items are inert data: a name, a description and an ordered list of stat
//! modifiers that are applied to whoever picks them up.

use serde::{Deserialize, Serialize};

use super::entity::{StatKind, Stats};

/// One (stat, delta) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatKind,
    pub delta: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub description: String,
    pub sprite: String,
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
}

impl Item {
    pub fn new(name: &str, description: &str, sprite: &str, modifiers: &[(StatKind, f32)]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            sprite: sprite.to_string(),
            modifiers: modifiers
                .iter()
                .map(|&(stat, delta)| StatModifier { stat, delta })
                .collect(),
        }
    }

    /// Apply every modifier in order
    pub fn apply_to(&self, stats: &mut Stats) {
        for m in &self.modifiers {
            stats.apply(m.stat, m.delta);
        }
    }
}

/// Built-in loot table
pub fn catalog() -> Vec<Item> {
    vec![
        Item::new(
            "shaped glass",
            "hits harder, but you are made of glass",
            "images/shaped-glass.png",
            &[(StatKind::Damage, 5.0), (StatKind::MaxHp, -50.0)],
        ),
        Item::new(
            "mana shard",
            "a deeper well of mana",
            "images/mana-shard.png",
            &[(StatKind::MaxMana, 25.0), (StatKind::Mana, 25.0)],
        ),
        Item::new(
            "quick boots",
            "light on your feet",
            "images/quick-boots.png",
            &[(StatKind::Speed, 0.05)],
        ),
    ]
}
