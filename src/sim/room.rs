//! Tile rooms
//!
//! A room starts from an authored grid of tile codes (0 = empty). Generation
//! runs in two passes: first some codes are swapped for decorative variants
//! from the same family, then one static [`EntityKind::Tile`] is spawned per
//! non-empty cell. Collision always comes from the authored code, so a
//! variant can never turn a floor into a wall.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, ObjectId, SimObject};
use super::physics::Aabb;
use super::world::World;
use crate::consts::TILE_SIZE;

/// Category digit for walkable floor
pub const FLOOR_CATEGORY: u16 = 1;

/// Tile code lookup: sprites and variant families
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileTable {
    pub sprites: BTreeMap<u16, String>,
    /// Authored code -> decorative variants it may be swapped for
    pub variants: BTreeMap<u16, Vec<u16>>,
}

impl TileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(mut self, code: u16, sprite: &str) -> Self {
        self.sprites.insert(code, sprite.to_string());
        self
    }

    pub fn with_variants(mut self, family: u16, variants: &[u16]) -> Self {
        self.variants.insert(family, variants.to_vec());
        self
    }

    /// Floors in the tens, walls in the twenties, props in the thirties
    pub fn dungeon() -> Self {
        Self::new()
            .with_sprite(11, "tiles/floor.png")
            .with_sprite(12, "tiles/floor-cracked.png")
            .with_sprite(13, "tiles/floor-moss.png")
            .with_sprite(14, "tiles/floor-bones.png")
            .with_sprite(21, "tiles/wall.png")
            .with_sprite(22, "tiles/wall-brick.png")
            .with_sprite(23, "tiles/wall-banner.png")
            .with_sprite(31, "tiles/pillar.png")
            .with_variants(11, &[12, 13, 14])
            .with_variants(21, &[22, 23])
    }

    pub fn sprite(&self, code: u16) -> Option<&str> {
        self.sprites.get(&code).map(String::as_str)
    }

    pub fn variants_of(&self, family: u16) -> &[u16] {
        self.variants.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Leading decimal digit of a tile code
pub fn category_digit(code: u16) -> u16 {
    let mut c = code;
    while c >= 10 {
        c /= 10;
    }
    c
}

/// Everything but empty cells and floors blocks movement
pub fn has_collision(family: u16) -> bool {
    family != 0 && category_digit(family) != FLOOR_CATEGORY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Authored codes, row-major. Never mutated.
    pub layout: Vec<Vec<u16>>,
    /// Codes after variant substitution
    pub tiles: Vec<Vec<u16>>,
    pub table: TileTable,
}

impl Room {
    pub fn new(layout: Vec<Vec<u16>>, table: TileTable) -> Self {
        Self {
            tiles: layout.clone(),
            layout,
            table,
        }
    }

    /// Walled rectangle of floor with a pillar in the middle
    pub fn walled(cols: usize, rows: usize, table: TileTable) -> Self {
        let layout = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                            21
                        } else if row == rows / 2 && col == cols / 2 {
                            31
                        } else {
                            11
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(layout, table)
    }

    pub fn rows(&self) -> usize {
        self.layout.len()
    }

    pub fn cols(&self) -> usize {
        self.layout.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Room extent in simulation units
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            Vec2::ZERO,
            Vec2::new(self.cols() as f32, self.rows() as f32) * TILE_SIZE,
        )
    }

    /// Swap some cells for a random variant of their family.
    ///
    /// Starts from the authored layout each time. Returns the number of
    /// substituted cells.
    pub fn generate(&mut self, rng: &mut impl Rng, chance_percent: u32) -> usize {
        self.tiles = self.layout.clone();
        let mut swapped = 0;
        for row in self.tiles.iter_mut() {
            for code in row.iter_mut() {
                if *code == 0 {
                    continue;
                }
                let variants = self.table.variants_of(*code);
                if variants.is_empty() || rng.random_range(0..100) >= chance_percent {
                    continue;
                }
                *code = variants[rng.random_range(0..variants.len())];
                swapped += 1;
            }
        }
        log::debug!("room generated: {} of {} cells swapped", swapped, self.cell_count());
        swapped
    }

    fn cell_count(&self) -> usize {
        self.layout.iter().flatten().filter(|&&c| c != 0).count()
    }

    /// Spawn one tile per non-empty cell and set the world bounds
    pub fn spawn_tiles(&self, world: &mut World) -> Vec<ObjectId> {
        world.bounds = Some(self.bounds());
        let mut ids = Vec::with_capacity(self.cell_count());
        for (row, (authored, placed)) in self.layout.iter().zip(&self.tiles).enumerate() {
            for (col, (&family, &code)) in authored.iter().zip(placed).enumerate() {
                if family == 0 {
                    continue;
                }
                let pos = Vec2::new(col as f32, row as f32) * TILE_SIZE;
                let tag = self
                    .table
                    .sprite(code)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("tile-{code}"));
                let tile = SimObject::new(EntityKind::Tile { code, family }, pos, Vec2::splat(TILE_SIZE))
                    .with_collision(has_collision(family))
                    .with_render_tag(tag);
                ids.push(world.spawn(tile));
            }
        }
        log::info!("room {}x{}: spawned {} tiles", self.cols(), self.rows(), ids.len());
        ids
    }
}
