//! Hex map model with tile placement, free overlays, and asset rendering

pub mod cache;
pub mod camera;
pub mod file;
pub mod hex;
pub mod library;
pub mod renderer;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hex::HexCoord;

/// Number of 60° tile orientations
pub const ROTATIONS: u8 = 6;

/// Overlay scale as a fraction of the hex diameter
pub const DEFAULT_OVERLAY_SCALE: f64 = 0.5;
pub const MIN_OVERLAY_SCALE: f64 = 0.1;
pub const MAX_OVERLAY_SCALE: f64 = 5.0;

/// A tile image locked to one hex
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTile {
    pub coord: HexCoord,
    pub path: PathBuf,
    pub category: String,
    /// Multiple of 60°, always below [`ROTATIONS`]
    pub rotation: u8,
}

impl PlacedTile {
    pub fn new(coord: HexCoord, path: impl Into<PathBuf>, category: &str, rotation: i64) -> Self {
        Self {
            coord,
            path: path.into(),
            category: category.to_string(),
            rotation: normalize_rotation_step(rotation),
        }
    }
}

/// A freely positioned image anchored to a hex
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedOverlay {
    pub anchor: HexCoord,
    pub path: PathBuf,
    /// Pixel offset from the anchor hex center
    pub offset: (f64, f64),
    /// Degrees in [0, 360)
    pub rotation: f64,
    /// Fraction of the hex diameter in [0.1, 5.0]
    pub scale: f64,
}

impl PlacedOverlay {
    pub fn new(anchor: HexCoord, path: impl Into<PathBuf>) -> Self {
        Self {
            anchor,
            path: path.into(),
            offset: (0.0, 0.0),
            rotation: 0.0,
            scale: DEFAULT_OVERLAY_SCALE,
        }
    }

    pub fn rotate(&mut self, delta: f64) {
        self.rotation = normalize_degrees(self.rotation + delta);
    }

    pub fn rescale(&mut self, delta: f64) {
        self.scale = clamp_scale(self.scale + delta);
    }
}

/// A map entry whose image file does not resolve
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingAsset {
    Tile { coord: HexCoord, path: PathBuf },
    Overlay { index: usize, path: PathBuf },
}

/// Sparse tile grid plus ordered overlays
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HexMap {
    tiles: HashMap<HexCoord, PlacedTile>,
    overlays: Vec<PlacedOverlay>,
}

impl HexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a tile, replacing any tile already at `coord`
    pub fn place_tile(&mut self, coord: HexCoord, path: impl Into<PathBuf>, category: &str, rotation: i64) {
        self.tiles
            .insert(coord, PlacedTile::new(coord, path, category, rotation));
    }

    pub fn remove_tile(&mut self, coord: HexCoord) -> Option<PlacedTile> {
        self.tiles.remove(&coord)
    }

    pub fn tile(&self, coord: HexCoord) -> Option<&PlacedTile> {
        self.tiles.get(&coord)
    }

    /// Set the rotation of an existing tile; false if the hex is empty
    pub fn set_tile_rotation(&mut self, coord: HexCoord, rotation: i64) -> bool {
        match self.tiles.get_mut(&coord) {
            Some(tile) => {
                tile.rotation = normalize_rotation_step(rotation);
                true
            }
            None => false,
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Append an overlay with default offset, rotation, and scale; returns its index
    pub fn place_overlay(&mut self, anchor: HexCoord, path: impl Into<PathBuf>) -> usize {
        self.overlays.push(PlacedOverlay::new(anchor, path));
        self.overlays.len() - 1
    }

    /// Append a fully specified overlay, normalizing its fields
    pub fn push_overlay(&mut self, mut overlay: PlacedOverlay) -> usize {
        overlay.rotation = normalize_degrees(overlay.rotation);
        overlay.scale = clamp_scale(overlay.scale);
        self.overlays.push(overlay);
        self.overlays.len() - 1
    }

    /// Remove by index. Every later overlay shifts down by one.
    pub fn remove_overlay(&mut self, index: usize) -> Option<PlacedOverlay> {
        if index < self.overlays.len() {
            Some(self.overlays.remove(index))
        } else {
            None
        }
    }

    pub fn overlay(&self, index: usize) -> Option<&PlacedOverlay> {
        self.overlays.get(index)
    }

    pub fn rotate_overlay(&mut self, index: usize, delta: f64) -> bool {
        self.overlays
            .get_mut(index)
            .map(|o| o.rotate(delta))
            .is_some()
    }

    pub fn scale_overlay(&mut self, index: usize, delta: f64) -> bool {
        self.overlays
            .get_mut(index)
            .map(|o| o.rescale(delta))
            .is_some()
    }

    pub fn set_overlay_offset(&mut self, index: usize, offset: (f64, f64)) -> bool {
        self.overlays
            .get_mut(index)
            .map(|o| o.offset = offset)
            .is_some()
    }

    /// Overlays in paint order, bottom first
    pub fn overlays(&self) -> &[PlacedOverlay] {
        &self.overlays
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.overlays.is_empty()
    }

    /// Entries whose image path does not exist on disk
    pub fn missing_assets(&self) -> Vec<MissingAsset> {
        let mut tiles: Vec<&PlacedTile> =
            self.tiles.values().filter(|t| !resolves(&t.path)).collect();
        tiles.sort_by_key(|t| t.coord);

        let mut missing: Vec<MissingAsset> = tiles
            .into_iter()
            .map(|t| MissingAsset::Tile {
                coord: t.coord,
                path: t.path.clone(),
            })
            .collect();
        missing.extend(
            self.overlays
                .iter()
                .enumerate()
                .filter(|(_, o)| !resolves(&o.path))
                .map(|(index, o)| MissingAsset::Overlay {
                    index,
                    path: o.path.clone(),
                }),
        );
        missing
    }
}

fn resolves(path: &Path) -> bool {
    path.is_file()
}

pub fn normalize_rotation_step(step: i64) -> u8 {
    step.rem_euclid(ROTATIONS as i64) as u8
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Clamp to the scale range, rounded to two decimals
pub fn clamp_scale(scale: f64) -> f64 {
    let clamped = scale.clamp(MIN_OVERLAY_SCALE, MAX_OVERLAY_SCALE);
    (clamped * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_tile_overwrites() {
        let mut map = HexMap::new();
        let coord = HexCoord::new(3, -2);
        map.place_tile(coord, "a.png", "Forest", 0);
        map.place_tile(coord, "b.png", "Desert", 8);

        assert_eq!(map.tile_count(), 1);
        let tile = map.tile(coord).unwrap();
        assert_eq!(tile.path, PathBuf::from("b.png"));
        assert_eq!(tile.category, "Desert");
        assert_eq!(tile.rotation, 2);
    }

    #[test]
    fn test_remove_tile() {
        let mut map = HexMap::new();
        map.place_tile(HexCoord::new(0, 0), "a.png", "", 0);
        assert!(map.remove_tile(HexCoord::new(1, 1)).is_none());
        assert!(map.remove_tile(HexCoord::new(0, 0)).is_some());
        assert!(map.is_empty());
    }

    #[test]
    fn test_rotation_step_wraps() {
        let mut map = HexMap::new();
        let coord = HexCoord::new(0, 0);
        map.place_tile(coord, "a.png", "", -1);
        assert_eq!(map.tile(coord).unwrap().rotation, 5);
        assert!(map.set_tile_rotation(coord, 13));
        assert_eq!(map.tile(coord).unwrap().rotation, 1);
        assert!(!map.set_tile_rotation(HexCoord::new(9, 9), 1));
    }

    #[test]
    fn test_overlay_scale_saturates() {
        let mut map = HexMap::new();
        let index = map.place_overlay(HexCoord::new(0, 0), "o.png");
        assert_eq!(map.overlay(index).unwrap().scale, DEFAULT_OVERLAY_SCALE);

        for _ in 0..20 {
            map.scale_overlay(index, -0.1);
        }
        assert_eq!(map.overlay(index).unwrap().scale, MIN_OVERLAY_SCALE);

        for _ in 0..80 {
            map.scale_overlay(index, 0.1);
        }
        assert_eq!(map.overlay(index).unwrap().scale, MAX_OVERLAY_SCALE);
    }

    #[test]
    fn test_overlay_rotation_wraps() {
        let mut map = HexMap::new();
        let index = map.place_overlay(HexCoord::new(0, 0), "o.png");
        for _ in 0..24 {
            map.rotate_overlay(index, 15.0);
        }
        assert_eq!(map.overlay(index).unwrap().rotation, 0.0);

        map.rotate_overlay(index, -15.0);
        assert_eq!(map.overlay(index).unwrap().rotation, 345.0);
    }

    #[test]
    fn test_remove_overlay_shifts_indices() {
        let mut map = HexMap::new();
        map.place_overlay(HexCoord::new(0, 0), "a.png");
        map.place_overlay(HexCoord::new(1, 0), "b.png");
        map.place_overlay(HexCoord::new(2, 0), "c.png");

        assert_eq!(map.remove_overlay(1).unwrap().path, PathBuf::from("b.png"));
        assert_eq!(map.overlay(1).unwrap().path, PathBuf::from("c.png"));
        assert!(map.remove_overlay(5).is_none());
        assert_eq!(map.overlay_count(), 2);
    }

    #[test]
    fn test_push_overlay_normalizes() {
        let mut map = HexMap::new();
        let mut overlay = PlacedOverlay::new(HexCoord::new(0, 0), "a.png");
        overlay.rotation = -90.0;
        overlay.scale = 12.0;
        let index = map.push_overlay(overlay);
        let stored = map.overlay(index).unwrap();
        assert_eq!(stored.rotation, 270.0);
        assert_eq!(stored.scale, MAX_OVERLAY_SCALE);
    }

    #[test]
    fn test_missing_assets() {
        let mut map = HexMap::new();
        map.place_tile(HexCoord::new(1, 1), "/nonexistent/hexmap/t.png", "", 0);
        map.place_overlay(HexCoord::new(0, 0), "/nonexistent/hexmap/o.png");

        let missing = map.missing_assets();
        assert_eq!(missing.len(), 2);
        assert!(matches!(missing[0], MissingAsset::Tile { .. }));
        assert!(matches!(missing[1], MissingAsset::Overlay { index: 0, .. }));
    }
}
