//! `.hexmap` project file format (JSON)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::hex::HexCoord;
use super::{HexMap, PlacedOverlay, DEFAULT_OVERLAY_SCALE};
use crate::error::MapFileError;

/// File extension used by the save/load dialogs
pub const MAP_EXTENSION: &str = "hexmap";

/// Top-level document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub tiles: Vec<TileRecord>,
    #[serde(default)]
    pub overlays: Vec<OverlayRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub col: i32,
    pub row: i32,
    pub path: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rotation: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayRecord {
    pub col: i32,
    pub row: i32,
    pub path: String,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    DEFAULT_OVERLAY_SCALE
}

impl HexMap {
    /// Snapshot the map; tiles are sorted by coordinate for stable output
    pub fn to_document(&self) -> MapDocument {
        let mut tiles: Vec<_> = self.tiles().collect();
        tiles.sort_by_key(|t| t.coord);

        MapDocument {
            tiles: tiles
                .into_iter()
                .map(|t| TileRecord {
                    col: t.coord.col,
                    row: t.coord.row,
                    path: t.path.to_string_lossy().into_owned(),
                    category: t.category.clone(),
                    rotation: t.rotation as i64,
                })
                .collect(),
            overlays: self
                .overlays()
                .iter()
                .map(|o| OverlayRecord {
                    col: o.anchor.col,
                    row: o.anchor.row,
                    path: o.path.to_string_lossy().into_owned(),
                    offset_x: o.offset.0,
                    offset_y: o.offset.1,
                    rotation: o.rotation,
                    scale: o.scale,
                })
                .collect(),
        }
    }

    /// Build a map from a document, normalizing rotations and scale
    pub fn from_document(document: MapDocument) -> Self {
        let mut map = HexMap::new();
        for tile in document.tiles {
            map.place_tile(
                HexCoord::new(tile.col, tile.row),
                PathBuf::from(tile.path),
                &tile.category,
                tile.rotation,
            );
        }
        for overlay in document.overlays {
            map.push_overlay(PlacedOverlay {
                anchor: HexCoord::new(overlay.col, overlay.row),
                path: PathBuf::from(overlay.path),
                offset: (overlay.offset_x, overlay.offset_y),
                rotation: overlay.rotation,
                scale: overlay.scale,
            });
        }
        map
    }

    pub fn to_json(&self) -> Result<String, MapFileError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapFileError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| MapFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Saved {} tiles and {} overlays to {:?}",
            self.tile_count(),
            self.overlay_count(),
            path
        );
        Ok(())
    }

    /// Read a map file. Nothing is returned unless the whole file parses.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: MapDocument =
            serde_json::from_str(&text).map_err(|source| MapFileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let map = Self::from_document(document);
        log::info!(
            "Loaded {} tiles and {} overlays from {:?}",
            map.tile_count(),
            map.overlay_count(),
            path
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hexmap-file-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_save_load_reproduces_fields() {
        let mut map = HexMap::new();
        map.place_tile(HexCoord::new(2, -1), "/assets/forest/oak.png", "Forest", 3);
        let index = map.place_overlay(HexCoord::new(0, 0), "/assets/magic/rune.png");
        map.set_overlay_offset(index, (5.5, -3.2));
        map.rotate_overlay(index, 45.0);
        map.scale_overlay(index, 0.7);

        let path = temp_file("round_trip.hexmap");
        map.save(&path).unwrap();
        let loaded = HexMap::load(&path).unwrap();

        let tile = loaded.tile(HexCoord::new(2, -1)).unwrap();
        assert_eq!(tile.path, PathBuf::from("/assets/forest/oak.png"));
        assert_eq!(tile.category, "Forest");
        assert_eq!(tile.rotation, 3);

        let overlay = loaded.overlay(0).unwrap();
        assert_eq!(overlay.anchor, HexCoord::new(0, 0));
        assert_eq!(overlay.path, PathBuf::from("/assets/magic/rune.png"));
        assert_eq!(overlay.offset, (5.5, -3.2));
        assert_eq!(overlay.rotation, 45.0);
        assert_eq!(overlay.scale, 1.2);
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_rotation_step_survives_round_trip() {
        for step in -7..13 {
            let mut map = HexMap::new();
            map.place_tile(HexCoord::new(0, 0), "t.png", "", step);
            let json = map.to_json().unwrap();
            let document: MapDocument = serde_json::from_str(&json).unwrap();
            let loaded = HexMap::from_document(document);
            assert_eq!(
                loaded.tile(HexCoord::new(0, 0)).unwrap().rotation as i64,
                step.rem_euclid(6)
            );
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{
            "tiles": [{"col": 1, "row": 2, "path": "a.png"}],
            "overlays": [{"col": -1, "row": 0, "path": "b.png"}]
        }"#;
        let map = HexMap::from_document(serde_json::from_str(json).unwrap());

        let tile = map.tile(HexCoord::new(1, 2)).unwrap();
        assert_eq!(tile.category, "");
        assert_eq!(tile.rotation, 0);

        let overlay = map.overlay(0).unwrap();
        assert_eq!(overlay.offset, (0.0, 0.0));
        assert_eq!(overlay.rotation, 0.0);
        assert_eq!(overlay.scale, DEFAULT_OVERLAY_SCALE);
    }

    #[test]
    fn test_integer_offsets_and_missing_arrays() {
        let json = r#"{"overlays": [{"col": 0, "row": 0, "path": "b.png", "offset_x": 3, "offset_y": -4}]}"#;
        let map = HexMap::from_document(serde_json::from_str(json).unwrap());
        assert_eq!(map.tile_count(), 0);
        assert_eq!(map.overlay(0).unwrap().offset, (3.0, -4.0));

        let empty: MapDocument = serde_json::from_str("{}").unwrap();
        assert!(HexMap::from_document(empty).is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let path = temp_file("broken.hexmap");
        std::fs::write(&path, "{ \"tiles\": [ {\"col\": 1 ").unwrap();
        assert!(matches!(
            HexMap::load(&path),
            Err(MapFileError::Parse { .. })
        ));

        assert!(matches!(
            HexMap::load(temp_file("does_not_exist.hexmap")),
            Err(MapFileError::Io { .. })
        ));
    }

    #[test]
    fn test_document_field_names() {
        let mut map = HexMap::new();
        map.place_tile(HexCoord::new(0, 1), "t.png", "Forest", 2);
        map.place_overlay(HexCoord::new(0, 0), "o.png");
        let value: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();

        let tile = &value["tiles"][0];
        assert_eq!(tile["col"], 0);
        assert_eq!(tile["row"], 1);
        assert_eq!(tile["category"], "Forest");
        assert_eq!(tile["rotation"], 2);

        let overlay = &value["overlays"][0];
        assert_eq!(overlay["offset_x"], 0.0);
        assert_eq!(overlay["scale"], 0.5);
    }
}
