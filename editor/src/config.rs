//! Command-line arguments and resolved editor settings

use std::path::PathBuf;

use clap::Parser;

use crate::map::camera::{Camera, DEFAULT_HEX_SIZE, MAX_HEX_SIZE, MIN_HEX_SIZE};

/// Edge of a sidebar thumbnail in pixels
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 72;

/// Initial screen position of hex (0, 0)
pub const DEFAULT_CAMERA_OFFSET: (f64, f64) = (550.0, 380.0);

/// Hex map editor for tile and overlay artwork
#[derive(Debug, Parser)]
#[command(name = "hexmap-editor", version)]
pub struct Args {
    /// Asset folder to load on start. Without it a folder picker opens.
    #[arg(short, long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Map file to open on start
    #[arg(short, long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Initial hex radius in pixels, clamped to the zoom range
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_HEX_SIZE)]
    pub hex_size: f64,

    /// Sidebar thumbnail edge in pixels
    #[arg(
        long,
        value_name = "PIXELS",
        default_value_t = DEFAULT_THUMBNAIL_SIZE,
        value_parser = clap::value_parser!(u32).range(16..=256)
    )]
    pub thumbnail_size: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    pub asset_root: Option<PathBuf>,
    pub map_path: Option<PathBuf>,
    pub hex_size: f64,
    pub thumbnail_size: u32,
    pub camera_offset: (f64, f64),
}

impl EditorConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.camera_offset, self.hex_size)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            asset_root: None,
            map_path: None,
            hex_size: DEFAULT_HEX_SIZE,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            camera_offset: DEFAULT_CAMERA_OFFSET,
        }
    }
}

impl From<Args> for EditorConfig {
    fn from(args: Args) -> Self {
        let hex_size = if args.hex_size.is_finite() {
            args.hex_size.clamp(MIN_HEX_SIZE, MAX_HEX_SIZE)
        } else {
            DEFAULT_HEX_SIZE
        };

        Self {
            asset_root: args.assets,
            map_path: args.map,
            hex_size,
            thumbnail_size: args.thumbnail_size,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from(Args::parse_from(["hexmap-editor"]));
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.camera(), Camera::default());
    }

    #[test]
    fn test_arguments() {
        let args = Args::parse_from([
            "hexmap-editor",
            "--assets",
            "/art/realm",
            "--map",
            "castle.hexmap",
            "--hex-size",
            "500",
            "--thumbnail-size",
            "96",
        ]);
        let config = EditorConfig::from(args);
        assert_eq!(config.asset_root, Some(PathBuf::from("/art/realm")));
        assert_eq!(config.map_path, Some(PathBuf::from("castle.hexmap")));
        assert_eq!(config.hex_size, MAX_HEX_SIZE);
        assert_eq!(config.thumbnail_size, 96);
    }

    #[test]
    fn test_thumbnail_size_range() {
        assert!(Args::try_parse_from(["hexmap-editor", "--thumbnail-size", "4"]).is_err());
    }
}
