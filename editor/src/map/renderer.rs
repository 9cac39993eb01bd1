//! Scene builder: turns editor state into toolkit-neutral draw commands

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use super::cache::{ImageCache, RenderKey};
use super::hex::{hex_corners, HexCoord};
use crate::editor::{Editor, Mode};
use crate::error::ImageRenderError;
use crate::map::library::AssetKind;

pub type Color = Rgba<u8>;

pub const GRID_COLOR: Color = Rgba([0x3c, 0x41, 0x50, 0xff]);
pub const GRID_HOVER: Color = Rgba([0x78, 0x82, 0xa0, 0xff]);
pub const GRID_SELECTED: Color = Rgba([0xdc, 0xb4, 0x3c, 0xff]);
pub const OVERLAY_SELECTED: Color = Rgba([0xff, 0x99, 0x32, 0xff]);
pub const EMPTY_FILL: Color = Rgba([0x28, 0x2c, 0x3a, 0xff]);
/// Half-transparent tint over the placement preview
pub const GHOST_FILL: Color = Rgba([0x64, 0x80, 0xff, 0x80]);

/// Coordinate labels are drawn only at this hex size or larger
pub const LABEL_MIN_HEX_SIZE: f64 = 50.0;

/// Gap between a selected overlay and its marquee
const SELECTION_MARGIN: f64 = 4.0;
const SELECTION_DASH: (f32, f32) = (6.0, 3.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// One primitive in paint order. Positions are screen pixels.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    /// Image centered on a point
    Image {
        key: RenderKey,
        image: Arc<RgbaImage>,
        center: (f64, f64),
    },
    Polygon {
        points: [(f64, f64); 6],
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Label {
        text: String,
        position: (f64, f64),
        color: Color,
    },
    DashedRect {
        min: (f64, f64),
        max: (f64, f64),
        stroke: Stroke,
        dash: (f32, f32),
    },
}

/// What a failed image belonged to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    Tile(HexCoord),
    Ghost(HexCoord),
    Overlay(usize),
}

#[derive(Debug)]
pub struct RenderFailure {
    pub target: RenderTarget,
    pub error: ImageRenderError,
}

#[derive(Debug, Default)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub failures: Vec<RenderFailure>,
}

impl Scene {
    fn image(
        &mut self,
        cache: &mut ImageCache,
        key: RenderKey,
        center: (f64, f64),
        target: RenderTarget,
    ) -> bool {
        match cache.get(&key) {
            Ok(image) => {
                self.commands.push(DrawCommand::Image { key, image, center });
                true
            }
            Err(error) => {
                log::debug!("Skipping {:?}: {}", target, error);
                self.failures.push(RenderFailure { target, error });
                false
            }
        }
    }
}

/// Build the frame for a `width` x `height` viewport.
///
/// Paint order is tiles, grid, placement preview, then overlays in list
/// order. An element whose image can't be produced is left out and listed
/// in [`Scene::failures`].
pub fn render_scene(editor: &Editor, cache: &mut ImageCache, width: f64, height: f64) -> Scene {
    let camera = editor.camera();
    let map = editor.map();
    let size = camera.hex_size();
    let cells = camera.visible_hexes(width, height);
    let mut scene = Scene::default();

    for &coord in &cells {
        if let Some(tile) = map.tile(coord) {
            let key = RenderKey::tile(&tile.path, size, tile.rotation);
            scene.image(cache, key, camera.hex_to_screen(coord), RenderTarget::Tile(coord));
        }
    }

    for &coord in &cells {
        let center = camera.hex_to_screen(coord);
        let stroke = if editor.selected_hex() == Some(coord) {
            Stroke::new(3.0, GRID_SELECTED)
        } else if editor.hovered_hex() == Some(coord) {
            Stroke::new(2.0, GRID_HOVER)
        } else {
            Stroke::new(1.0, GRID_COLOR)
        };
        let fill = match map.tile(coord) {
            Some(_) => None,
            None => Some(EMPTY_FILL),
        };

        scene.commands.push(DrawCommand::Polygon {
            points: hex_corners(center, size),
            fill,
            stroke: Some(stroke),
        });
        if size >= LABEL_MIN_HEX_SIZE {
            scene.commands.push(DrawCommand::Label {
                text: coord.to_string(),
                position: center,
                color: GRID_COLOR,
            });
        }
    }

    if editor.mode() == Mode::PlaceTile {
        let hovered = editor.hovered_hex();
        if let (Some(coord), Some(asset)) = (hovered, editor.chosen_asset(AssetKind::Tile)) {
            let center = camera.hex_to_screen(coord);
            let key = RenderKey::tile(&asset.path, size, editor.placement_rotation());
            if scene.image(cache, key, center, RenderTarget::Ghost(coord)) {
                scene.commands.push(DrawCommand::Polygon {
                    points: hex_corners(center, size),
                    fill: Some(GHOST_FILL),
                    stroke: None,
                });
            }
        }
    }

    for (index, overlay) in map.overlays().iter().enumerate() {
        let (ax, ay) = camera.hex_to_screen(overlay.anchor);
        let center = (ax + overlay.offset.0, ay + overlay.offset.1);
        let key = RenderKey::overlay(&overlay.path, size, overlay.scale, overlay.rotation);
        if !scene.image(cache, key.clone(), center, RenderTarget::Overlay(index)) {
            continue;
        }

        if editor.selected_overlay() == Some(index) {
            if let Some(image) = cache.peek(&key) {
                let hw = (image.width() / 2) as f64 + SELECTION_MARGIN;
                let hh = (image.height() / 2) as f64 + SELECTION_MARGIN;
                scene.commands.push(DrawCommand::DashedRect {
                    min: (center.0 - hw, center.1 - hh),
                    max: (center.0 + hw, center.1 + hh),
                    stroke: Stroke::new(2.0, OVERLAY_SELECTED),
                    dash: SELECTION_DASH,
                });
            }
        }
    }

    scene
}
