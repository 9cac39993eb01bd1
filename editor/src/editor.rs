//! Editor state machine: modes, selection, and input dispatch
//!
//! The editor owns the map, camera, and asset library. Toolkit code turns
//! its native input into [`InputEvent`]s and feeds them to
//! [`Editor::handle`]; anything that needs a dialog comes back as a
//! [`Command`] in the [`Response`].

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{AssetLoadError, MapFileError};
use crate::map::camera::Camera;
use crate::map::hex::HexCoord;
use crate::map::library::{AssetInfo, AssetKind, AssetLibrary};
use crate::map::{HexMap, MissingAsset, ROTATIONS};

/// Degrees per overlay rotate key press
pub const OVERLAY_ROTATION_STEP: f64 = 15.0;
/// Scale change per overlay scale key press
pub const OVERLAY_SCALE_STEP: f64 = 0.1;
/// Overlay hit box half-width as a multiple of `hex_size * scale`
const OVERLAY_HIT_FACTOR: f64 = 1.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    View,
    PlaceTile,
    PlaceOverlay,
}

impl Mode {
    pub fn hint(&self) -> &'static str {
        match self {
            Mode::View => "View  •  Right-click drag to pan  •  Scroll to zoom",
            Mode::PlaceTile => {
                "Place Tile  •  Pick a tile  •  Click hex to place  •  R / ← → to rotate  •  ESC to cancel"
            }
            Mode::PlaceOverlay => {
                "Place Overlay  •  Pick an overlay  •  Click hex to place  •  Drag to move  •  [ ] rotate  •  -/+ scale  •  ESC to cancel"
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Left,
    Right,
    Delete,
    Backspace,
    Char(char),
}

/// Toolbar and sidebar actions
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetMode(Mode),
    SelectCategory(AssetKind, String),
    SelectAsset(AssetKind, usize),
    RotatePlacement(i32),
    RotateOverlay(f64),
    ScaleOverlay(f64),
    DeleteSelection,
    DeleteOverlay(usize),
    OpenFolder,
    NewMap,
    SaveMap,
    LoadMap,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f64, y: f64 },
    PointerPressed { button: PointerButton, x: f64, y: f64 },
    PointerReleased { button: PointerButton, x: f64, y: f64 },
    /// Positive delta zooms in
    Scroll { delta: f64, x: f64, y: f64 },
    Key { key: Key, ctrl: bool },
    Action(Action),
}

/// Work the shell has to do with a dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    PickAssetFolder,
    ConfirmNewMap,
    /// Save to the remembered path, or ask for one when `None`
    SaveMap(Option<PathBuf>),
    PickMapToLoad,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    pub redraw: bool,
    pub command: Option<Command>,
}

impl Response {
    fn redraw() -> Self {
        Self {
            redraw: true,
            command: None,
        }
    }

    fn command(command: Command) -> Self {
        Self {
            redraw: false,
            command: Some(command),
        }
    }
}

/// Chosen catalog category and entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSelection {
    pub category: Option<String>,
    pub index: Option<usize>,
}

/// Counts shown in the map info panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapStats {
    pub tiles: usize,
    pub overlays: usize,
    pub tile_sets: usize,
    pub overlay_sets: usize,
    pub overlay_images: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OverlayDrag {
    index: usize,
    /// Pointer position relative to the overlay center when grabbed
    grab: (f64, f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PanGesture {
    start_pointer: (f64, f64),
    start_offset: (f64, f64),
}

pub struct Editor {
    mode: Mode,
    map: HexMap,
    map_path: Option<PathBuf>,
    camera: Camera,
    library: AssetLibrary,
    tile_choice: CatalogSelection,
    overlay_choice: CatalogSelection,
    placement_rotation: u8,
    hovered_hex: Option<HexCoord>,
    selected_hex: Option<HexCoord>,
    selected_overlay: Option<usize>,
    drag: Option<OverlayDrag>,
    pan: Option<PanGesture>,
    status: String,
}

impl Editor {
    pub fn new(camera: Camera) -> Self {
        Self {
            mode: Mode::View,
            map: HexMap::new(),
            map_path: None,
            camera,
            library: AssetLibrary::default(),
            tile_choice: CatalogSelection::default(),
            overlay_choice: CatalogSelection::default(),
            placement_rotation: 0,
            hovered_hex: None,
            selected_hex: None,
            selected_overlay: None,
            drag: None,
            pan: None,
            status: "Open your asset folder to begin".to_string(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn map(&self) -> &HexMap {
        &self.map
    }

    pub fn map_path(&self) -> Option<&Path> {
        self.map_path.as_deref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    pub fn choice(&self, kind: AssetKind) -> &CatalogSelection {
        match kind {
            AssetKind::Tile => &self.tile_choice,
            AssetKind::Overlay => &self.overlay_choice,
        }
    }

    /// Catalog entry that a click would place
    pub fn chosen_asset(&self, kind: AssetKind) -> Option<&AssetInfo> {
        let choice = self.choice(kind);
        let category = choice.category.as_deref()?;
        self.library.asset(kind, category, choice.index?)
    }

    pub fn placement_rotation(&self) -> u8 {
        self.placement_rotation
    }

    pub fn hovered_hex(&self) -> Option<HexCoord> {
        self.hovered_hex
    }

    pub fn selected_hex(&self) -> Option<HexCoord> {
        self.selected_hex
    }

    pub fn selected_overlay(&self) -> Option<usize> {
        self.selected_overlay
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn stats(&self) -> MapStats {
        MapStats {
            tiles: self.map.tile_count(),
            overlays: self.map.overlay_count(),
            tile_sets: self.library.tile_set_count(),
            overlay_sets: self.library.overlay_set_count(),
            overlay_images: self.library.overlay_image_count(),
        }
    }

    /// Dispatch one input event
    pub fn handle(&mut self, event: InputEvent) -> Response {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            InputEvent::PointerPressed {
                button: PointerButton::Primary,
                x,
                y,
            } => self.primary_pressed(x, y),
            InputEvent::PointerPressed { x, y, .. } => {
                self.pan = Some(PanGesture {
                    start_pointer: (x, y),
                    start_offset: self.camera.offset,
                });
                Response::default()
            }
            InputEvent::PointerReleased {
                button: PointerButton::Primary,
                ..
            } => {
                self.drag = None;
                Response::default()
            }
            InputEvent::PointerReleased { .. } => {
                self.pan = None;
                Response::default()
            }
            InputEvent::Scroll { delta, x, y } => {
                if delta == 0.0 {
                    return Response::default();
                }
                let direction = if delta > 0.0 { 1 } else { -1 };
                self.camera.zoom_at(direction, x, y);
                Response::redraw()
            }
            InputEvent::Key { key, ctrl } => self.key_pressed(key, ctrl),
            InputEvent::Action(action) => self.apply(action),
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) -> Response {
        let hovered = Some(self.camera.screen_to_hex(x, y));
        let mut redraw = hovered != self.hovered_hex;
        self.hovered_hex = hovered;

        if let Some(drag) = self.drag {
            if let Some(overlay) = self.map.overlay(drag.index) {
                let (ax, ay) = self.camera.hex_to_screen(overlay.anchor);
                let offset = (x - ax - drag.grab.0, y - ay - drag.grab.1);
                self.map.set_overlay_offset(drag.index, offset);
                redraw = true;
            }
        }

        if let Some(pan) = self.pan {
            self.camera.set_offset(
                pan.start_offset.0 + x - pan.start_pointer.0,
                pan.start_offset.1 + y - pan.start_pointer.1,
            );
            redraw = true;
        }

        Response {
            redraw,
            command: None,
        }
    }

    fn primary_pressed(&mut self, x: f64, y: f64) -> Response {
        let coord = self.camera.screen_to_hex(x, y);

        if self.mode == Mode::PlaceOverlay {
            if let Some(hit) = self.overlay_at(x, y) {
                if let Some(overlay) = self.map.overlay(hit) {
                    let (ax, ay) = self.camera.hex_to_screen(overlay.anchor);
                    self.drag = Some(OverlayDrag {
                        index: hit,
                        grab: (x - ax - overlay.offset.0, y - ay - overlay.offset.1),
                    });
                }
                self.selected_overlay = Some(hit);
                return Response::redraw();
            }

            if let Some(asset) = self.chosen_asset(AssetKind::Overlay).cloned() {
                let index = self.map.place_overlay(coord, asset.path);
                self.selected_overlay = Some(index);
                self.status = format!(
                    "Placed '{}'  •  Drag to move  •  [ ] rotate  •  -/+ scale  •  Del to remove",
                    asset.name
                );
            }
            return Response::redraw();
        }

        self.selected_hex = Some(coord);
        if self.mode == Mode::PlaceTile {
            if let Some(asset) = self.chosen_asset(AssetKind::Tile).cloned() {
                self.map.place_tile(
                    coord,
                    asset.path,
                    &asset.category,
                    self.placement_rotation as i64,
                );
                self.status = format!(
                    "Placed '{}' at ({})  •  R / ← → to rotate",
                    asset.name, coord
                );
            }
        }
        Response::redraw()
    }

    /// Topmost overlay whose hit box contains the screen point
    pub fn overlay_at(&self, x: f64, y: f64) -> Option<usize> {
        let size = self.camera.hex_size();
        self.map
            .overlays()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, overlay)| {
                let (ax, ay) = self.camera.hex_to_screen(overlay.anchor);
                let cx = ax + overlay.offset.0;
                let cy = ay + overlay.offset.1;
                let half = (size * overlay.scale * OVERLAY_HIT_FACTOR).trunc();
                (x - cx).abs() <= half && (y - cy).abs() <= half
            })
            .map(|(index, _)| index)
    }

    fn key_pressed(&mut self, key: Key, ctrl: bool) -> Response {
        if ctrl {
            return match key {
                Key::Char('s' | 'S') => self.apply(Action::SaveMap),
                Key::Char('l' | 'L') => self.apply(Action::LoadMap),
                Key::Char('n' | 'N') => self.apply(Action::NewMap),
                Key::Char('o' | 'O') => self.apply(Action::OpenFolder),
                _ => Response::default(),
            };
        }

        match key {
            Key::Escape => self.escape(),
            Key::Right | Key::Char('r' | 'R') => self.rotate_placement(1),
            Key::Left => self.rotate_placement(-1),
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::Char(']') => self.rotate_selected_overlay(OVERLAY_ROTATION_STEP),
            Key::Char('[') => self.rotate_selected_overlay(-OVERLAY_ROTATION_STEP),
            Key::Char('=' | '+') => self.scale_selected_overlay(OVERLAY_SCALE_STEP),
            Key::Char('-') => self.scale_selected_overlay(-OVERLAY_SCALE_STEP),
            Key::Char(_) => Response::default(),
        }
    }

    fn apply(&mut self, action: Action) -> Response {
        match action {
            Action::SetMode(mode) => self.set_mode(mode),
            Action::SelectCategory(kind, category) => {
                let choice = self.choice_mut(kind);
                choice.category = Some(category);
                choice.index = None;
                Response::redraw()
            }
            Action::SelectAsset(kind, index) => self.select_asset(kind, index),
            Action::RotatePlacement(delta) => self.rotate_placement(delta),
            Action::RotateOverlay(delta) => self.rotate_selected_overlay(delta),
            Action::ScaleOverlay(delta) => self.scale_selected_overlay(delta),
            Action::DeleteSelection => self.delete_selection(),
            Action::DeleteOverlay(index) => self.delete_overlay(index),
            Action::OpenFolder => Response::command(Command::PickAssetFolder),
            Action::NewMap => Response::command(Command::ConfirmNewMap),
            Action::SaveMap => Response::command(Command::SaveMap(self.map_path.clone())),
            Action::LoadMap => Response::command(Command::PickMapToLoad),
        }
    }

    fn choice_mut(&mut self, kind: AssetKind) -> &mut CatalogSelection {
        match kind {
            AssetKind::Tile => &mut self.tile_choice,
            AssetKind::Overlay => &mut self.overlay_choice,
        }
    }

    /// Switch mode; selection never carries across modes
    pub fn set_mode(&mut self, mode: Mode) -> Response {
        debug!("Mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.selected_hex = None;
        self.selected_overlay = None;
        self.drag = None;
        self.status = mode.hint().to_string();
        Response::redraw()
    }

    fn escape(&mut self) -> Response {
        if self.selected_overlay.take().is_some() {
            self.drag = None;
            Response::redraw()
        } else {
            self.set_mode(Mode::View)
        }
    }

    fn select_asset(&mut self, kind: AssetKind, index: usize) -> Response {
        let choice = self.choice(kind);
        let Some(category) = choice.category.as_deref() else {
            return Response::default();
        };
        let Some(asset) = self.library.asset(kind, category, index) else {
            return Response::default();
        };

        let status = format!("Selected '{}'  •  Click a hex to place it", asset.name);
        self.choice_mut(kind).index = Some(index);
        self.status = status;
        Response::redraw()
    }

    fn rotate_placement(&mut self, delta: i32) -> Response {
        if self.mode != Mode::PlaceTile {
            return Response::default();
        }
        self.placement_rotation =
            (self.placement_rotation as i32 + delta).rem_euclid(ROTATIONS as i32) as u8;
        if let Some(coord) = self.selected_hex {
            self.map
                .set_tile_rotation(coord, self.placement_rotation as i64);
        }
        Response::redraw()
    }

    fn rotate_selected_overlay(&mut self, delta: f64) -> Response {
        match self.selected_overlay {
            Some(index) if self.map.rotate_overlay(index, delta) => Response::redraw(),
            _ => Response::default(),
        }
    }

    fn scale_selected_overlay(&mut self, delta: f64) -> Response {
        match self.selected_overlay {
            Some(index) if self.map.scale_overlay(index, delta) => Response::redraw(),
            _ => Response::default(),
        }
    }

    fn delete_selection(&mut self) -> Response {
        if self.mode == Mode::PlaceOverlay {
            if let Some(index) = self.selected_overlay {
                return self.delete_overlay(index);
            }
        }

        if let Some(coord) = self.selected_hex {
            if self.map.remove_tile(coord).is_some() {
                self.status = "Tile removed".to_string();
                return Response::redraw();
            }
        }
        Response::default()
    }

    /// Remove an overlay; any held overlay index is stale afterwards
    fn delete_overlay(&mut self, index: usize) -> Response {
        if self.map.remove_overlay(index).is_none() {
            return Response::default();
        }
        self.selected_overlay = None;
        self.drag = None;
        self.status = "Overlay removed".to_string();
        Response::redraw()
    }

    /// Replace the asset library. On failure the current one is kept.
    pub fn load_library(&mut self, root: impl AsRef<Path>) -> Result<(), AssetLoadError> {
        let library = match AssetLibrary::load(root) {
            Ok(library) => library,
            Err(e) => {
                warn!("{}", e);
                self.status = "No tiles or overlays found".to_string();
                return Err(e);
            }
        };
        self.set_library(library);
        Ok(())
    }

    pub fn set_library(&mut self, library: AssetLibrary) {
        self.tile_choice = CatalogSelection {
            category: library.category_names(AssetKind::Tile).first().map(|s| s.to_string()),
            index: None,
        };
        self.overlay_choice = CatalogSelection {
            category: library
                .category_names(AssetKind::Overlay)
                .first()
                .map(|s| s.to_string()),
            index: None,
        };
        self.status = format!(
            "Loaded  •  Tiles: {}   Overlays: {}   ({} overlay images total)",
            library.category_names(AssetKind::Tile).join(", "),
            library.category_names(AssetKind::Overlay).join(", "),
            library.overlay_image_count()
        );
        self.library = library;
    }

    /// Start over with an empty map
    pub fn new_map(&mut self) {
        self.map = HexMap::new();
        self.map_path = None;
        self.selected_hex = None;
        self.selected_overlay = None;
        self.drag = None;
        self.status = "New map created".to_string();
    }

    pub fn save_map(&mut self, path: impl AsRef<Path>) -> Result<(), MapFileError> {
        let path = path.as_ref();
        if let Err(e) = self.map.save(path) {
            self.status = format!("Save failed: {}", e);
            return Err(e);
        }
        self.map_path = Some(path.to_path_buf());
        self.status = format!("Saved: {}", path.display());
        Ok(())
    }

    /// Replace the map with a file's contents.
    ///
    /// The current map survives any read or parse failure. Entries whose
    /// images are missing still load; they are returned so the caller can
    /// report them.
    pub fn load_map(&mut self, path: impl AsRef<Path>) -> Result<Vec<MissingAsset>, MapFileError> {
        let path = path.as_ref();
        let map = match HexMap::load(path) {
            Ok(map) => map,
            Err(e) => {
                self.status = format!("Load failed: {}", e);
                return Err(e);
            }
        };

        let missing = map.missing_assets();
        for entry in &missing {
            warn!("Missing image for {:?}", entry);
        }

        self.map = map;
        self.map_path = Some(path.to_path_buf());
        self.selected_hex = None;
        self.selected_overlay = None;
        self.drag = None;
        self.status = if missing.is_empty() {
            format!("Loaded: {}", path.display())
        } else {
            format!(
                "Loaded: {}  •  {} entries reference missing images",
                path.display(),
                missing.len()
            )
        };
        Ok(missing)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}
