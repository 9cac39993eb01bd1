//! egui panels and the map canvas

use std::collections::HashMap;

use egui::load::SizedTexture;
use egui::{
    pos2, vec2, Align2, CentralPanel, Color32, ColorImage, Context, FontId, Pos2, Rect, RichText,
    ScrollArea, Sense, Shape, SidePanel, TextureHandle, TextureId, TextureOptions, TopBottomPanel,
};
use image::RgbaImage;

use crate::editor::{Action, Editor, InputEvent, Key, Mode, PointerButton};
use crate::map::cache::{ImageCache, RenderKey};
use crate::map::library::AssetKind;
use crate::map::renderer::{self, Color, DrawCommand, Scene};

const BACKGROUND: Color32 = Color32::from_rgb(0x14, 0x16, 0x1e);
const ACCENT: Color32 = Color32::from_rgb(0x64, 0xa0, 0xff);
const TEXT_DIM: Color32 = Color32::from_rgb(0x78, 0x7d, 0x91);

const SIDEBAR_WIDTH: f32 = 330.0;
const LABEL_FONT_SIZE: f32 = 9.0;
const THUMBNAIL_NAME_LEN: usize = 13;

const BUTTONS: [(egui::PointerButton, PointerButton); 3] = [
    (egui::PointerButton::Primary, PointerButton::Primary),
    (egui::PointerButton::Secondary, PointerButton::Secondary),
    (egui::PointerButton::Middle, PointerButton::Middle),
];

const KEYS: [(egui::Key, Key); 15] = [
    (egui::Key::Escape, Key::Escape),
    (egui::Key::ArrowLeft, Key::Left),
    (egui::Key::ArrowRight, Key::Right),
    (egui::Key::Delete, Key::Delete),
    (egui::Key::Backspace, Key::Backspace),
    (egui::Key::R, Key::Char('r')),
    (egui::Key::OpenBracket, Key::Char('[')),
    (egui::Key::CloseBracket, Key::Char(']')),
    (egui::Key::Equals, Key::Char('=')),
    (egui::Key::Plus, Key::Char('+')),
    (egui::Key::Minus, Key::Char('-')),
    (egui::Key::S, Key::Char('s')),
    (egui::Key::L, Key::Char('l')),
    (egui::Key::N, Key::Char('n')),
    (egui::Key::O, Key::Char('o')),
];

const SHORTCUTS: [(&str, &str); 11] = [
    ("R / → / ←", "Rotate tile"),
    ("[ / ]", "Rotate overlay ±15°"),
    ("- / +", "Scale overlay smaller/larger"),
    ("Del / ⌫", "Remove tile or overlay"),
    ("Scroll", "Zoom"),
    ("Right-drag", "Pan"),
    ("ESC", "Deselect / View mode"),
    ("Ctrl+S", "Save"),
    ("Ctrl+L", "Load"),
    ("Ctrl+N", "New map"),
    ("Ctrl+O", "Open folder"),
];

/// GPU textures for cached renders, keyed like the image cache
#[derive(Default)]
pub struct TextureStore {
    textures: HashMap<RenderKey, TextureHandle>,
}

impl TextureStore {
    pub fn texture(&mut self, ctx: &Context, key: &RenderKey, image: &RgbaImage) -> TextureId {
        self.textures
            .entry(key.clone())
            .or_insert_with(|| {
                let size = [image.width() as usize, image.height() as usize];
                let pixels = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                ctx.load_texture(format!("{:?}", key), pixels, TextureOptions::LINEAR)
            })
            .id()
    }
}

/// Pointer position already reported to the editor
#[derive(Default)]
pub struct CanvasInput {
    last_pointer: Option<Pos2>,
}

/// One frame of UI. Widgets only read the editor and queue events.
pub struct EditorUi<'a> {
    pub editor: &'a Editor,
    pub cache: &'a mut ImageCache,
    pub textures: &'a mut TextureStore,
    pub canvas: &'a mut CanvasInput,
    pub thumbnail_size: u32,
    pub events: Vec<InputEvent>,
}

impl EditorUi<'_> {
    pub fn show(&mut self, ctx: &Context) {
        self.shortcuts(ctx);

        TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.editor.status());
        });
        SidePanel::right("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| match self.editor.mode() {
                    Mode::View => self.view_sidebar(ui),
                    Mode::PlaceTile => self.tile_sidebar(ui),
                    Mode::PlaceOverlay => self.overlay_sidebar(ui),
                });
            });
        CentralPanel::default()
            .frame(egui::Frame::NONE.fill(BACKGROUND))
            .show(ctx, |ui| self.map_canvas(ui));
    }

    fn action(&mut self, action: Action) {
        self.events.push(InputEvent::Action(action));
    }

    fn shortcuts(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed: Vec<InputEvent> = ctx.input(|i| {
            let ctrl = i.modifiers.command;
            KEYS.iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, key)| InputEvent::Key { key: *key, ctrl })
                .collect()
        });
        self.events.extend(pressed);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("📂 Open Folder").clicked() {
                self.action(Action::OpenFolder);
            }
            if ui.button("New").clicked() {
                self.action(Action::NewMap);
            }
            if ui.button("Save").clicked() {
                self.action(Action::SaveMap);
            }
            if ui.button("Load").clicked() {
                self.action(Action::LoadMap);
            }
            ui.separator();

            for (mode, label) in [
                (Mode::View, "View"),
                (Mode::PlaceTile, "Place Tile"),
                (Mode::PlaceOverlay, "Place Overlay"),
            ] {
                if ui
                    .selectable_label(self.editor.mode() == mode, label)
                    .clicked()
                {
                    self.action(Action::SetMode(mode));
                }
            }

            if let Some(path) = self.editor.map_path() {
                ui.separator();
                ui.label(RichText::new(path.display().to_string()).color(TEXT_DIM));
            }
        });
    }

    fn heading(ui: &mut egui::Ui, text: &str) {
        ui.add_space(6.0);
        ui.label(RichText::new(text).strong());
    }

    fn view_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("MAP INFO").color(ACCENT).size(13.0).strong());
        let stats = self.editor.stats();
        egui::Grid::new("map_info").show(ui, |ui| {
            for (label, value) in [
                ("Tiles placed:", stats.tiles),
                ("Overlays placed:", stats.overlays),
                ("Tile sets loaded:", stats.tile_sets),
                ("Overlay sets:", stats.overlay_sets),
                ("Overlay images:", stats.overlay_images),
            ] {
                ui.label(RichText::new(label).color(TEXT_DIM));
                ui.label(RichText::new(value.to_string()).strong());
                ui.end_row();
            }
        });

        ui.separator();
        ui.label(RichText::new("KEYBOARD SHORTCUTS").color(ACCENT).strong());
        egui::Grid::new("shortcuts").show(ui, |ui| {
            for (keys, description) in SHORTCUTS {
                ui.label(RichText::new(keys).color(ACCENT).strong());
                ui.label(description);
                ui.end_row();
            }
        });

        if let Some(coord) = self.editor.selected_hex() {
            ui.separator();
            ui.label(
                RichText::new(format!("Selected hex: ({}, {})", coord.col, coord.row))
                    .color(ACCENT)
                    .strong(),
            );
            if let Some(tile) = self.editor.map().tile(coord) {
                let stem = tile
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.label(stem);
                ui.label(format!("Category: {}", tile.category));
                ui.label(format!("Rotation: {}°", tile.rotation as u32 * 60));
            }
        }
    }

    fn tile_sidebar(&mut self, ui: &mut egui::Ui) {
        Self::heading(ui, "TILE CATEGORY");
        self.category_tabs(ui, AssetKind::Tile);

        ui.separator();
        Self::heading(
            ui,
            &format!("ROTATION  ({}/6 × 60°)", self.editor.placement_rotation() + 1),
        );
        ui.horizontal(|ui| {
            if ui.button("◀  Rotate Left").clicked() {
                self.action(Action::RotatePlacement(-1));
            }
            if ui.button("Rotate Right  ▶").clicked() {
                self.action(Action::RotatePlacement(1));
            }
        });

        ui.separator();
        Self::heading(ui, "SELECT TILE: click a thumbnail, then click the map");
        self.thumbnail_grid(ui, AssetKind::Tile);

        let has_tile = self
            .editor
            .selected_hex()
            .is_some_and(|coord| self.editor.map().tile(coord).is_some());
        if has_tile {
            ui.separator();
            if ui.button("✖  Remove Tile at Selected Hex").clicked() {
                self.action(Action::DeleteSelection);
            }
        }
    }

    fn overlay_sidebar(&mut self, ui: &mut egui::Ui) {
        Self::heading(ui, "OVERLAY CATEGORY");
        if self.editor.library().overlay_set_count() == 0 {
            ui.label("No overlays found. Add PNGs to a folder with 'Overlays' in its name.");
            return;
        }
        self.category_tabs(ui, AssetKind::Overlay);

        ui.separator();
        Self::heading(ui, "SELECT OVERLAY: click a thumbnail, then click the map");
        self.thumbnail_grid(ui, AssetKind::Overlay);

        let Some(index) = self.editor.selected_overlay() else {
            return;
        };
        let Some(overlay) = self.editor.map().overlay(index) else {
            return;
        };

        ui.separator();
        Self::heading(
            ui,
            &format!(
                "SELECTED OVERLAY: rotation {}°  •  scale {:.2}×",
                overlay.rotation, overlay.scale
            ),
        );
        ui.horizontal(|ui| {
            if ui.button("↺ -15°").clicked() {
                self.action(Action::RotateOverlay(-15.0));
            }
            if ui.button("↻ +15°").clicked() {
                self.action(Action::RotateOverlay(15.0));
            }
        });
        ui.horizontal(|ui| {
            if ui.button("-  Smaller").clicked() {
                self.action(Action::ScaleOverlay(-0.1));
            }
            if ui.button("+  Larger").clicked() {
                self.action(Action::ScaleOverlay(0.1));
            }
        });
        if ui.button("✖  Delete This Overlay").clicked() {
            self.action(Action::DeleteOverlay(index));
        }
        ui.label(RichText::new("Keyboard: [ ] rotate  •  - + scale  •  Del remove").color(TEXT_DIM));
    }

    fn category_tabs(&mut self, ui: &mut egui::Ui, kind: AssetKind) {
        let current = self.editor.choice(kind).category.clone();
        let names: Vec<String> = self
            .editor
            .library()
            .category_names(kind)
            .into_iter()
            .map(str::to_string)
            .collect();

        ui.horizontal_wrapped(|ui| {
            for name in names {
                let selected = current.as_deref() == Some(name.as_str());
                if ui.selectable_label(selected, name.as_str()).clicked() && !selected {
                    self.action(Action::SelectCategory(kind, name));
                }
            }
        });
    }

    fn thumbnail_grid(&mut self, ui: &mut egui::Ui, kind: AssetKind) {
        let editor = self.editor;
        let choice = editor.choice(kind);
        let Some(category) = choice.category.as_deref() else {
            return;
        };
        let selected = choice.index;
        let edge = self.thumbnail_size as f32;

        ui.horizontal_wrapped(|ui| {
            for (index, asset) in editor.library().assets(kind, category).iter().enumerate() {
                ui.vertical(|ui| {
                    let key = RenderKey::thumbnail(&asset.path, self.thumbnail_size);
                    let clicked = match self.cache.get(&key) {
                        Ok(image) => {
                            let id = self.textures.texture(ui.ctx(), &key, &image);
                            let thumb =
                                egui::Image::from_texture(SizedTexture::new(id, vec2(edge, edge)));
                            let button =
                                egui::Button::image(thumb).selected(selected == Some(index));
                            ui.add(button).clicked()
                        }
                        Err(e) => {
                            log::debug!("No thumbnail: {}", e);
                            ui.add_sized([edge, edge], egui::Button::new("?")).clicked()
                        }
                    };
                    let name: String = asset.name.chars().take(THUMBNAIL_NAME_LEN).collect();
                    ui.label(RichText::new(name).size(LABEL_FONT_SIZE));
                    if clicked {
                        self.action(Action::SelectAsset(kind, index));
                    }
                });
            }
        });
    }

    fn map_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        self.canvas_input(ui, &response);

        let rect = response.rect;
        let scene = renderer::render_scene(
            self.editor,
            self.cache,
            rect.width() as f64,
            rect.height() as f64,
        );
        self.paint(ui.ctx(), &painter, rect.min, &scene);
    }

    fn canvas_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let origin = response.rect.min;
        let over = response.contains_pointer();
        let (latest, any_down, pressed, released, scroll) = ui.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.any_down(),
                BUTTONS.map(|(button, _)| i.pointer.button_pressed(button)),
                BUTTONS.map(|(button, _)| i.pointer.button_released(button)),
                i.raw_scroll_delta.y,
            )
        });
        let Some(pos) = latest else {
            return;
        };
        let x = (pos.x - origin.x) as f64;
        let y = (pos.y - origin.y) as f64;

        if (over || any_down) && self.canvas.last_pointer != Some(pos) {
            self.canvas.last_pointer = Some(pos);
            self.events.push(InputEvent::PointerMoved { x, y });
        }

        for (slot, (_, button)) in BUTTONS.iter().enumerate() {
            if over && pressed[slot] {
                self.events.push(InputEvent::PointerPressed {
                    button: *button,
                    x,
                    y,
                });
            }
            if released[slot] {
                self.events.push(InputEvent::PointerReleased {
                    button: *button,
                    x,
                    y,
                });
            }
        }

        if over && scroll != 0.0 {
            self.events.push(InputEvent::Scroll {
                delta: scroll as f64,
                x,
                y,
            });
        }
    }

    fn paint(&mut self, ctx: &Context, painter: &egui::Painter, origin: Pos2, scene: &Scene) {
        let at = |(x, y): (f64, f64)| pos2(origin.x + x as f32, origin.y + y as f32);
        let full_uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

        for command in &scene.commands {
            match command {
                DrawCommand::Image { key, image, center } => {
                    let id = self.textures.texture(ctx, key, image);
                    let size = vec2(image.width() as f32, image.height() as f32);
                    let rect = Rect::from_center_size(at(*center), size);
                    painter.image(id, rect, full_uv, Color32::WHITE);
                }
                DrawCommand::Polygon {
                    points,
                    fill,
                    stroke,
                } => {
                    let fill = fill.map(color32).unwrap_or(Color32::TRANSPARENT);
                    let stroke = stroke
                        .map(|s| egui::Stroke::new(s.width, color32(s.color)))
                        .unwrap_or(egui::Stroke::NONE);
                    painter.add(Shape::convex_polygon(
                        points.iter().map(|p| at(*p)).collect(),
                        fill,
                        stroke,
                    ));
                }
                DrawCommand::Label {
                    text,
                    position,
                    color,
                } => {
                    painter.text(
                        at(*position),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(LABEL_FONT_SIZE),
                        color32(*color),
                    );
                }
                DrawCommand::DashedRect {
                    min,
                    max,
                    stroke,
                    dash,
                } => {
                    let (a, b) = (at(*min), at(*max));
                    let outline = [a, pos2(b.x, a.y), b, pos2(a.x, b.y), a];
                    painter.extend(Shape::dashed_line(
                        &outline,
                        egui::Stroke::new(stroke.width, color32(stroke.color)),
                        dash.0,
                        dash.1,
                    ));
                }
            }
        }
    }
}

fn color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}
