mod ui;

use std::path::Path;
use std::sync::Arc;

use egui::{Context, FullOutput};
use egui_wgpu::{Renderer, RendererOptions, ScreenDescriptor};
use log::{error, info, warn};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use wgpu::{Backends, ExperimentalFeatures, Features, Instance, InstanceDescriptor, MemoryHints, SurfaceError, Trace};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::config::EditorConfig;
use crate::editor::{Command, Editor};
use crate::map::cache::ImageCache;
use crate::map::file::MAP_EXTENSION;
use ui::{CanvasInput, EditorUi, TextureStore};

const MAP_FILTER_NAME: &str = "Hex Map";
const DEFAULT_MAP_NAME: &str = "map.hexmap";

// Window, GPU and editor state
pub struct State {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub is_surface_configured: bool,
    resize_request: Option<PhysicalSize<u32>>,
    ui_renderer: Renderer,
    egui_ctx: Context,
    egui_state: egui_winit::State,
    egui_output: Option<FullOutput>,
    editor: Editor,
    cache: ImageCache,
    textures: TextureStore,
    canvas: CanvasInput,
    thumbnail_size: u32,
}

impl State {
    pub async fn new(window: Arc<Window>, settings: &EditorConfig) -> anyhow::Result<Self> {
        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface: wgpu::Surface<'_> = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features: Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: ExperimentalFeatures::disabled(),
                memory_hints: MemoryHints::Performance,
                trace: Trace::Off,
            })
            .await?;

        let cap: wgpu::SurfaceCapabilities = surface.get_capabilities(&adapter);

        let texture_format = cap
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| cap.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: texture_format,
            width: window.inner_size().width,
            height: window.inner_size().height,
            present_mode: cap.present_modes[0],
            alpha_mode: cap.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let ui_renderer = Renderer::new(&device, texture_format, RendererOptions {
            msaa_samples: 0,
            depth_stencil_format: None,
            dithering: false,
            predictable_texture_filtering: false,
        });
        let egui_ctx = Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window.as_ref(),
            egui_ctx.native_pixels_per_point(),
            window.theme(),
            None,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            resize_request: None,
            ui_renderer,
            egui_ctx,
            egui_state,
            egui_output: None,
            editor: Editor::new(settings.camera()),
            cache: ImageCache::new(),
            textures: TextureStore::default(),
            canvas: CanvasInput::default(),
            thumbnail_size: settings.thumbnail_size,
        })
    }

    /// Load whatever the command line asked for, or ask for an asset folder
    pub fn start(&mut self, settings: &EditorConfig) {
        match &settings.asset_root {
            Some(root) => self.open_asset_folder(root),
            None => self.run_command(Command::PickAssetFolder),
        }
        if let Some(path) = &settings.map_path {
            self.open_map(path);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            if !self.is_surface_configured {
                self.apply_size(width, height);
                self.is_surface_configured = true;
            } else {
                self.resize_request = Some(PhysicalSize::new(width, height));
            }
        }
    }

    fn apply_size(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn handle_input(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(self.window.as_ref(), event);
        response.consumed
    }

    pub fn update(&mut self) {
        let input = self.egui_state.take_egui_input(self.window.as_ref());
        let ctx = self.egui_ctx.clone();

        let mut frame = EditorUi {
            editor: &self.editor,
            cache: &mut self.cache,
            textures: &mut self.textures,
            canvas: &mut self.canvas,
            thumbnail_size: self.thumbnail_size,
            events: Vec::new(),
        };
        let output = ctx.run(input, |ctx| frame.show(ctx));
        let events = frame.events;
        self.egui_output = Some(output);

        for event in events {
            let response = self.editor.handle(event);
            if let Some(command) = response.command {
                self.run_command(command);
            }
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::PickAssetFolder => {
                if let Some(folder) = FileDialog::new().set_title("Select Asset Folder").pick_folder() {
                    self.open_asset_folder(&folder);
                }
            }
            Command::ConfirmNewMap => {
                let answer = MessageDialog::new()
                    .set_level(MessageLevel::Warning)
                    .set_title("New Map")
                    .set_description("Discard the current map?")
                    .set_buttons(MessageButtons::YesNo)
                    .show();
                if answer == MessageDialogResult::Yes {
                    self.editor.new_map();
                }
            }
            Command::SaveMap(path) => {
                let path = path.or_else(|| {
                    FileDialog::new()
                        .add_filter(MAP_FILTER_NAME, &[MAP_EXTENSION])
                        .set_file_name(DEFAULT_MAP_NAME)
                        .save_file()
                });
                if let Some(path) = path {
                    if let Err(e) = self.editor.save_map(&path) {
                        error!("{}", e);
                        show_error("Save Failed", &e.to_string());
                    }
                }
            }
            Command::PickMapToLoad => {
                if let Some(path) = FileDialog::new()
                    .add_filter(MAP_FILTER_NAME, &[MAP_EXTENSION])
                    .pick_file()
                {
                    self.open_map(&path);
                }
            }
        }
    }

    fn open_asset_folder(&mut self, root: &Path) {
        if let Err(e) = self.editor.load_library(root) {
            show_warning(
                "No Assets Found",
                &format!("{}\n\nPick the folder that holds your tile and overlay sets.", e),
            );
        }
    }

    fn open_map(&mut self, path: &Path) {
        match self.editor.load_map(path) {
            Ok(missing) if !missing.is_empty() => {
                info!("{} map entries reference missing images", missing.len());
            }
            Ok(_) => {}
            Err(e) => {
                error!("{}", e);
                show_error("Load Failed", &e.to_string());
            }
        }
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        self.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        if let Some(PhysicalSize { width, height }) = self.resize_request.take() {
            self.apply_size(width, height)
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(_) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()?
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.078,
                            g: 0.086,
                            b: 0.118,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(output) = self.egui_output.take() {
                let FullOutput {
                    platform_output,
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    viewport_output
                } = output;

                for _ in viewport_output {
                    warn!("Viewport change is not handled!")
                }

                self.egui_state.handle_platform_output(self.window.as_ref(), platform_output);

                for (id, delta) in textures_delta.set {
                    self.ui_renderer.update_texture(&self.device, &self.queue, id, &delta);
                }
                let descriptor = ScreenDescriptor {
                    size_in_pixels: [self.config.width, self.config.height],
                    pixels_per_point,
                };
                let primitives = self.egui_ctx.tessellate(shapes, pixels_per_point);
                let mut render_pass = render_pass.forget_lifetime();

                self.ui_renderer.update_buffers(&self.device, &self.queue, &mut encoder, &primitives, &descriptor);
                self.ui_renderer.render(&mut render_pass, &primitives, &descriptor);

                for id in textures_delta.free {
                    self.ui_renderer.free_texture(&id)
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

fn show_error(title: &str, description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn show_warning(title: &str, description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}
