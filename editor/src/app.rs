use crate::config::EditorConfig;
use crate::state::State;
use std::sync::Arc;
use log::error;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

const WINDOW_TITLE: &str = "Hex Map Editor";
const WINDOW_SIZE: LogicalSize<f64> = LogicalSize::new(1400.0, 900.0);

pub struct App {
    settings: EditorConfig,
    state: Option<State>,
}

impl App {
    pub fn new(settings: EditorConfig) -> Self {
        Self {
            settings,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(State::new(window, &self.settings)) {
            Ok(mut state) => {
                let size = state.window.inner_size();
                state.resize(size.width, size.height);
                state.start(&self.settings);
                self.state = Some(state);
            }
            Err(e) => {
                error!("graphics setup: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(v) => v,
            None => return,
        };

        if state.handle_input(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                state.resize(width, height);
            }
            WindowEvent::RedrawRequested => {
                state.update();
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.config.width, state.config.height)
                    }
                    Err(e) => {
                        error!("render: {:?}", e);
                    }
                }
            },
            _ => {}
        }
    }
}
