//! Hex map editor: lay out tile artwork on a hex grid and scatter overlays on top

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod map;
pub mod state;

use winit::event_loop::EventLoop;

use app::App;
use config::EditorConfig;

/// Open the editor window and block until it closes
pub fn run(settings: EditorConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;
    Ok(())
}
