//! Scene host: the application object, its plugin registry and text nodes.
//!
//! # Invariants
//! - Plugins run only when explicitly registered with [`Extensions::add`].
//! - Plugins initialize in registration order and tear down in reverse.
//! - Renderers read the stage; they never mutate nodes.

mod app;
mod renderer;
mod stage;
mod text;

pub use app::{
    Application, ApplicationOptions, ApplicationPlugin, Extensions, PluginError, SceneError,
};
pub use renderer::{DebugTextRenderer, Renderer};
pub use stage::Stage;
pub use text::{Text, TextStyle};

pub fn crate_info() -> &'static str {
    "stagetext-scene v0.1.0"
}
