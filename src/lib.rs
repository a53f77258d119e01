// Library surface for the binary and the integration tests.
// The pure pipeline (tokenize -> orp -> render_model) has no terminal dependencies.
pub mod app;
pub mod app_dirs;
pub mod editor;
pub mod error;
pub mod input;
pub mod logging;
pub mod orp;
pub mod presenter;
pub mod progress;
pub mod render_model;
pub mod runtime;
pub mod state;
pub mod store;
pub mod timer;
pub mod tokenize;
pub mod ui;

pub use error::{Error, Result};
pub use orp::compute_orp_index;
pub use render_model::{build_render_model, build_render_models, RenderModel};
pub use tokenize::tokenize;
