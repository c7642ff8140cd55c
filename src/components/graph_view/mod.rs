mod component;
pub mod export;
mod layout;
mod render;
mod session;
mod state;
pub mod style;

pub use component::GraphCanvas;
pub use layout::Layout;
pub use session::{RenderEngine, RenderSession, SessionId, SurfaceExtent};
pub use state::{PointerRelease, SceneState};
