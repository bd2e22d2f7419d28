pub mod inspect;
pub mod render;
pub mod serve;

pub use inspect::inspect;
pub use render::{render, RenderFormat};
pub use serve::serve;
