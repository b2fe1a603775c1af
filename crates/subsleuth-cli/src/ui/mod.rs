//! TUI rendering components.

mod render;

pub use render::{draw, table_viewport_height};
