//! Shared types for the clipstash clipboard history manager.

mod gate;
mod item;
mod system;
mod ws;

pub use gate::*;
pub use item::*;
pub use system::*;
pub use ws::*;
