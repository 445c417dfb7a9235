//! Turns free-form trading calls into normalized signals and renders them
//! in the fixed relay template.

pub mod parser;
pub mod patterns;
pub mod renderer;

pub use parser::{SignalParser, extract};
pub use renderer::render;
