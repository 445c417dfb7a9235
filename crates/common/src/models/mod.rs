pub mod signal;

pub use signal::{Direction, ParsedSignal};
