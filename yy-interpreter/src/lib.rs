pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod macros;
pub mod object;
pub mod session;
mod yolo;

pub use session::{RunError, Session};
