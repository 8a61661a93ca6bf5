//! Request handlers, grouped by resource.

mod generate;
mod health;
mod personas;
mod sim;
mod workflows;

pub use generate::*;
pub use health::*;
pub use personas::*;
pub use sim::*;
pub use workflows::*;
