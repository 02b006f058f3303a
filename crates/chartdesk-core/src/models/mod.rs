//! Domain models for the chartdesk system.

mod patient;
mod record;
mod visit;

pub use patient::*;
pub use record::*;
pub use visit::*;
