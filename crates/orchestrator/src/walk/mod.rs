#![forbid(unsafe_code)]

mod metadata;
mod walker;

pub use metadata::read_entry;
pub use walker::Walker;
