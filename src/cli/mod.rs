mod commands;
mod progress;

pub use commands::*;
