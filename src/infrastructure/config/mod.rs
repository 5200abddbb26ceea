//! Infrastructure configuration modules.

pub mod logging;
pub mod scanner;
pub mod settings;
pub mod telegram;
