//! Non-interactive command handlers.

pub mod run;
pub mod runtimes;
