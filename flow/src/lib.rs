pub mod config;
pub mod error;
pub mod exec;
pub mod flow;
pub mod io;
pub mod stage;

pub(crate) mod log;

pub use crate::log::Log;
