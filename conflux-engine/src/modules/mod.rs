//! Core modules for pipeline scripts
//!
//! Each module is generic over a small trait so the embedding process
//! decides where logs go and which variables a script can read.

pub mod env;
pub mod log;

pub use env::{EnvModule, VarProvider};
pub use log::{LogModule, LogSink};
