//! `starfig`: a programmatic configuration generator. Users define typed
//! schemas in a restricted, deterministic Starlark dialect, then instantiate
//! them in separate files to produce validated config values.

pub mod cli;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod evaluator;
pub mod interp;
pub mod label;
pub mod loader;
pub mod logging;
pub mod printer;
pub mod result;
pub mod workspace;

pub use error::{StarfigError, StarfigResult};
