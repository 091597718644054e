//! Crate-wide error type.
//!
//! Mirrors the split pydantic-core makes between build-time and value-time
//! failures (`SchemaError` vs `ValError`), but collapsed into one enum since
//! this crate has no host language drawing its own exception hierarchy out of
//! ours. Every variant's `Display` is the exact user-facing message spec'd
//! for that failure; callers that need to branch (the evaluator's
//! specific/spread modes, `--keep-going` bookkeeping) match on the variant,
//! everyone else just prints it.

use thiserror::Error;

pub type StarfigResult<T> = Result<T, StarfigError>;

#[derive(Debug, Error)]
pub enum StarfigError {
    /// No `STARVERSE` file found walking up from the working directory.
    #[error("Unable to find a STARVERSE file in the working path.")]
    NoStarverse,

    /// A raw target/label string didn't match the label grammar.
    #[error("{0}")]
    InvalidLabel(String),

    /// `//pkg:target` parsed fine but no `STARFIG` exists for `pkg`.
    #[error("STARFIG file for {0} does not exist.")]
    MissingStarfig(String),

    /// `load()` was given a non-absolute module path.
    #[error("Load source {0} is invalid because it must be absolute.")]
    LoadNotAbsolute(String),

    /// `load()` was given a path that is neither a `.star` nor `STARFIG` file.
    #[error("Only .star and STARFIG files can be loaded, {0} is invalid.")]
    LoadDisallowedRole(String),

    /// A `.star` file had a `SchemaResult` among its top-level bindings.
    #[error("Schema types can only be instantiated in STARFIG files.")]
    SchemaInstantiatedInStarFile,

    /// A `STARFIG` file had a top-level binding that wasn't a `SchemaResult`.
    #[error("STARFIG file can only contain schema instances.")]
    NonResultInStarfig,

    /// The requested specific target isn't among the file's top-level bindings.
    #[error("{0} not found.")]
    TargetNotFound(String),

    /// The requested specific target exists but isn't a `SchemaResult`.
    #[error("{0} is not a schema result.")]
    TargetNotAResult(String),

    /// Failures surfacing from inside the hosted interpreter: schema
    /// definition errors, instantiation errors, type-check errors, validator
    /// errors. These already carry the precise spec'd message from the
    /// builtin or descriptor that raised them; this variant just adds the
    /// `<path>:<line>:` prefix once the innermost user-file frame is found.
    #[error("{0}")]
    Interpreter(String),

    /// Anything that reaches us from the filesystem.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StarfigError {
    pub fn interpreter(message: impl std::fmt::Display) -> Self {
        StarfigError::Interpreter(message.to_string())
    }
}
