use thiserror::Error;

/// Errors surfaced by the engine's setter boundary.
///
/// Never produced from inside a tick: tick-body failures are logged and
/// swallowed so the loop keeps running (see `lumen_engine::tick`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid configuration value for `{field}`: {value}")]
    InvalidConfig { field: &'static str, value: String },

    #[error("unknown enum value `{value}` for `{field}`")]
    UnknownVariant { field: &'static str, value: String },
}

/// Typed outcome of a setter call: never an exception, per the documented
/// error-handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The value was valid and applied.
    Applied,
    /// The value was valid but had no effect (e.g. already at that value).
    Ignored,
}

pub type SetResult = Result<SetOutcome, EngineError>;
