use crate::driver::DriverError;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum GateDbError {
    /// Connection lifecycle failure: open, close, or liveness probe.
    #[error("connection error: {0}")]
    Connection(#[from] DriverError),
    /// A declared column type tag did not match the value the driver returned.
    #[error("cast error for column `{column}` in `{command}`: {detail}")]
    Cast {
        /// Physical name of the offending column.
        column: String,
        /// Command text of the statement being decoded.
        command: String,
        /// What the decode strategy rejected.
        detail: String,
    },
    /// Statement execution failed for any reason other than a cast.
    #[error("execution error for `{command}`: {detail}")]
    Execution {
        /// Command text of the failing statement.
        command: String,
        /// Driver-side failure detail.
        detail: String,
    },
    /// A submission reached the completion path with an unexpected shape.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),
    /// Alias-table configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}
