/// Configures connection-gate probing behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Interval between reader-readiness probes, in milliseconds.
    ///
    /// A tuning knob, not a contract: the gate serializes operations
    /// regardless of how often it probes.
    pub reader_poll_interval_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reader_poll_interval_ms: 20,
        }
    }
}
