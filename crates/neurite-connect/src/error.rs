/*!
Error taxonomy of the connection core.

Range and structure violations fail eagerly while a builder is constructed.
Failures inside a parallel build region are captured per worker thread and
re-raised on the caller's thread as `WrappedThread` once the region has
drained; the first failing thread wins, later ones are dropped.
*/

/// Result type for all connection-core operations.
pub type ConnectResult<T> = Result<T, ConnectError>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// User input violates a range or structure constraint.
    #[error("bad property: {0}")]
    BadProperty(String),

    /// The named synapse model does not exist.
    #[error("unknown synapse type: {0}")]
    UnknownSynapseType(String),

    /// The rule cannot connect to this kind of target.
    #[error("illegal connection: {0}")]
    IllegalConnection(String),

    /// Unsupported combination of rule and options.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Paired source and target sequences differ in length.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Internal inconsistency surfaced to the caller.
    #[error("kernel error: {0}")]
    Kernel(String),

    /// A worker thread failed inside the parallel build region.
    #[error("worker thread {thread} failed: {source}")]
    WrappedThread {
        thread: usize,
        #[source]
        source: Box<ConnectError>,
    },
}

impl ConnectError {
    pub(crate) fn bad_property(msg: impl Into<String>) -> Self {
        ConnectError::BadProperty(msg.into())
    }

    pub(crate) fn not_implemented(msg: impl Into<String>) -> Self {
        ConnectError::NotImplemented(msg.into())
    }
}
