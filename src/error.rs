//! Error types for zengrain

/// Error type for configuration mapping
///
/// The synthesizer rejects misconfiguration up-front, before any pattern
/// or LUT state is touched. Every variant names the offending parameter;
/// the per-frame compositor itself never returns errors (its runtime
/// invariants are assertions, not recoverable conditions).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A parameter lies outside its documented range
    #[error("{name} = {value} out of {min}..={max} range")]
    Range {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: i32,
        /// Lowest accepted value
        min: i32,
        /// Highest accepted value
        max: i32,
    },

    /// A sequence that must be strictly increasing is not
    #[error("{name} must be in increasing order")]
    Ordering {
        /// Parameter name
        name: &'static str,
    },

    /// A structurally valid configuration the synthesizer does not support
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// A coefficient vector has the wrong length
    #[error("{name} has length {len}, expected {expected}")]
    Shape {
        /// Parameter name
        name: &'static str,
        /// Provided length
        len: usize,
        /// Required length
        expected: usize,
    },
}

/// Result type for zengrain configuration operations
pub type Result<T, E = Error> = core::result::Result<T, E>;
