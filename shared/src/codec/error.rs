use thiserror::Error;

/// Errors that can occur while encoding or decoding wire data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The buffer ended before the requested number of bytes could be read
    #[error("Buffer ended with {remaining} bytes remaining while {needed} were required")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A length prefix exceeded the configured maximum. Treated as a
    /// protocol violation since it is indistinguishable from an
    /// allocation attack
    #[error("Length prefix of {length} bytes exceeds the configured maximum of {max} bytes")]
    PayloadTooLarge { length: usize, max: usize },

    /// A decoded value was not valid for its type (e.g. a boolean byte
    /// that was neither 0 nor 1, or a non-UTF-8 string)
    #[error("Invalid value while decoding {0}")]
    InvalidValue(&'static str),
}
