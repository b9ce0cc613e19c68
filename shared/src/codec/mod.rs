pub mod error;
pub mod reader;
pub mod vector;
pub mod writer;

mod serde_impls;

use error::CodecError;
use reader::ByteReader;
use writer::ByteWriter;

/// Bounds applied while encoding/decoding variable-length values. Payloads
/// exceeding a bound fail with `CodecError::PayloadTooLarge` before any
/// allocation proportional to the declared length happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecLimits {
    pub max_string_len: usize,
    pub max_blob_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_string_len: 32 * 1024,
            max_blob_len: 1024 * 1024,
        }
    }
}

/// Types that can be serialized to and deserialized from a fixed-layout,
/// little-endian byte stream.
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError>;
    fn de(reader: &mut ByteReader) -> Result<Self, CodecError>;
}
