use super::{error::CodecError, CodecLimits};

/// A growable little-endian byte buffer that all outgoing envelopes and
/// batches are written through.
pub struct ByteWriter {
    buffer: Vec<u8>,
    limits: CodecLimits,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::with_limits(CodecLimits::default())
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self {
            buffer: Vec::with_capacity(256),
            limits,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Booleans occupy a single byte on the wire
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Raw bytes, no prefix. The caller owns the framing
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Length-prefixed string: u16 prefix holds length + 1, where 0 means
    /// null. Strings beyond `max_string_len` are refused
    pub fn write_string(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        match value {
            None => {
                self.write_u16(0);
                Ok(())
            }
            Some(string) => {
                let length = string.len();
                if length > self.limits.max_string_len || length >= u16::MAX as usize {
                    return Err(CodecError::PayloadTooLarge {
                        length,
                        max: self.limits.max_string_len,
                    });
                }
                self.write_u16((length + 1) as u16);
                self.buffer.extend_from_slice(string.as_bytes());
                Ok(())
            }
        }
    }

    /// Length-prefixed byte array: u32 prefix holds length + 1, where 0
    /// means null. Blobs beyond `max_blob_len` are refused
    pub fn write_blob(&mut self, value: Option<&[u8]>) -> Result<(), CodecError> {
        match value {
            None => {
                self.write_u32(0);
                Ok(())
            }
            Some(bytes) => {
                let length = bytes.len();
                if length > self.limits.max_blob_len || length >= u32::MAX as usize {
                    return Err(CodecError::PayloadTooLarge {
                        length,
                        max: self.limits.max_blob_len,
                    });
                }
                self.write_u32((length + 1) as u32);
                self.buffer.extend_from_slice(bytes);
                Ok(())
            }
        }
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
