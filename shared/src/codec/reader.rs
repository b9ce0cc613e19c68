use super::{error::CodecError, CodecLimits};

/// A checked cursor over received bytes. Reading past the end or past a
/// configured length bound yields an error, never a panic: everything read
/// through this type is untrusted network input.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
    limits: CodecLimits,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self::with_limits(buffer, CodecLimits::default())
    }

    pub fn with_limits(buffer: &'b [u8], limits: CodecLimits) -> Self {
        Self {
            buffer,
            cursor: 0,
            limits,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, count: usize) -> Result<&'b [u8], CodecError> {
        if self.remaining() < count {
            return Err(CodecError::UnexpectedEnd {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let slice = self.take(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CodecError::InvalidValue("bool")),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], CodecError> {
        self.take(count)
    }

    /// Counterpart of `ByteWriter::write_string`. The declared length is
    /// validated against both the configured maximum and the bytes actually
    /// remaining before any allocation happens
    pub fn read_string(&mut self) -> Result<Option<String>, CodecError> {
        let prefix = self.read_u16()?;
        if prefix == 0 {
            return Ok(None);
        }
        let length = (prefix - 1) as usize;
        if length > self.limits.max_string_len {
            return Err(CodecError::PayloadTooLarge {
                length,
                max: self.limits.max_string_len,
            });
        }
        let bytes = self.take(length)?;
        let string =
            String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidValue("utf-8 string"))?;
        Ok(Some(string))
    }

    /// Counterpart of `ByteWriter::write_blob`
    pub fn read_blob(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        let prefix = self.read_u32()?;
        if prefix == 0 {
            return Ok(None);
        }
        let length = (prefix - 1) as usize;
        if length > self.limits.max_blob_len {
            return Err(CodecError::PayloadTooLarge {
                length,
                max: self.limits.max_blob_len,
            });
        }
        let bytes = self.take(length)?;
        Ok(Some(bytes.to_vec()))
    }
}
