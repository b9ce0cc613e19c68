use super::{error::CodecError, reader::ByteReader, writer::ByteWriter, Serde};

macro_rules! serde_primitive {
    ($t:ty, $write:ident, $read:ident) => {
        impl Serde for $t {
            fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
                writer.$write(*self);
                Ok(())
            }

            fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
                reader.$read()
            }
        }
    };
}

serde_primitive!(u8, write_u8, read_u8);
serde_primitive!(u16, write_u16, read_u16);
serde_primitive!(u32, write_u32, read_u32);
serde_primitive!(u64, write_u64, read_u64);
serde_primitive!(i8, write_i8, read_i8);
serde_primitive!(i16, write_i16, read_i16);
serde_primitive!(i32, write_i32, read_i32);
serde_primitive!(i64, write_i64, read_i64);
serde_primitive!(f32, write_f32, read_f32);
serde_primitive!(f64, write_f64, read_f64);
serde_primitive!(bool, write_bool, read_bool);

// Non-null string. Null strings travel through the explicit
// `write_string(None)` / `read_string()` codec methods; decoding the null
// sentinel into a bare String is a value error.
impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_string(Some(self))
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader
            .read_string()?
            .ok_or(CodecError::InvalidValue("null string"))
    }
}

// Non-null byte array, u32 length + 1 prefix.
impl Serde for Vec<u8> {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_blob(Some(self))
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader
            .read_blob()?
            .ok_or(CodecError::InvalidValue("null blob"))
    }
}

// Nullable wrapper: presence byte followed by the value.
impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        match self {
            None => {
                writer.write_bool(false);
                Ok(())
            }
            Some(value) => {
                writer.write_bool(true);
                value.ser(writer)
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        if reader.read_bool()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}
