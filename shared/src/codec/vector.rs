use super::{error::CodecError, reader::ByteReader, writer::ByteWriter, Serde};

/// A 2-dimensional float vector with a fixed 8-byte wire layout
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Serde for Vec2 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_f32(self.x);
        writer.write_f32(self.y);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
        })
    }
}

/// A 3-dimensional float vector with a fixed 12-byte wire layout
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Serde for Vec3 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_f32(self.x);
        writer.write_f32(self.y);
        writer.write_f32(self.z);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }
}

/// A rotation quaternion with a fixed 16-byte wire layout
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Serde for Quat {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), CodecError> {
        writer.write_f32(self.x);
        writer.write_f32(self.y);
        writer.write_f32(self.z);
        writer.write_f32(self.w);
        Ok(())
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
            w: reader.read_f32()?,
        })
    }
}
