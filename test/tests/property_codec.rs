/// PROPERTY-BASED TESTS: codec invariants
///
/// Uses proptest to verify round trips hold across random inputs, including
/// the null sentinels for strings and blobs, and that oversized payloads are
/// rejected before any length-proportional allocation.
use proptest::prelude::*;

use wirebound_shared::{
    ByteReader, ByteWriter, CodecError, CodecLimits, Quat, Serde, Vec2, Vec3,
};

fn round_trip<T: Serde + PartialEq + std::fmt::Debug>(value: &T) -> T {
    let mut writer = ByteWriter::new();
    value.ser(&mut writer).expect("serialization failed");
    let bytes = writer.to_bytes();
    let mut reader = ByteReader::new(&bytes);
    let decoded = T::de(&mut reader).expect("deserialization failed");
    assert!(reader.is_empty(), "decoder left trailing bytes");
    decoded
}

proptest! {
    #[test]
    fn prop_primitive_round_trips(
        a in any::<u8>(),
        b in any::<u16>(),
        c in any::<u32>(),
        d in any::<u64>(),
        e in any::<i32>(),
        f in any::<bool>(),
    ) {
        prop_assert_eq!(round_trip(&a), a);
        prop_assert_eq!(round_trip(&b), b);
        prop_assert_eq!(round_trip(&c), c);
        prop_assert_eq!(round_trip(&d), d);
        prop_assert_eq!(round_trip(&e), e);
        prop_assert_eq!(round_trip(&f), f);
    }

    #[test]
    fn prop_float_round_trips(a in any::<f32>(), b in any::<f64>()) {
        let decoded_a = round_trip(&a);
        let decoded_b = round_trip(&b);
        prop_assert_eq!(decoded_a.to_bits(), a.to_bits());
        prop_assert_eq!(decoded_b.to_bits(), b.to_bits());
    }

    #[test]
    fn prop_string_round_trips(value in ".{0,256}") {
        prop_assert_eq!(round_trip(&value.to_string()), value);
    }

    #[test]
    fn prop_blob_round_trips(value in prop::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn prop_option_round_trips(value in prop::option::of(any::<u32>())) {
        prop_assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn prop_vector_round_trips(
        // Bounded so equality comparison never sees NaN.
        x in -1.0e6f32..1.0e6,
        y in -1.0e6f32..1.0e6,
        z in -1.0e6f32..1.0e6,
        w in -1.0e6f32..1.0e6,
    ) {
        let vec2 = Vec2::new(x, y);
        let vec3 = Vec3::new(x, y, z);
        let quat = Quat::new(x, y, z, w);
        prop_assert_eq!(round_trip(&vec2), vec2);
        prop_assert_eq!(round_trip(&vec3), vec3);
        prop_assert_eq!(round_trip(&quat), quat);
    }

    #[test]
    fn prop_null_string_sentinel_round_trips(value in prop::option::of(".{0,64}")) {
        let mut writer = ByteWriter::new();
        writer.write_string(value.as_deref()).unwrap();
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        prop_assert_eq!(reader.read_string().unwrap(), value);
    }

    #[test]
    fn prop_null_blob_sentinel_round_trips(
        value in prop::option::of(prop::collection::vec(any::<u8>(), 0..256)),
    ) {
        let mut writer = ByteWriter::new();
        writer.write_blob(value.as_deref()).unwrap();
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        prop_assert_eq!(reader.read_blob().unwrap(), value);
    }

    #[test]
    fn prop_oversized_string_is_rejected_on_encode(extra in 1usize..64) {
        let limits = CodecLimits {
            max_string_len: 32,
            max_blob_len: 32,
        };
        let value = "a".repeat(limits.max_string_len + extra);
        let mut writer = ByteWriter::with_limits(limits);
        let result = writer.write_string(Some(&value));
        let rejected = matches!(result, Err(CodecError::PayloadTooLarge { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn prop_oversized_declared_length_is_rejected_on_decode(declared in 64u16..1024) {
        let limits = CodecLimits {
            max_string_len: 32,
            max_blob_len: 32,
        };
        // A header declaring more bytes than the limit allows, with no body.
        let bytes = (declared + 1).to_le_bytes();
        let mut reader = ByteReader::with_limits(&bytes, limits);
        let result = reader.read_string();
        let rejected = matches!(result, Err(CodecError::PayloadTooLarge { .. }));
        prop_assert!(rejected);
    }
}
