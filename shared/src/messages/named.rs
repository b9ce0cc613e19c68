/// A stable, fully-qualified name for a message type. Both ends of a
/// connection derive the wire opcode from this name, so it must be identical
/// across builds and platforms.
pub trait Named {
    fn name() -> &'static str
    where
        Self: Sized;
}
