/// Identity of one remote endpoint, unique and non-zero within a single
/// Transport instance. Id 0 is reserved for the local/loopback host.
pub type ConnectionId = u64;

/// Identity of a replicated entity, assigned monotonically by the server.
/// Never zero, never recycled.
pub type NetworkId = u32;

pub type Tick = u64;
