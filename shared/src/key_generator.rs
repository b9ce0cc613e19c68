use std::collections::VecDeque;

/// Hands out unique non-zero u64 keys, recycling a key only after its owner
/// has explicitly released it. Used for connection id assignment: an id is
/// never reused while still registered.
pub struct KeyGenerator {
    next: u64,
    recycled: VecDeque<u64>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self {
            next: 1,
            recycled: VecDeque::new(),
        }
    }

    pub fn generate(&mut self) -> u64 {
        if let Some(key) = self.recycled.pop_front() {
            return key;
        }
        let key = self.next;
        self.next = self.next.wrapping_add(1);
        if self.next == 0 {
            // 0 is reserved for the local host
            self.next = 1;
        }
        key
    }

    pub fn recycle(&mut self, key: u64) {
        debug_assert_ne!(key, 0);
        self.recycled.push_back(key);
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
