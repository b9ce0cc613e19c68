use std::collections::HashMap;
use std::time::Duration;

use crate::{game_time::GameInstant, messages::message::MessageContainer};

/// Correlates an outgoing request with the reply the caller is waiting for.
/// Applications embed the id in their own request payload; the peer echoes it
/// back in the reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResponseId(u16);

impl ResponseId {
    pub fn from_u16(value: u16) -> Self {
        Self(value)
    }

    pub fn to_u16(&self) -> u16 {
        self.0
    }
}

type ResponseCallback = Box<dyn FnOnce(Option<MessageContainer>)>;

struct PendingResponse {
    deadline: GameInstant,
    callback: ResponseCallback,
}

/// One-shot response registrations with deadlines. Every registration is
/// resolved exactly once: by a reply, or by its timeout firing with a `None`
/// payload. Nothing leaks if the peer never answers.
pub struct ResponseTracker {
    pending: HashMap<ResponseId, PendingResponse>,
    next_id: u16,
}

impl ResponseTracker {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Allocates an id and stores the callback. Returns `None` when every id
    /// is already outstanding; the callback is dropped without registering
    pub fn register(
        &mut self,
        timeout: Duration,
        now: GameInstant,
        callback: ResponseCallback,
    ) -> Option<ResponseId> {
        if self.pending.len() > u16::MAX as usize {
            return None;
        }
        // Skip ids that are still outstanding; wraps at u16.
        loop {
            let candidate = ResponseId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.pending.contains_key(&candidate) {
                self.pending.insert(
                    candidate,
                    PendingResponse {
                        deadline: now.add_duration(timeout),
                        callback,
                    },
                );
                return Some(candidate);
            }
        }
    }

    /// Delivers a reply. Returns false if the id was unknown or already
    /// resolved (late reply after timeout)
    pub fn resolve(&mut self, id: &ResponseId, response: MessageContainer) -> bool {
        match self.pending.remove(id) {
            Some(pending) => {
                (pending.callback)(Some(response));
                true
            }
            None => false,
        }
    }

    /// Fires timeout callbacks for every registration whose deadline has
    /// passed
    pub fn expire(&mut self, now: GameInstant) {
        let expired: Vec<ResponseId> = self
            .pending
            .iter()
            .filter(|(_, pending)| now.is_at_or_after(&pending.deadline))
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some(pending) = self.pending.remove(&id) {
                (pending.callback)(None);
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for ResponseTracker {
    fn default() -> Self {
        Self::new()
    }
}
