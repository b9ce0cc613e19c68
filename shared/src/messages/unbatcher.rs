use std::collections::VecDeque;

use crate::{
    game_time::GameInstant,
    messages::{
        batch::{BATCH_HEADER_SIZE, ENVELOPE_SIZE_PREFIX},
        error::BatchError,
    },
};

/// Reconstructs the ordered envelope sequence from received batches, each
/// envelope tagged with its batch's timestamp. Batches are validated eagerly
/// on arrival: a bad size prefix fails the whole batch before anything from
/// it is delivered, so a malformed peer can be cut off without partially
/// dispatching its data.
pub struct Unbatcher {
    queue: VecDeque<(GameInstant, Vec<u8>)>,
    max_queued: usize,
}

impl Unbatcher {
    pub fn new(max_queued: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max_queued,
        }
    }

    pub fn add_batch(&mut self, batch: &[u8]) -> Result<(), BatchError> {
        if batch.len() < BATCH_HEADER_SIZE {
            return Err(BatchError::TruncatedBatch {
                length: batch.len(),
                header: BATCH_HEADER_SIZE,
            });
        }

        let mut timestamp_bytes = [0u8; BATCH_HEADER_SIZE];
        timestamp_bytes.copy_from_slice(&batch[..BATCH_HEADER_SIZE]);
        let timestamp = GameInstant::from_millis(u64::from_le_bytes(timestamp_bytes));

        let mut parsed: Vec<(GameInstant, Vec<u8>)> = Vec::new();
        let mut cursor = BATCH_HEADER_SIZE;
        while cursor < batch.len() {
            let remaining = batch.len() - cursor;
            if remaining < ENVELOPE_SIZE_PREFIX {
                return Err(BatchError::TruncatedEnvelope {
                    declared: ENVELOPE_SIZE_PREFIX,
                    remaining,
                });
            }
            let declared =
                u16::from_le_bytes([batch[cursor], batch[cursor + 1]]) as usize;
            cursor += ENVELOPE_SIZE_PREFIX;
            if declared > batch.len() - cursor {
                return Err(BatchError::TruncatedEnvelope {
                    declared,
                    remaining: batch.len() - cursor,
                });
            }
            parsed.push((timestamp, batch[cursor..cursor + declared].to_vec()));
            cursor += declared;
        }

        if self.queue.len() + parsed.len() > self.max_queued {
            return Err(BatchError::QueueFull {
                limit: self.max_queued,
            });
        }
        self.queue.extend(parsed);
        Ok(())
    }

    pub fn pop_envelope(&mut self) -> Option<(GameInstant, Vec<u8>)> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
