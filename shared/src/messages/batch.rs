use std::collections::VecDeque;

use crate::{game_time::GameInstant, messages::error::BatchError};

/// Bytes a batch spends on its timestamp header
pub const BATCH_HEADER_SIZE: usize = 8;

/// Bytes spent framing each envelope inside a batch
pub const ENVELOPE_SIZE_PREFIX: usize = 2;

/// Accumulates envelopes into outgoing transport payloads.
///
/// Wire layout per batch: `[timestamp: u64 millis][ [size: u16][envelope] ]*`,
/// total size bounded by the transport-reported maximum for the channel. The
/// timestamp is stamped when a batch is opened, so every envelope in a batch
/// shares the instant its first envelope was queued. An envelope that alone
/// exceeds the threshold is sealed into its own oversized batch; callers only
/// do that on the reliable channel, where the transport can fragment.
pub struct Batcher {
    threshold: usize,
    batches: VecDeque<Vec<u8>>,
    current: Option<Vec<u8>>,
    queued_bytes: usize,
}

impl Batcher {
    pub fn new(threshold: usize) -> Self {
        debug_assert!(threshold > BATCH_HEADER_SIZE + ENVELOPE_SIZE_PREFIX);
        Self {
            threshold,
            batches: VecDeque::new(),
            current: None,
            queued_bytes: 0,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Largest envelope that still fits inside a regular (non-oversized)
    /// batch on this channel
    pub fn max_envelope_size(&self) -> usize {
        self.threshold - BATCH_HEADER_SIZE - ENVELOPE_SIZE_PREFIX
    }

    pub fn add_envelope(&mut self, envelope: &[u8], now: GameInstant) -> Result<(), BatchError> {
        if envelope.len() >= u16::MAX as usize {
            return Err(BatchError::EnvelopeTooLarge {
                length: envelope.len(),
                max: u16::MAX as usize - 1,
            });
        }

        let framed = ENVELOPE_SIZE_PREFIX + envelope.len();

        if envelope.len() > self.max_envelope_size() {
            // Oversized: seal whatever is forming and give this envelope a
            // batch of its own, sent past the threshold.
            self.seal_current();
            let mut batch = Vec::with_capacity(BATCH_HEADER_SIZE + framed);
            write_header(&mut batch, now);
            write_envelope(&mut batch, envelope);
            self.queued_bytes += batch.len();
            self.batches.push_back(batch);
            return Ok(());
        }

        if let Some(current) = &self.current {
            if current.len() + framed > self.threshold {
                self.seal_current();
            }
        }

        let current = self.current.get_or_insert_with(|| {
            let mut batch = Vec::with_capacity(self.threshold);
            write_header(&mut batch, now);
            batch
        });
        write_envelope(current, envelope);
        self.queued_bytes += framed;
        Ok(())
    }

    /// Queue an empty batch carrying only a timestamp; used as a heartbeat
    pub fn add_heartbeat(&mut self, now: GameInstant) {
        self.seal_current();
        let mut batch = Vec::with_capacity(BATCH_HEADER_SIZE);
        write_header(&mut batch, now);
        self.queued_bytes += batch.len();
        self.batches.push_back(batch);
    }

    pub fn has_batches(&self) -> bool {
        !self.batches.is_empty() || self.current.is_some()
    }

    /// Pops the next complete batch, sealing the forming one if nothing
    /// else is queued
    pub fn pop_batch(&mut self) -> Option<Vec<u8>> {
        if self.batches.is_empty() {
            self.seal_current();
        }
        let batch = self.batches.pop_front()?;
        self.queued_bytes = self.queued_bytes.saturating_sub(batch.len());
        Some(batch)
    }

    /// Bytes currently waiting to be flushed, used for back-pressure checks
    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.current = None;
        self.queued_bytes = 0;
    }

    fn seal_current(&mut self) {
        if let Some(batch) = self.current.take() {
            // Account for the header bytes only once the batch is real.
            self.queued_bytes += BATCH_HEADER_SIZE;
            self.batches.push_back(batch);
        }
    }
}

fn write_header(batch: &mut Vec<u8>, now: GameInstant) {
    batch.extend_from_slice(&now.as_millis().to_le_bytes());
}

fn write_envelope(batch: &mut Vec<u8>, envelope: &[u8]) {
    batch.extend_from_slice(&(envelope.len() as u16).to_le_bytes());
    batch.extend_from_slice(envelope);
}
