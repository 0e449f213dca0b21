//! telemetry/counters.rs
//! Per-session counters.
//!
//! Summary: Collects primitive-call and byte counts while a session runs.
//! Sessions own their counters; callers merge them when aggregating.

use serde::{Deserialize, Serialize};

/// Deterministic counters collected by one adapter session.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    /// Calls made into the accelerator (successful or not).
    pub primitive_calls: u64,
    /// Accelerator calls that failed.
    pub primitive_failures: u64,
    /// Whole blocks handed to the hash primitive before finalize.
    pub blocks_submitted: u64,
    /// Bytes fed to `update` on a digest session.
    pub bytes_hashed: u64,
    /// Associated data bytes authenticated.
    pub aad_bytes: u64,
    /// Payload bytes transformed.
    pub payload_bytes: u64,
    /// Messages finalized (digest or AEAD).
    pub messages_finalized: u64,
    pub records_sealed: u64,
    pub records_opened: u64,
    pub auth_failures: u64,
}

impl SessionCounters {
    /// Record one accelerator call and its outcome.
    #[inline]
    pub fn add_call(&mut self, ok: bool) {
        self.primitive_calls += 1;
        if !ok {
            self.primitive_failures += 1;
        }
    }

    /// Record `n` whole hash blocks submitted.
    #[inline]
    pub fn add_blocks(&mut self, n: u64) {
        self.blocks_submitted += n;
    }

    // Plain field sums, no atomics: sessions are single-owner.
    pub fn merge(&mut self, other: &SessionCounters) {
        self.primitive_calls += other.primitive_calls;
        self.primitive_failures += other.primitive_failures;
        self.blocks_submitted += other.blocks_submitted;
        self.bytes_hashed += other.bytes_hashed;
        self.aad_bytes += other.aad_bytes;
        self.payload_bytes += other.payload_bytes;
        self.messages_finalized += other.messages_finalized;
        self.records_sealed += other.records_sealed;
        self.records_opened += other.records_opened;
        self.auth_failures += other.auth_failures;
    }

    /// Serialize for log lines or external telemetry sinks.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
