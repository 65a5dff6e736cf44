use std::time::Duration;

/// Tunables for the attestation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Total transaction attempts (first try included) before giving up on conflicts.
    pub max_attempts: u32,
    /// Delay before retry `n` is `retry_backoff * n`.
    pub retry_backoff: Duration,
    /// Largest expected amount accepted at creation, in cents.
    pub amount_ceiling_cents: i64,
    pub note_max_chars: usize,
    /// Limit for provider handles and transaction references.
    pub reference_max_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(5),
            amount_ceiling_cents: 50_000,
            note_max_chars: 140,
            reference_max_chars: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_amount_ceiling(mut self, cents: i64) -> Self {
        self.amount_ceiling_cents = cents;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}
