//! Content-hash keyed cache for computed credit scores.
//!
//! Scoring is cheap, so nothing depends on this cache for correctness; it
//! fronts the report path where the same client is scored repeatedly. Keys
//! are a SHA-256 digest of the scoring-relevant fields only, so an edit to
//! any scored field produces a fresh entry while identity-only edits reuse
//! the cached result.

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::models::Client;
use crate::scoring::{compute_score, CreditScore};

/// Computes the cache key from the scoring-relevant fields of a client.
pub fn content_key(client: &Client) -> String {
    let payload = serde_json::json!({
        "credit_utilization_ratio": client.credit_utilization_ratio,
        "payment_of_min_amount": client.payment_of_min_amount,
        "credit_mix": client.credit_mix,
        "num_of_delayed_payment": client.num_of_delayed_payment,
        "credit_history_age_months": client.credit_history_age_months,
        "monthly_balance": client.monthly_balance,
        "outstanding_debt": client.outstanding_debt,
        "amount_invested_monthly": client.amount_invested_monthly,
        "num_credit_inquiries": client.num_credit_inquiries,
        "credit_score": client.credit_score,
    });

    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub struct ScoreCache {
    inner: Cache<String, CreditScore>,
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreCache {
    /// 1 hour TTL, 10k entries.
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10_000)
                .build(),
        }
    }

    /// Returns the cached score for this client's scoring inputs, computing
    /// and inserting it on a miss.
    pub async fn get_or_compute(&self, client: &Client) -> CreditScore {
        let key = content_key(client);

        if let Some(hit) = self.inner.get(&key).await {
            tracing::debug!("Score cache HIT for client {}", client.id);
            return hit;
        }

        let score = compute_score(client);
        self.inner.insert(key, score).await;
        score
    }
}
