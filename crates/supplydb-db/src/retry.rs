//! Retry with exponential back-off and jitter for store writes.
//!
//! Only serialization failures (`40001`) and deadlocks (`40P01`) are retried;
//! every other error is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::DbError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const MAX_DELAY_MS: u64 = 5_000;

pub(crate) fn is_conflict(err: &DbError) -> bool {
    match err {
        DbError::Sqlx(sqlx::Error::Database(db)) => db
            .code()
            .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED),
        _ => false,
    }
}

/// Runs `operation`, retrying write conflicts up to `max_retries` more times.
///
/// The delay before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 %
/// jitter, capped at 5 s. Exhausted retries become [`DbError::Conflict`].
pub(crate) async fn retry_on_conflict<T, F, Fut>(
    identity: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_conflict(&err) => return Err(err),
            Err(err) => {
                if attempt >= max_retries {
                    return Err(DbError::Conflict {
                        identity: identity.to_owned(),
                        attempts: attempt + 1,
                    });
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    identity,
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "store write conflict, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
