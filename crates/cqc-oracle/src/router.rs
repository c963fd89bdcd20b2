use async_trait::async_trait;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::provider::{AiOracle, OracleError, OracleExtraction, OracleRequest};

/// Exponential-backoff wrapper around an `AiOracle` (spec §4.3): 1s, 2s, 4s
/// between attempts, max 4 attempts, 10s per-call timeout. On total failure
/// the error is returned to the caller, which falls back to a button prompt
/// rather than crashing the turn — this wrapper never panics or hangs.
///
/// Grounded in `skynet_agent::router::ProviderRouter`'s retry loop, with the
/// teacher's `200ms * attempt` linear backoff replaced by the spec's fixed
/// 1s/2s/4s doubling schedule and a hard timeout per attempt.
pub struct BackoffOracle {
    inner: Box<dyn AiOracle>,
    max_attempts: u32,
    per_call_timeout: Duration,
}

const BACKOFF_SCHEDULE_MS: [u64; 3] = [1_000, 2_000, 4_000];

impl BackoffOracle {
    pub fn new(inner: Box<dyn AiOracle>) -> Self {
        Self {
            inner,
            max_attempts: 4,
            per_call_timeout: Duration::from_millis(cqc_core::config::ORACLE_TIMEOUT_MS),
        }
    }
}

#[async_trait]
impl AiOracle for BackoffOracle {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn extract(&self, req: &OracleRequest) -> Result<OracleExtraction, OracleError> {
        let mut last_err = OracleError::Unavailable("oracle never attempted".into());

        for attempt in 0..self.max_attempts {
            let call = tokio::time::timeout(self.per_call_timeout, self.inner.extract(req));
            match call.await {
                Ok(Ok(extraction)) => {
                    if attempt > 0 {
                        info!(attempt, "oracle call succeeded after retry");
                    }
                    return Ok(extraction);
                }
                Ok(Err(e)) => {
                    warn!(attempt, err = %e, "oracle call failed");
                    last_err = e;
                }
                Err(_) => {
                    warn!(attempt, "oracle call timed out");
                    last_err = OracleError::Timeout;
                }
            }

            if let Some(&delay_ms) = BACKOFF_SCHEDULE_MS.get(attempt as usize) {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        warn!(max_attempts = self.max_attempts, "oracle exhausted all attempts");
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqc_core::types::Language;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FlakyOracle {
        calls: Arc<AtomicU32>,
        succeed_on: u32,
    }

    #[async_trait]
    impl AiOracle for FlakyOracle {
        fn name(&self) -> &str {
            "flaky"
        }
        async fn extract(&self, _req: &OracleRequest) -> Result<OracleExtraction, OracleError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.succeed_on {
                Ok(OracleExtraction {
                    lang: Some(Language::En),
                    confidence: 0.9,
                    ..Default::default()
                })
            } else {
                Err(OracleError::Unavailable("not yet".into()))
            }
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl AiOracle for AlwaysFail {
        fn name(&self) -> &str {
            "always-fail"
        }
        async fn extract(&self, _req: &OracleRequest) -> Result<OracleExtraction, OracleError> {
            Err(OracleError::Unavailable("intentional".into()))
        }
    }

    fn dummy_request() -> OracleRequest {
        OracleRequest {
            utterance: "hi".into(),
            lang_hint: None,
            slot_schema: vec!["goal".into()],
            knowledge_snippets: vec![],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_within_max_attempts() {
        let oracle = BackoffOracle::new(Box::new(FlakyOracle {
            calls: Arc::new(AtomicU32::new(0)),
            succeed_on: 1,
        }));
        let result = oracle.extract(&dummy_request()).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_surfaces_the_error_without_panicking() {
        let oracle = BackoffOracle::new(Box::new(AlwaysFail));
        let result = oracle.extract(&dummy_request()).await;
        assert!(result.is_err());
    }
}
