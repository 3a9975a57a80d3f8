//! Retrying embedding wrapper
//!
//! Embedding generation is the one external call retried instead of
//! degraded immediately: a transient failure would otherwise silently
//! drop the semantic branch of every hybrid search. Backoff is
//! exponential with bounded attempts; after the last attempt the error
//! propagates so the caller can fall back to trigram-only search.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use dishcovery_core::{EmbeddingProvider, Result};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: usize,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            backoff_factor: 2,
        }
    }
}

/// Embedding provider wrapper with bounded exponential backoff
pub struct RetryingEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    config: RetryConfig,
}

impl RetryingEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl EmbeddingProvider for RetryingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut backoff = self.config.initial_backoff;
        let mut last_err = None;

        for attempt in 1..=self.config.max_attempts {
            match self.inner.embed(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %err,
                        "embedding attempt failed"
                    );
                    last_err = Some(err);
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= self.config.backoff_factor;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            dishcovery_core::Error::Embedding("no attempts configured".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dishcovery_core::Error;
    use parking_lot::Mutex;

    struct FlakyEmbedder {
        calls: Mutex<usize>,
        fail_first: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            let mut calls = self.calls.lock();
            *calls += 1;
            if *calls <= self.fail_first {
                Err(Error::Embedding("transient".to_string()))
            } else {
                Ok(vec![0.1, 0.2])
            }
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let embedder = RetryingEmbedder::new(
            Arc::new(FlakyEmbedder {
                calls: Mutex::new(0),
                fail_first: 2,
            }),
            RetryConfig {
                initial_backoff: Duration::from_millis(1),
                ..Default::default()
            },
        );
        assert!(embedder.embed("pizza").await.is_ok());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let inner = Arc::new(FlakyEmbedder {
            calls: Mutex::new(0),
            fail_first: 10,
        });
        let embedder = RetryingEmbedder::new(
            inner.clone(),
            RetryConfig {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(1),
                backoff_factor: 2,
            },
        );
        assert!(embedder.embed("pizza").await.is_err());
        assert_eq!(*inner.calls.lock(), 3);
    }
}
