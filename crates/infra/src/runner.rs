//! Runs an analysis job against a provider: bounded retries, then normalization.

use std::time::Duration;

use tracing::{info, warn};

use scriptaudit_ai::{AiError, CompletionProvider, Normalized, ScriptAnalysisJob};

use crate::config::ProviderConfig;

/// Longest single wait between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AnalysisRunner {
    /// Extra attempts after the first one, for retryable provider errors only.
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(250),
        }
    }
}

impl AnalysisRunner {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            ..Self::default()
        }
    }

    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    /// Fetch raw text for `job` and normalize it.
    ///
    /// Provider errors surface only when they are not retryable or retries ran
    /// out; once text arrives the result is always `Ok`.
    pub async fn run<P>(&self, provider: &P, job: &ScriptAnalysisJob) -> Result<Normalized, AiError>
    where
        P: CompletionProvider + ?Sized,
    {
        let request = job.completion_request();
        let mut failures: u32 = 0;

        let raw = loop {
            match provider.complete(&request).await {
                Ok(raw) => break raw,
                Err(e) if e.is_retryable() && failures < self.max_retries => {
                    failures += 1;
                    let wait = backoff(self.base_backoff, failures);
                    warn!(
                        analysis = %job.id(),
                        provider = provider.name(),
                        attempt = failures,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "provider call failed; retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    warn!(
                        analysis = %job.id(),
                        provider = provider.name(),
                        error = %e,
                        "provider call failed"
                    );
                    return Err(e.into());
                }
            }
        };

        let normalized = job.finish(&raw);
        info!(
            analysis = %job.id(),
            provider = provider.name(),
            model = %job.request().model,
            outcome = normalized.outcome.label(),
            retries = failures,
            "analysis finished"
        );
        Ok(normalized)
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    base.saturating_mul(pow).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CannedProvider;
    use scriptaudit_ai::{AnalysisRequest, NormalizeOutcome, ProviderError};

    fn job() -> ScriptAnalysisJob {
        ScriptAnalysisJob::new(AnalysisRequest::new("Teach Rust ownership.", "google/gemini-pro"))
            .unwrap()
    }

    fn runner(max_retries: u32) -> AnalysisRunner {
        AnalysisRunner {
            max_retries,
            base_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 2), Duration::from_millis(500));
        assert_eq!(backoff(base, 3), Duration::from_millis(1000));
        assert_eq!(backoff(base, 30), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn retries_retryable_errors_then_normalizes() {
        let provider = CannedProvider::scripted(vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::Status {
                status: 503,
                body: "busy".into(),
            }),
            Ok("not json at all".into()),
        ]);

        let normalized = runner(2).run(&provider, &job()).await.unwrap();
        assert_eq!(provider.calls(), 3);
        assert_eq!(normalized.outcome, NormalizeOutcome::Fallback);
        assert_eq!(
            normalized.result.rewritten_script.introduction,
            "Teach Rust ownership."
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let provider = CannedProvider::scripted(vec![Err(ProviderError::Transport("reset".into()))]);

        let err = runner(2).run(&provider, &job()).await.unwrap_err();
        assert_eq!(provider.calls(), 3);
        assert!(matches!(err, AiError::Provider(ProviderError::Transport(_))));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let provider = CannedProvider::scripted(vec![Err(ProviderError::Status {
            status: 401,
            body: "bad key".into(),
        })]);

        let err = runner(5).run(&provider, &job()).await.unwrap_err();
        assert_eq!(provider.calls(), 1);
        assert!(matches!(
            err,
            AiError::Provider(ProviderError::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn sends_the_job_request() {
        let provider = CannedProvider::new("{}");
        let job = job();
        runner(0).run(&provider, &job).await.unwrap();

        let sent = provider.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], job.completion_request());
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let provider: std::sync::Arc<dyn CompletionProvider> =
            std::sync::Arc::new(CannedProvider::new("{}"));
        let normalized = runner(0).run(provider.as_ref(), &job()).await.unwrap();
        assert_eq!(normalized.outcome.label(), "fallback");
    }
}
