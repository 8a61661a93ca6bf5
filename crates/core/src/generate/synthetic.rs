//! Deterministic offline generator.
//!
//! Produces the same lines for the same request, paced at a fixed interval
//! so that clients render it the way they render a live model.

use crate::generate::base::{GenerateError, GenerationRequest, Generator, TextStream};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_FALLBACK_INTERVAL: Duration = Duration::from_millis(150);

/// Offline stand-in for the upstream. Always available.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    interval: Duration,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_INTERVAL)
    }
}

impl SyntheticGenerator {
    /// Intervals below one millisecond are raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The full output for a request, one entry per emitted line.
    pub fn lines(request: &GenerationRequest) -> Vec<String> {
        let prompt = request.prompt.split_whitespace().collect::<Vec<_>>().join(" ");

        vec![
            format!(
                "[synthetic] Offline response from {} (upstream disabled or unreachable).\n",
                request.model
            ),
            format!("Prompt: {prompt}\n"),
            "1. Ingest: parse Link-16 and VMF message definitions into source schemas.\n"
                .to_string(),
            "2. Codegen: generate validators for required fields and value ranges.\n".to_string(),
            "3. Mapping: align source fields to the common data model and flag conflicts.\n"
                .to_string(),
            "4. Viz: render blue force tracks on the COP with compliance overlays.\n".to_string(),
            "Summary: pipeline plan ready for review.\n".to_string(),
        ]
    }
}

#[async_trait]
impl Generator for SyntheticGenerator {
    async fn check_availability(&self) -> bool {
        true
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<TextStream, GenerateError> {
        let lines = Self::lines(request);
        let interval = self.interval;

        let stream = async_stream::stream! {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for line in lines {
                ticker.tick().await;
                yield Ok(Bytes::from(line));
            }
        };

        Ok(Box::pin(stream))
    }
}
