//! Simulated CDM track feed.
//!
//! Produces plausible position reports as if Link-16 and VMF traffic had
//! been mapped into the common data model. Each source has its own coverage
//! profile: VMF drops speed and heading more often and uses a different
//! unit id format, which is reported as a deviation.
//!
//! Like the snapshot stream, the feed is a lazy generator owning its
//! ticker; dropping it stops all work.

use bf_protocol::sim_models::{CdmEntity, CdmEvent, CdmFeedQuery, CdmRecord, Deviation, SourceType};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::Stream;

pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_millis(800);
pub const MIN_FEED_INTERVAL: Duration = Duration::from_millis(200);
pub const MAX_FEED_INTERVAL: Duration = Duration::from_millis(2000);

/// Upper bound on events sent at once when a subscriber connects.
pub const WARMUP_EVENTS: usize = 3;

const CENTER_LAT: f64 = 34.05;
const CENTER_LON: f64 = -118.25;
const POSITION_SPREAD: f64 = 1.5;

/// Feed parameters. `sources` is never empty and `interval` is always
/// within [`MIN_FEED_INTERVAL`]..=[`MAX_FEED_INTERVAL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdmFeedConfig {
    sources: Vec<SourceType>,
    interval: Duration,
}

impl Default for CdmFeedConfig {
    fn default() -> Self {
        Self::new(SourceType::ALL.to_vec(), DEFAULT_FEED_INTERVAL)
    }
}

impl CdmFeedConfig {
    /// An empty source list means every source.
    pub fn new(sources: Vec<SourceType>, interval: Duration) -> Self {
        let sources = if sources.is_empty() {
            SourceType::ALL.to_vec()
        } else {
            sources
        };

        Self {
            sources,
            interval: interval.clamp(MIN_FEED_INTERVAL, MAX_FEED_INTERVAL),
        }
    }

    /// Build from the endpoint query.
    ///
    /// Unknown source names are ignored. A missing or non-numeric interval
    /// uses the default; numeric values are clamped.
    pub fn from_query(query: &CdmFeedQuery) -> Self {
        let sources = query
            .sources
            .as_deref()
            .map(|list| list.split(',').filter_map(SourceType::parse).collect())
            .unwrap_or_default();

        let interval = query
            .interval_ms
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|ms| ms.is_finite())
            .map(|ms| {
                let min = MIN_FEED_INTERVAL.as_millis() as f64;
                let max = MAX_FEED_INTERVAL.as_millis() as f64;
                Duration::from_millis(ms.clamp(min, max).round() as u64)
            })
            .unwrap_or(DEFAULT_FEED_INTERVAL);

        Self::new(sources, interval)
    }

    pub fn sources(&self) -> &[SourceType] {
        &self.sources
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f64, delta: f64) -> f64 {
    base + (rng.gen::<f64>() * 2.0 - 1.0) * delta
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Generate one event for `source`.
pub fn generate_event<R: Rng + ?Sized>(
    rng: &mut R,
    source: SourceType,
    ts: DateTime<Utc>,
) -> CdmEvent {
    let entity = if rng.gen::<f64>() < 0.7 {
        CdmEntity::Track
    } else {
        CdmEntity::Unit
    };

    let (unit_id, speed_coverage, heading_coverage) = match source {
        SourceType::Link16 => (format!("L16-{}", rng.gen_range(100..1000)), 0.95, 0.9),
        SourceType::Vmf => (format!("VMF_{}", rng.gen_range(1000..10000)), 0.75, 0.65),
    };

    let lat = round5(jitter(rng, CENTER_LAT, POSITION_SPREAD));
    let lon = round5(jitter(rng, CENTER_LON, POSITION_SPREAD));

    let speed =
        (rng.gen::<f64>() < speed_coverage).then(|| jitter(rng, 120.0, 25.0).round() as i64);
    let heading = (rng.gen::<f64>() < heading_coverage)
        .then(|| (jitter(rng, 180.0, 60.0).round() as i64).rem_euclid(360));

    let mut deviations = Vec::new();
    if speed.is_none() {
        deviations.push(Deviation::new("speed", "missing"));
    }
    if heading.is_none() {
        deviations.push(Deviation::new("heading", "missing"));
    }
    if source == SourceType::Vmf {
        deviations.push(Deviation::new(
            "unitId",
            "format_diff (VMF underscore vs Link-16 dash)",
        ));
    }

    CdmEvent {
        id: format!("{:x}", rng.gen::<u64>()),
        ts,
        source,
        cdm: CdmRecord {
            entity,
            unit_id,
            lat,
            lon,
            speed,
            heading,
        },
        deviations,
    }
}

fn random_event<R: Rng + ?Sized>(rng: &mut R, sources: &[SourceType]) -> CdmEvent {
    let source = sources[rng.gen_range(0..sources.len())];
    generate_event(rng, source, Utc::now())
}

/// Stream simulated events forever, seeded from the OS.
pub fn cdm_feed(config: CdmFeedConfig) -> impl Stream<Item = CdmEvent> + Send + 'static {
    cdm_feed_with_rng(config, StdRng::from_entropy())
}

/// Stream simulated events forever using `rng`.
///
/// Up to [`WARMUP_EVENTS`] events (one per configured source) are emitted
/// immediately, then one per interval.
pub fn cdm_feed_with_rng<R>(
    config: CdmFeedConfig,
    mut rng: R,
) -> impl Stream<Item = CdmEvent> + Send + 'static
where
    R: Rng + Send + 'static,
{
    async_stream::stream! {
        for _ in 0..WARMUP_EVENTS.min(config.sources.len()) {
            yield random_event(&mut rng, &config.sources);
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + config.interval, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            yield random_event(&mut rng, &config.sources);
        }
    }
}
