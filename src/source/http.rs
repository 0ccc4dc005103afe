//! HTTP data source.
//!
//! Polls a running collector's `GET /api/stats` endpoint on a fixed interval
//! from a background task.

use std::sync::Arc;
use std::time::Duration;

use botwatch_types::{AggregateBy, StatsResponse};
use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::{DataSource, SourceError};

/// Default collector address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Settings for an [`HttpSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Collector base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Time between polls.
    pub interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Initial aggregation mode.
    pub aggregation: AggregateBy,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
            aggregation: AggregateBy::None,
        }
    }
}

impl HttpSourceConfig {
    /// Config for the given base URL with default timings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the poll interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the initial aggregation mode.
    pub fn aggregation(mut self, aggregation: AggregateBy) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// A data source that polls the collector over HTTP.
///
/// A background task issues one request per interval and waits for it to
/// finish before the next tick, so at most one request is in flight. Failed
/// requests are logged and remembered; the next tick retries.
///
/// Must be created inside a tokio runtime.
///
/// # Example
///
/// ```no_run
/// use botwatch::{DataSource, HttpSource, HttpSourceConfig};
///
/// # tokio_test::block_on(async {
/// let mut source = HttpSource::spawn(HttpSourceConfig::new("http://localhost:8000")).unwrap();
/// if let Some(response) = source.poll() {
///     println!("{} bots", response.len());
/// }
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    receiver: watch::Receiver<Option<StatsResponse>>,
    aggregation: watch::Sender<AggregateBy>,
    refresh: Arc<Notify>,
    shared_error: Arc<Mutex<Option<String>>>,
    last_error: Option<String>,
    description: String,
    task: JoinHandle<()>,
}

impl HttpSource {
    /// Start polling the collector described by `config`.
    ///
    /// Fails with [`SourceError::ZeroInterval`] if the interval is zero.
    pub fn spawn(config: HttpSourceConfig) -> Result<Self, SourceError> {
        if config.interval.is_zero() {
            return Err(SourceError::ZeroInterval);
        }
        let client = build_client(config.timeout)?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let (tx, rx) = watch::channel(None);
        let (agg_tx, agg_rx) = watch::channel(config.aggregation);
        let refresh = Arc::new(Notify::new());
        let shared_error = Arc::new(Mutex::new(None));

        let task = tokio::spawn(run_poller(
            client,
            base_url.clone(),
            config.interval,
            agg_rx,
            refresh.clone(),
            tx,
            shared_error.clone(),
        ));

        Ok(Self {
            receiver: rx,
            aggregation: agg_tx,
            refresh,
            shared_error,
            last_error: None,
            description: format!("http: {}", base_url),
            task,
        })
    }

    /// The aggregation mode the poller is currently using.
    pub fn aggregation(&self) -> AggregateBy {
        *self.aggregation.borrow()
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<StatsResponse> {
        self.last_error = self.shared_error.lock().clone();

        if self.receiver.has_changed().unwrap_or(false) {
            self.receiver.borrow_and_update().clone()
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn set_aggregation(&mut self, mode: AggregateBy) {
        // send_if_modified wakes the poller only on an actual change.
        self.aggregation.send_if_modified(|current| {
            if *current == mode {
                false
            } else {
                *current = mode;
                true
            }
        });
    }

    fn refresh(&mut self) {
        self.refresh.notify_one();
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Build the HTTP client used for polling.
pub fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Client(e.to_string()))
}

/// Fetch one stats response from `{base_url}/api/stats`.
pub async fn fetch_stats(
    client: &Client,
    base_url: &str,
    mode: AggregateBy,
) -> Result<StatsResponse, SourceError> {
    let url = format!("{}/api/stats", base_url.trim_end_matches('/'));

    let mut request = client.get(&url);
    if let Some(value) = mode.query_value() {
        request = request.query(&[("aggregate_by", value)]);
    }

    let response = request.send().await?;

    if !response.status().is_success() {
        return Err(SourceError::Http(format!(
            "API returned status {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| SourceError::Parse(e.to_string()))
}

async fn run_poller(
    client: Client,
    base_url: String,
    interval: Duration,
    mut aggregation: watch::Receiver<AggregateBy>,
    refresh: Arc<Notify>,
    tx: watch::Sender<Option<StatsResponse>>,
    error: Arc<Mutex<Option<String>>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = aggregation.changed() => {
                if changed.is_err() {
                    break;
                }
                ticker.reset();
            }
            _ = refresh.notified() => ticker.reset(),
        }

        let mode = *aggregation.borrow_and_update();
        match fetch_stats(&client, &base_url, mode).await {
            Ok(response) => {
                debug!(rows = response.len(), aggregate_by = %mode, "fetched stats");
                *error.lock() = None;
                if tx.send(Some(response)).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(url = %base_url, error = %e, "failed to fetch stats");
                *error.lock() = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpSourceConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.aggregation, AggregateBy::None);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSourceConfig::new("http://collector:9000")
            .interval(Duration::from_millis(500))
            .timeout(Duration::from_secs(1))
            .aggregation(AggregateBy::Topic);
        assert_eq!(config.base_url, "http://collector:9000");
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.aggregation, AggregateBy::Topic);
    }

    #[tokio::test]
    async fn test_description_and_aggregation() {
        let mut source = HttpSource::spawn(
            HttpSourceConfig::new("http://127.0.0.1:9/").interval(Duration::from_secs(60)),
        )
        .unwrap();
        assert_eq!(source.description(), "http: http://127.0.0.1:9");
        assert_eq!(source.aggregation(), AggregateBy::None);

        source.set_aggregation(AggregateBy::GroupId);
        assert_eq!(source.aggregation(), AggregateBy::GroupId);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = HttpSourceConfig::new(DEFAULT_BASE_URL).interval(Duration::ZERO);
        let result = HttpSource::spawn(config);
        assert!(matches!(result, Err(SourceError::ZeroInterval)));
    }
}
