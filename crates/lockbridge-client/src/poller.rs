//! Feed pollers
//!
//! Each tick fetches the three pipeline feeds concurrently and publishes them
//! into the [`FeedHub`]. Failed requests are retried with exponential backoff;
//! a feed whose retries are exhausted is marked unhealthy, which pauses every
//! tracker until a later poll succeeds.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use futures::future::join_all;
use lockbridge_readiness::{Feed, FeedHub};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::BridgeClient;
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{ClientError, Result};

const FEEDS: [Feed; 3] = [Feed::EthFinality, Feed::BridgeHead, Feed::StageTimings];

#[derive(Debug, Clone)]
pub struct FeedPoller {
    client: Arc<BridgeClient>,
    hub: FeedHub,
    config: ClientConfig,
}

impl FeedPoller {
    pub fn new(client: Arc<BridgeClient>, hub: FeedHub, config: ClientConfig) -> Self {
        Self {
            client,
            hub,
            config,
        }
    }

    /// Fetch and publish one feed, with retries
    pub async fn poll_feed(&self, feed: Feed) -> Result<()> {
        let retry = self.config.retry;
        match feed {
            Feed::EthFinality => {
                let state = fetch(feed, retry, || self.client.get_eth_finality()).await?;
                self.hub.publish_eth_finality(state);
            }
            Feed::BridgeHead => {
                let state = fetch(feed, retry, || self.client.get_bridge_head()).await?;
                self.hub.publish_bridge_head(state);
            }
            Feed::StageTimings => {
                let timings = fetch(feed, retry, || self.client.get_stage_timings()).await?;
                self.hub.publish_stage_timings(timings);
            }
        }
        Ok(())
    }

    /// Poll every feed once and update feed health.
    ///
    /// Returns the number of feeds that failed.
    pub async fn poll_all(&self) -> usize {
        let results = join_all(FEEDS.iter().map(|&feed| async move {
            let result = self.poll_feed(feed).await;
            (feed, result)
        }))
        .await;

        let mut failed = 0;
        for (feed, result) in results {
            match result {
                Ok(()) => self.hub.set_health(feed, true),
                Err(e) => {
                    warn!(%feed, "feed poll failed: {}", e);
                    self.hub.set_health(feed, false);
                    failed += 1;
                }
            }
        }
        failed
    }

    /// Poll on the configured interval until `shutdown` is set or dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting feed poller for {} with interval: {:?}",
            self.client.base_url(),
            self.config.poll_interval()
        );

        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let failed = self.poll_all().await;
                    debug!(failed, "poll cycle complete");
                }
                stop = shutdown.changed() => {
                    if stop.is_err() || *shutdown.borrow() {
                        info!("feed poller stopped");
                        break;
                    }
                }
            }
        }
    }
}

async fn fetch<T, F, Fut>(feed: Feed, retry: RetryConfig, request: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    request
        .retry(retry.backoff())
        .when(|e: &ClientError| e.is_retryable())
        .notify(|err: &ClientError, dur: Duration| {
            debug!(%feed, "Retrying feed request after error: {} (waiting {:?})", err, dur);
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use lockbridge_readiness::PipelineStage;
    use serde_json::json;

    fn poller_for(server: &MockServer, hub: &FeedHub) -> FeedPoller {
        let mut config = ClientConfig::local().with_base_url(server.base_url());
        config.retry = RetryConfig {
            max_times: 2,
            min_delay_ms: 1,
            max_delay_ms: 10,
        };
        let client = Arc::new(BridgeClient::try_new(&config).unwrap());
        FeedPoller::new(client, hub.clone(), config)
    }

    fn mock_feeds(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/feeds/eth-finality");
            then.status(200).json_body(json!({
                "latestFinalityBlockNumber": 200,
                "latestFinalitySlot": 9000
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/feeds/bridge-head");
            then.status(200).json_body(json!({
                "inputBlockNumber": 120,
                "outputBlockNumber": 180,
                "stageName": "BridgeHeadJobCreated",
                "elapsedSeconds": 0
            }));
        });
    }

    #[tokio::test]
    async fn test_poll_all_publishes_and_marks_failures() {
        let server = MockServer::start();
        mock_feeds(&server);
        let timings = server.mock(|when, then| {
            when.method(GET).path("/api/v1/feeds/stage-timings");
            then.status(503);
        });

        let hub = FeedHub::new();
        let failed = poller_for(&server, &hub).poll_all().await;
        assert_eq!(failed, 1);

        let snapshot = hub.snapshot();
        assert_eq!(
            snapshot.bridge_head.map(|b| b.stage_name),
            Some(PipelineStage::BridgeHeadJobCreated)
        );
        assert_eq!(
            snapshot.eth_finality.map(|f| f.latest_finality_block_number),
            Some(200)
        );
        assert!(snapshot.health.eth_finality);
        assert!(!snapshot.health.stage_timings);
        // one attempt plus two retries
        timings.assert_hits(3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start();
        let finality = server.mock(|when, then| {
            when.method(GET).path("/api/v1/feeds/eth-finality");
            then.status(401);
        });

        let hub = FeedHub::new();
        let poller = poller_for(&server, &hub);
        assert!(poller.poll_feed(Feed::EthFinality).await.is_err());
        finality.assert_hits(1);
        assert!(hub.snapshot().eth_finality.is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let server = MockServer::start();
        mock_feeds(&server);

        let hub = FeedHub::new();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(poller_for(&server, &hub).run(rx));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
