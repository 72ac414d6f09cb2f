//! Configuration provider (C7, §4.5): bootstraps a bucket by probing seed
//! nodes in parallel, gates incoming configs on revision, and fans updates
//! out to subscribers as immutable [`ClusterConfig`] snapshots.

pub mod loader;
pub mod refresher;

pub use loader::{ConfigLoader, DEFAULT_KV_PORT, DEFAULT_KV_TLS_PORT, DEFAULT_MANAGER_PORT, DEFAULT_MANAGER_TLS_PORT};
pub use refresher::ConfigRefresher;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::{parse_bucket_config, ClusterConfig, CollectionManifestCache, CollectionManifestLoader, ManifestResponse};
use crate::error::{CoreError, ConfigError};
use crate::events::{ConfigIgnoredReason, Event, EventBus};
use crate::provider::loader::MAX_PARALLEL_LOADERS;
use crate::types::NodeIdentifier;

struct LoadedConfig {
    bytes: Vec<u8>,
    origin: String,
}

/// A subscription to the provider's snapshot stream with replay-one
/// semantics (§9 - "new subscribers MUST receive the latest snapshot on
/// subscribe").
pub struct ConfigStream {
    initial: Option<ClusterConfig>,
    rx: broadcast::Receiver<ClusterConfig>,
}

impl ConfigStream {
    pub async fn recv(&mut self) -> Result<ClusterConfig, broadcast::error::RecvError> {
        if let Some(cfg) = self.initial.take() {
            return Ok(cfg);
        }
        self.rx.recv().await
    }
}

struct Inner {
    seeds: Vec<NodeIdentifier>,
    use_tls: bool,
    loader: Arc<dyn ConfigLoader>,
    refresher: Arc<dyn ConfigRefresher>,
    events: EventBus,
    config: ArcSwap<ClusterConfig>,
    tx: Mutex<Option<broadcast::Sender<ClusterConfig>>>,
    collections: Mutex<HashMap<String, Arc<CollectionManifestCache>>>,
    refresh_tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    shut_down: AtomicBool,
}

/// Bootstraps and maintains the cluster's bucket configurations.
#[derive(Clone)]
pub struct ConfigProvider {
    inner: Arc<Inner>,
}

impl ConfigProvider {
    pub fn new(
        seeds: Vec<NodeIdentifier>,
        use_tls: bool,
        loader: Arc<dyn ConfigLoader>,
        refresher: Arc<dyn ConfigRefresher>,
        events: EventBus,
    ) -> Self {
        let (tx, _rx) = broadcast::channel(32);
        Self {
            inner: Arc::new(Inner {
                seeds,
                use_tls,
                loader,
                refresher,
                events,
                config: ArcSwap::from_pointee(ClusterConfig::empty()),
                tx: Mutex::new(Some(tx)),
                collections: Mutex::new(HashMap::new()),
                refresh_tasks: Mutex::new(HashMap::new()),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// The current cluster-wide snapshot.
    pub fn current(&self) -> ClusterConfig {
        (**self.inner.config.load()).clone()
    }

    /// Subscribes to the config stream. Per §9's "replay-one" requirement, a
    /// new subscriber's first `recv()` always yields the latest snapshot
    /// immediately, even if no config is published after it subscribes. A
    /// subscriber registering after shutdown gets a stream that completes
    /// immediately once its replayed snapshot is consumed.
    pub fn subscribe(&self) -> ConfigStream {
        // Register with the broadcast channel before reading the current
        // snapshot so a publish racing this call is never missed - at worst
        // the replayed snapshot is delivered a second time, which is
        // harmless since reconciliation is idempotent.
        let rx = match self.inner.tx.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                let (closed_tx, rx) = broadcast::channel(1);
                drop(closed_tx);
                rx
            }
        };
        ConfigStream { initial: Some(self.current()), rx }
    }

    /// Stores `cfg` as the current snapshot and fans it out to subscribers.
    /// A no-op send (no active subscribers, or the stream already
    /// completed) is not an error.
    fn publish(&self, cfg: ClusterConfig) {
        self.inner.config.store(Arc::new(cfg.clone()));
        if let Some(tx) = self.inner.tx.lock().unwrap_or_else(|p| p.into_inner()).as_ref() {
            let _ = tx.send(cfg);
        }
    }

    /// Opens `bucket`, bootstrapping it via parallel seed probing if it
    /// isn't already open (idempotent, §4.5).
    pub async fn open_bucket(&self, bucket: &str) -> Result<(), CoreError> {
        self.ensure_not_shut_down()?;
        if self.current().has_bucket(bucket) {
            return Ok(());
        }
        let loaded = self.bootstrap_probe(bucket).await?;
        self.propose_bucket_config(&loaded.bytes, &loaded.origin).await?;
        self.spawn_refresher(bucket.to_string());
        self.inner.events.publish(Event::BucketOpened { bucket: bucket.to_string() });
        Ok(())
    }

    /// Closes a previously opened bucket, tearing down its refresher
    /// subscription and collection cache (§4.5).
    pub fn close_bucket(&self, bucket: &str) -> Result<(), CoreError> {
        self.ensure_not_shut_down()?;
        if !self.current().has_bucket(bucket) {
            return Err(CoreError::Config(ConfigError::NoSuchBucket(bucket.to_string())));
        }
        self.close_bucket_ignore_shutdown(bucket);
        Ok(())
    }

    /// The guts of `close_bucket`, without the shut-down check: used both by
    /// the public `close_bucket` and by `shutdown`, which closes every open
    /// bucket after the shut-down flag is already set (§4.6 -
    /// "closeBucketIgnoreShutdown").
    fn close_bucket_ignore_shutdown(&self, bucket: &str) {
        let updated = self.current().without_bucket(bucket);
        self.publish(updated);
        if let Some(handle) = self.inner.refresh_tasks.lock().unwrap_or_else(|p| p.into_inner()).remove(bucket) {
            handle.abort();
        }
        self.inner.collections.lock().unwrap_or_else(|p| p.into_inner()).remove(bucket);
        let refresher = self.inner.refresher.clone();
        let bucket_owned = bucket.to_string();
        tokio::spawn(async move { refresher.deregister(&bucket_owned).await });
        self.inner.events.publish(Event::BucketClosed { bucket: bucket.to_string() });
    }

    /// Applies a freshly received raw config document, gating on revision
    /// (§4.5). Called both from bootstrap and from refresher pushes.
    pub async fn propose_bucket_config(&self, raw: &[u8], origin_host: &str) -> Result<(), CoreError> {
        self.ensure_not_shut_down()?;
        let parsed = match parse_bucket_config(raw, origin_host) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.inner.events.publish(Event::ConfigIgnored {
                    bucket: String::new(),
                    reason: ConfigIgnoredReason::ParseFailure,
                });
                return Err(CoreError::Config(err));
            }
        };

        let bucket_name = parsed.name.clone();
        let current = self.current();
        if let Some(existing) = current.bucket(&bucket_name) {
            // Revision 0 means "no revision info" and is always accepted;
            // only a positive, non-newer revision is a rollback (§4.6, §8).
            if parsed.revision > 0 && parsed.revision <= existing.revision {
                self.inner.events.publish(Event::ConfigIgnored {
                    bucket: bucket_name.clone(),
                    reason: ConfigIgnoredReason::OldOrSameRevision,
                });
                return Err(CoreError::Config(ConfigError::OldOrSameRevision {
                    bucket: bucket_name,
                    current: existing.revision,
                    incoming: parsed.revision,
                }));
            }
        }

        let revision = parsed.revision;
        let tainted = parsed.tainted;
        if tainted {
            self.inner.refresher.mark_tainted(&bucket_name).await;
        } else {
            self.inner.refresher.mark_untainted(&bucket_name).await;
        }

        let updated = current.with_bucket(parsed);
        self.publish(updated);
        self.inner.events.publish(Event::ConfigUpdated { bucket: bucket_name, revision });
        Ok(())
    }

    /// The collection manifest cache for `bucket`, created lazily.
    pub fn collections_for(&self, bucket: &str) -> Arc<CollectionManifestCache> {
        self.inner
            .collections
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(CollectionManifestCache::new()))
            .clone()
    }

    /// Issues a manifest request for `bucket` through `loader` and replaces
    /// its cached mapping on success (§4.6). When `force` is false and a
    /// manifest is already cached, the request is skipped — repeated
    /// `resolve` misses on a stable collection don't each trigger a fresh
    /// round trip. `force` always reissues, e.g. after an explicit
    /// `CollectionMapDecodingFailed`.
    ///
    /// An `UNKNOWN` response surfaces as [`CoreError::CollectionsNotAvailable`];
    /// any other non-success response is wrapped as a [`CoreError::Dispatch`]
    /// carrying the reported status.
    pub async fn refresh_collection_map(
        &self,
        bucket: &str,
        force: bool,
        loader: &dyn CollectionManifestLoader,
    ) -> Result<(), CoreError> {
        self.ensure_not_shut_down()?;
        let cache = self.collections_for(bucket);
        if !force && cache.current_uid().is_some() {
            return Ok(());
        }

        match loader.fetch(bucket).await? {
            ManifestResponse::Applied { uid, entries } => {
                cache.apply(uid, entries);
                Ok(())
            }
            ManifestResponse::Unknown => Err(CoreError::CollectionsNotAvailable),
            ManifestResponse::Other { status } => {
                self.inner.events.publish(Event::CollectionMapDecodingFailed {
                    bucket: bucket.to_string(),
                    reason: status.clone(),
                });
                Err(CoreError::Dispatch(format!("manifest request for '{bucket}' failed: {status}")))
            }
        }
    }

    /// Closes every open bucket (ignoring the shut-down flag just set),
    /// publishes one final (possibly empty) cluster config, completes the
    /// subscribers' stream, then tears down every refresher. Idempotent
    /// calls after the first return [`CoreError::AlreadyShutdown`] (§4.6).
    pub fn shutdown(&self) -> Result<(), CoreError> {
        if self.inner.shut_down.swap(true, Ordering::AcqRel) {
            return Err(CoreError::AlreadyShutdown);
        }
        let open_buckets: Vec<String> = self.current().bucket_names().map(str::to_string).collect();
        for bucket in &open_buckets {
            self.close_bucket_ignore_shutdown(bucket);
        }
        self.publish(ClusterConfig::empty());
        self.inner.tx.lock().unwrap_or_else(|p| p.into_inner()).take();
        for (_, handle) in self.inner.refresh_tasks.lock().unwrap_or_else(|p| p.into_inner()).drain() {
            handle.abort();
        }
        self.inner.events.publish(Event::ShutdownCompleted);
        Ok(())
    }

    fn ensure_not_shut_down(&self) -> Result<(), CoreError> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(CoreError::AlreadyShutdown);
        }
        Ok(())
    }

    /// Probes up to [`MAX_PARALLEL_LOADERS`] seeds concurrently, refilling
    /// the pool as attempts fail, until one succeeds or every seed has been
    /// tried (§4.5).
    async fn bootstrap_probe(&self, bucket: &str) -> Result<LoadedConfig, CoreError> {
        let mut remaining = self.inner.seeds.iter();
        let mut attempted = 0usize;
        let mut in_flight = FuturesUnordered::new();

        for node in remaining.by_ref().take(MAX_PARALLEL_LOADERS) {
            attempted += 1;
            in_flight.push(self.load_one(node.clone(), bucket.to_string()));
        }

        while let Some(result) = in_flight.next().await {
            match result {
                Ok(loaded) => return Ok(loaded),
                Err(_) => {
                    if let Some(node) = remaining.next() {
                        attempted += 1;
                        in_flight.push(self.load_one(node.clone(), bucket.to_string()));
                    }
                }
            }
        }

        Err(CoreError::Config(ConfigError::BootstrapExhausted { attempted }))
    }

    async fn load_one(&self, node: NodeIdentifier, bucket: String) -> Result<LoadedConfig, ConfigError> {
        let bytes = self.inner.loader.load(&node, &bucket, self.inner.use_tls).await?;
        Ok(LoadedConfig { bytes, origin: node.host })
    }

    fn spawn_refresher(&self, bucket: String) {
        let Some(seed) = self.inner.seeds.first().cloned() else { return };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let refresher = self.inner.refresher.clone();
        let origin_host = seed.host.clone();
        let provider = self.clone();
        let bucket_for_watch = bucket.clone();

        let handle = tokio::spawn(async move {
            let watch = refresher.watch(seed, bucket_for_watch, tx);
            tokio::pin!(watch);
            loop {
                tokio::select! {
                    _ = &mut watch => break,
                    raw = rx.recv() => {
                        match raw {
                            Some(raw) => {
                                let _ = provider.propose_bucket_config(&raw, &origin_host).await;
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        self.inner.refresh_tasks.lock().unwrap_or_else(|p| p.into_inner()).insert(bucket, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FlakySeedLoader {
        fail_hosts: Vec<String>,
        json: &'static str,
    }

    #[async_trait]
    impl ConfigLoader for FlakySeedLoader {
        async fn load(&self, node: &NodeIdentifier, _bucket: &str, _use_tls: bool) -> Result<Vec<u8>, ConfigError> {
            if self.fail_hosts.contains(&node.host) {
                return Err(ConfigError::BootstrapExhausted { attempted: 1 });
            }
            Ok(self.json.as_bytes().to_vec())
        }
    }

    struct NeverRefresher;

    #[async_trait]
    impl ConfigRefresher for NeverRefresher {
        async fn watch(&self, _node: NodeIdentifier, _bucket: String, _sink: mpsc::UnboundedSender<Vec<u8>>) {
            std::future::pending::<()>().await
        }
    }

    const SAMPLE_CONFIG: &str = r#"{
        "rev": 1,
        "uuid": "u",
        "name": "default",
        "bucketCapabilities": ["couchapi"],
        "nodesExt": [{"hostname": "10.0.0.1", "services": {"kv": 11210, "mgmt": 8091}}],
        "vBucketServerMap": {"serverList": ["10.0.0.1:11210"], "vBucketMap": [[0, -1]]}
    }"#;

    fn seeds(hosts: &[&str]) -> Vec<NodeIdentifier> {
        hosts.iter().map(|h| NodeIdentifier::new(*h, 8091)).collect()
    }

    #[tokio::test]
    async fn bootstrap_falls_through_to_a_later_seed_on_failure() {
        let loader =
            Arc::new(FlakySeedLoader { fail_hosts: vec!["10.0.0.1".into()], json: SAMPLE_CONFIG });
        let provider = ConfigProvider::new(
            seeds(&["10.0.0.1", "10.0.0.2"]),
            false,
            loader,
            Arc::new(NeverRefresher),
            EventBus::noop(),
        );
        provider.open_bucket("default").await.unwrap();
        assert!(provider.current().has_bucket("default"));
    }

    #[tokio::test]
    async fn bootstrap_exhausted_when_every_seed_fails() {
        let loader = Arc::new(FlakySeedLoader {
            fail_hosts: vec!["10.0.0.1".into(), "10.0.0.2".into()],
            json: SAMPLE_CONFIG,
        });
        let provider = ConfigProvider::new(
            seeds(&["10.0.0.1", "10.0.0.2"]),
            false,
            loader,
            Arc::new(NeverRefresher),
            EventBus::noop(),
        );
        let err = provider.open_bucket("default").await.unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::BootstrapExhausted { attempted: 2 })));
    }

    #[tokio::test]
    async fn open_bucket_is_idempotent() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();
        provider.open_bucket("default").await.unwrap();
        assert!(provider.current().has_bucket("default"));
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();
        let err = provider.propose_bucket_config(SAMPLE_CONFIG.as_bytes(), "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::OldOrSameRevision { .. })));
    }

    #[tokio::test]
    async fn close_bucket_removes_it_and_is_not_idempotent() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();
        provider.close_bucket("default").unwrap();
        assert!(!provider.current().has_bucket("default"));
        let err = provider.close_bucket("default").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::NoSuchBucket(_))));
    }

    #[tokio::test]
    async fn subscribe_replays_the_latest_snapshot_to_a_late_subscriber() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let mut late_subscriber = provider.subscribe();
        let replayed = late_subscriber.recv().await.unwrap();
        assert!(replayed.has_bucket("default"));
    }

    #[tokio::test]
    async fn shutdown_is_not_idempotent() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.shutdown().unwrap();
        let err = provider.shutdown().unwrap_err();
        assert!(matches!(err, CoreError::AlreadyShutdown));
        let err = provider.open_bucket("default").await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyShutdown));
    }

    #[tokio::test]
    async fn shutdown_closes_every_open_bucket_and_publishes_an_empty_config() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();
        assert!(provider.current().has_bucket("default"));

        provider.shutdown().unwrap();
        assert!(provider.current().is_empty());
    }

    #[tokio::test]
    async fn shutdown_completes_the_subscriber_stream() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let mut stream = provider.subscribe();
        stream.recv().await.unwrap(); // replayed snapshot

        provider.shutdown().unwrap();
        let final_snapshot = stream.recv().await.unwrap();
        assert!(final_snapshot.is_empty());
        assert!(matches!(stream.recv().await, Err(broadcast::error::RecvError::Closed)));
    }

    #[tokio::test]
    async fn a_late_subscriber_after_shutdown_sees_the_final_snapshot_then_closes() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();
        provider.shutdown().unwrap();

        let mut late = provider.subscribe();
        let replayed = late.recv().await.unwrap();
        assert!(replayed.is_empty());
        assert!(matches!(late.recv().await, Err(broadcast::error::RecvError::Closed)));
    }

    struct FakeManifestLoader {
        response: ManifestResponse,
    }

    #[async_trait]
    impl CollectionManifestLoader for FakeManifestLoader {
        async fn fetch(&self, _bucket: &str) -> Result<ManifestResponse, CoreError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn refresh_collection_map_applies_a_successful_manifest() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let manifest_loader =
            FakeManifestLoader { response: ManifestResponse::Applied { uid: "1".into(), entries: vec![("tenant".into(), "orders".into(), 9)] } };
        provider.refresh_collection_map("default", false, &manifest_loader).await.unwrap();

        let cache = provider.collections_for("default");
        assert_eq!(cache.resolve("tenant", "orders").unwrap(), 9);
    }

    #[tokio::test]
    async fn refresh_collection_map_unknown_response_is_not_available() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let manifest_loader = FakeManifestLoader { response: ManifestResponse::Unknown };
        let err = provider.refresh_collection_map("default", false, &manifest_loader).await.unwrap_err();
        assert!(matches!(err, CoreError::CollectionsNotAvailable));
    }

    #[tokio::test]
    async fn refresh_collection_map_other_response_wraps_the_status() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let manifest_loader = FakeManifestLoader { response: ManifestResponse::Other { status: "503".into() } };
        let err = provider.refresh_collection_map("default", false, &manifest_loader).await.unwrap_err();
        assert!(matches!(err, CoreError::Dispatch(_)));
    }

    #[tokio::test]
    async fn refresh_collection_map_skips_a_redundant_request_unless_forced() {
        let loader = Arc::new(FlakySeedLoader { fail_hosts: vec![], json: SAMPLE_CONFIG });
        let provider =
            ConfigProvider::new(seeds(&["10.0.0.1"]), false, loader, Arc::new(NeverRefresher), EventBus::noop());
        provider.open_bucket("default").await.unwrap();

        let first = FakeManifestLoader {
            response: ManifestResponse::Applied { uid: "1".into(), entries: vec![("tenant".into(), "orders".into(), 9)] },
        };
        provider.refresh_collection_map("default", false, &first).await.unwrap();

        // A second, non-forced call against a loader that would fail must
        // not even be consulted: the cache already holds a manifest.
        let would_fail = FakeManifestLoader { response: ManifestResponse::Unknown };
        provider.refresh_collection_map("default", false, &would_fail).await.unwrap();
        assert_eq!(provider.collections_for("default").current_uid().as_deref(), Some("1"));

        // Forcing re-issues the request even though a manifest is cached.
        let err = provider.refresh_collection_map("default", true, &would_fail).await.unwrap_err();
        assert!(matches!(err, CoreError::CollectionsNotAvailable));
    }
}
