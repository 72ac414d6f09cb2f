//! Scenario-level integration tests against the literal properties listed
//! in the core's testable-properties section: bootstrap, revision
//! regression, node removal, TLS toggle, key-value dispatch, and concurrent
//! reconfigures.

use std::sync::Arc;
use std::time::Duration;

use cluster_core::prelude::*;
use cluster_core::test_support::{FakeConfigLoader, FakeTransportFactory, ManualConfigRefresher};
use cluster_core::events::Event;

fn seed(host: &str) -> Vec<NodeIdentifier> {
    vec![NodeIdentifier::new(host, 8091)]
}

fn partitioned_config(rev: i64, host: &str) -> String {
    format!(
        r#"{{
            "rev": {rev},
            "uuid": "u",
            "name": "b",
            "bucketCapabilities": ["couchapi"],
            "nodesExt": [{{"hostname": "{host}", "services": {{"kv": 11210, "mgmt": 8091}}}}],
            "vBucketServerMap": {{"serverList": ["{host}:11210"], "vBucketMap": [[0, -1]]}}
        }}"#
    )
}

fn tls_config(rev: i64, host: &str) -> String {
    format!(
        r#"{{
            "rev": {rev},
            "uuid": "u",
            "name": "b",
            "bucketCapabilities": ["couchapi"],
            "nodesExt": [{{"hostname": "{host}", "services": {{}}, "servicesTls": {{"kv": 11207, "mgmt": 18091}}}}],
            "vBucketServerMap": {{"serverList": ["{host}:11210"], "vBucketMap": [[0, -1]]}}
        }}"#
    )
}

fn two_node_config(rev: i64, hosts: &[&str]) -> String {
    let nodes_ext: Vec<String> = hosts
        .iter()
        .map(|h| format!(r#"{{"hostname": "{h}", "services": {{"kv": 11210, "mgmt": 8091}}}}"#))
        .collect();
    let server_list: Vec<String> = hosts.iter().map(|h| format!("\"{h}:11210\"")).collect();
    format!(
        r#"{{
            "rev": {rev},
            "uuid": "u",
            "name": "b",
            "bucketCapabilities": ["couchapi"],
            "nodesExt": [{}],
            "vBucketServerMap": {{"serverList": [{}], "vBucketMap": [[0, -1]]}}
        }}"#,
        nodes_ext.join(","),
        server_list.join(",")
    )
}

struct EchoRequest {
    key: String,
    result: std::sync::Arc<std::sync::Mutex<Option<Result<Vec<u8>, CoreError>>>>,
}

impl Request for EchoRequest {
    fn service_type(&self) -> ServiceType {
        ServiceType::KeyValue
    }
    fn routing_key(&self) -> RoutingKey {
        RoutingKey::key_value("b", self.key.as_bytes())
    }
    fn encode(&self) -> Vec<u8> {
        self.key.clone().into_bytes()
    }
    fn complete(&mut self, result: Result<Vec<u8>, CoreError>) {
        *self.result.lock().unwrap() = Some(result);
    }
    fn cancel(&mut self, reason: CancelReason) {
        *self.result.lock().unwrap() = Some(Err(CoreError::Dispatch(reason.to_string())));
    }
}

/// Scenario 1: bootstrap, single node, single bucket.
#[tokio::test]
async fn bootstrap_single_node_single_bucket() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", partitioned_config(1, "10.0.0.1"));

    let core = Core::new(
        seed("10.0.0.1"),
        false,
        loader,
        Arc::new(ManualConfigRefresher::new()),
        Arc::new(FakeTransportFactory::new()),
        Arc::new(InstantSleeper),
        CircuitBreakerConfig::default(),
        Arc::new(NoRetryOrchestrator),
        Arc::new(TokioTimer),
        Duration::from_secs(30),
        EventBus::noop(),
    );

    core.open_bucket("b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let cfg = core.current_config();
    assert!(cfg.has_bucket("b"));
    let bucket = cfg.bucket("b").unwrap();
    assert_eq!(bucket.nodes.len(), 1);
    assert_eq!(bucket.nodes[0].identifier.host, "10.0.0.1");
}

/// Scenario 2: revision regression is ignored and leaves the applied
/// revision untouched.
#[tokio::test]
async fn revision_regression_is_ignored() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", partitioned_config(7, "10.0.0.1"));

    let recorder = RecordingSink::new();
    let provider = ConfigProvider::new(seed("10.0.0.1"), false, loader, Arc::new(ManualConfigRefresher::new()), recorder.bus());
    provider.open_bucket("b").await.unwrap();
    assert_eq!(provider.current().bucket("b").unwrap().revision, 7);

    let stale = partitioned_config(5, "10.0.0.1");
    let result = provider.propose_bucket_config(stale.as_bytes(), "10.0.0.1").await;
    assert!(result.is_err());

    assert_eq!(provider.current().bucket("b").unwrap().revision, 7);
    let ignored = recorder.count_matching(|e| {
        matches!(e, Event::ConfigIgnored { reason: cluster_core::events::ConfigIgnoredReason::OldOrSameRevision, .. })
    });
    assert_eq!(ignored, 1);
}

/// Scenario 3: removing a node from the published config disconnects it
/// and shrinks the managed node set.
#[tokio::test]
async fn node_removal_disconnects_and_shrinks_managed_set() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", two_node_config(1, &["10.0.0.1", "10.0.0.2"]));
    let refresher = Arc::new(ManualConfigRefresher::new());
    let recorder = RecordingSink::new();

    let core = Core::new(
        seed("10.0.0.1"),
        false,
        loader,
        refresher.clone(),
        Arc::new(FakeTransportFactory::new()),
        Arc::new(InstantSleeper),
        CircuitBreakerConfig::default(),
        Arc::new(NoRetryOrchestrator),
        Arc::new(TokioTimer),
        Duration::from_secs(30),
        recorder.bus(),
    );
    core.open_bucket("b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(core.current_config().bucket("b").unwrap().nodes.len(), 2);

    refresher.push(two_node_config(2, &["10.0.0.1"]).into_bytes());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let cfg = core.current_config();
    assert_eq!(cfg.bucket("b").unwrap().nodes.len(), 1);
    assert_eq!(cfg.bucket("b").unwrap().nodes[0].identifier.host, "10.0.0.1");
    assert!(recorder.count_matching(|e| matches!(e, Event::ReconfigurationCompleted)) >= 1);
}

/// Scenario 4: with TLS enabled and only `servicesTls` populated, the
/// key-value service is ensured at the TLS port, never the plaintext one.
#[tokio::test]
async fn tls_toggle_uses_the_tls_port_only() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", tls_config(1, "10.0.0.1"));
    let transport = Arc::new(FakeTransportFactory::new());

    let core = Core::new(
        seed("10.0.0.1"),
        true,
        loader,
        Arc::new(ManualConfigRefresher::new()),
        transport,
        Arc::new(InstantSleeper),
        CircuitBreakerConfig::default(),
        Arc::new(NoRetryOrchestrator),
        Arc::new(TokioTimer),
        Duration::from_secs(30),
        EventBus::noop(),
    );
    core.open_bucket("b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let cfg = core.current_config();
    let bucket = cfg.bucket("b").unwrap();
    let node_info = &bucket.nodes[0];
    assert_eq!(node_info.ports.port_for(ServiceType::KeyValue, true), Some(11207));
    assert_eq!(node_info.ports.port_for(ServiceType::KeyValue, false), None);
}

/// Scenario 5: a key-value request for a known key resolves through the
/// locator onto the bootstrapped node's KV service and completes.
#[tokio::test]
async fn key_value_dispatch_resolves_and_completes() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", partitioned_config(1, "10.0.0.1"));

    let core = Core::new(
        seed("10.0.0.1"),
        false,
        loader,
        Arc::new(ManualConfigRefresher::new()),
        Arc::new(FakeTransportFactory::new()),
        Arc::new(InstantSleeper),
        CircuitBreakerConfig::default(),
        Arc::new(NoRetryOrchestrator),
        Arc::new(TokioTimer),
        Duration::from_secs(30),
        EventBus::noop(),
    );
    core.open_bucket("b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = Arc::new(std::sync::Mutex::new(None));
    let request = Box::new(EchoRequest { key: "k".to_string(), result: result.clone() });
    core.send(request).await;

    let outcome = result.lock().unwrap().take().expect("request completed");
    assert!(outcome.is_ok(), "expected dispatch to succeed, got {outcome:?}");
}

/// Scenario 6: three configs published within ~1ms of each other collapse
/// into at most two `reconcile` runs, and the final state matches the last
/// config published.
#[tokio::test]
async fn concurrent_reconfigures_collapse_to_the_latest_snapshot() {
    let loader = Arc::new(FakeConfigLoader::new());
    loader.respond("10.0.0.1", partitioned_config(1, "10.0.0.1"));
    let refresher = Arc::new(ManualConfigRefresher::new());
    let recorder = RecordingSink::new();

    let core = Core::new(
        seed("10.0.0.1"),
        false,
        loader,
        refresher.clone(),
        Arc::new(FakeTransportFactory::new()),
        Arc::new(InstantSleeper),
        CircuitBreakerConfig::default(),
        Arc::new(NoRetryOrchestrator),
        Arc::new(TokioTimer),
        Duration::from_secs(30),
        recorder.bus(),
    );
    core.open_bucket("b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let c2 = two_node_config(2, &["10.0.0.1", "10.0.0.2"]);
    let c3 = two_node_config(3, &["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    refresher.push(c2.into_bytes());
    refresher.push(c3.into_bytes());

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(core.current_config().bucket("b").unwrap().revision, 3);
    assert_eq!(core.current_config().bucket("b").unwrap().nodes.len(), 3);
    assert!(recorder.count_matching(|e| matches!(e, Event::ReconfigurationCompleted)) >= 1);
}
