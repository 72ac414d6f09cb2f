//! Config refresh collaborator (§4.5, §6): an ongoing subscription for
//! config pushes from an already-open bucket, feeding the provider's
//! multi-source fan-in alongside the bootstrap loader.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::NodeIdentifier;

/// Streams raw bucket-config documents from `node` until cancelled or the
/// underlying subscription ends. An external collaborator (§6): this crate
/// only fixes the shape of the feed.
///
/// `watch` doubles as `register`: the provider spawns one watch task per
/// open bucket and aborts it on `closeBucket`, which is `deregister` for
/// anything the task itself owns; `deregister` below is for state the
/// refresher keeps outside that task. `mark_tainted`/`mark_untainted` let
/// the provider tell a refresher a bucket is mid-rebalance so it can poll
/// faster (§4.6, §6). All three default to no-ops: a refresher that doesn't
/// vary its cadence, or keeps nothing outside the watch task, need not
/// override them.
#[async_trait]
pub trait ConfigRefresher: Send + Sync {
    async fn watch(&self, node: NodeIdentifier, bucket: String, sink: mpsc::UnboundedSender<Vec<u8>>);

    /// Marks `bucket` tainted: a rebalance is in progress, so this
    /// refresher should poll faster for that bucket (§4.6).
    async fn mark_tainted(&self, _bucket: &str) {}

    /// Marks `bucket` untainted, reverting to normal-cadence polling (§4.6).
    async fn mark_untainted(&self, _bucket: &str) {}

    /// Releases any resources this refresher holds for `bucket` beyond the
    /// `watch` task the provider already aborts (§6 - "deregister").
    async fn deregister(&self, _bucket: &str) {}
}
