//! Collection manifest cache: `(scope, collection) -> collection-id` (§4.5,
//! §6).
//!
//! Collection IDs are carried on the wire as unsigned LEB128, matching the
//! varint encoding a key-value protocol frame header actually uses for this
//! field, so callers building request frames get the encoded bytes directly
//! rather than re-deriving them.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CoreError;

/// Outcome of a manifest request (§4.6): a collections-capable cluster
/// returns the current manifest, an older cluster reports collections are
/// unknown to it, and anything else is a transport/protocol-level failure
/// the caller wraps.
#[derive(Debug, Clone)]
pub enum ManifestResponse {
    /// A manifest was returned: its uid plus `(scope, collection, id)`
    /// entries.
    Applied { uid: String, entries: Vec<(String, String, u32)> },
    /// The server doesn't support collections.
    Unknown,
    /// Any other non-success response, carrying its status for the wrapped
    /// error.
    Other { status: String },
}

/// Fetches a bucket's collection manifest on demand (§4.6). An external
/// collaborator: this crate only fixes the shape of the request/response,
/// the caller supplies the actual key-value/manager protocol client.
#[async_trait]
pub trait CollectionManifestLoader: Send + Sync {
    async fn fetch(&self, bucket: &str) -> Result<ManifestResponse, CoreError>;
}

/// Default collection within the default scope always exists and is id 0,
/// even on a cluster predating the collections feature.
pub const DEFAULT_COLLECTION_ID: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Manifest {
    /// Hex-encoded manifest uid, as returned by the server (§4.5).
    uid: String,
    ids: HashMap<(String, String), u32>,
}

/// Per-bucket cache of the collections manifest, refreshed on demand by a
/// caller-supplied loader (§4.5).
#[derive(Debug, Default)]
pub struct CollectionManifestCache {
    manifest: RwLock<Option<Manifest>>,
}

impl CollectionManifestCache {
    pub fn new() -> Self {
        Self { manifest: RwLock::new(None) }
    }

    /// Looks up `scope.collection`'s id. Returns
    /// [`CoreError::CollectionsNotAvailable`] if no manifest has ever been
    /// loaded (§4.5, §7: UNKNOWN collection maps to this error).
    pub fn resolve(&self, scope: &str, collection: &str) -> Result<u32, CoreError> {
        if scope == "_default" && collection == "_default" {
            return Ok(DEFAULT_COLLECTION_ID);
        }
        let guard = self.manifest.read().unwrap_or_else(|p| p.into_inner());
        let manifest = guard.as_ref().ok_or(CoreError::CollectionsNotAvailable)?;
        manifest
            .ids
            .get(&(scope.to_string(), collection.to_string()))
            .copied()
            .ok_or(CoreError::CollectionsNotAvailable)
    }

    /// The currently cached manifest uid, if any manifest has been applied.
    pub fn current_uid(&self) -> Option<String> {
        self.manifest.read().unwrap_or_else(|p| p.into_inner()).as_ref().map(|m| m.uid.clone())
    }

    /// Applies a freshly loaded manifest, replacing whatever was cached.
    pub fn apply(&self, uid: String, entries: Vec<(String, String, u32)>) {
        let ids = entries.into_iter().map(|(scope, collection, id)| ((scope, collection), id)).collect();
        let mut guard = self.manifest.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Manifest { uid, ids });
    }
}

/// Encodes a collection id as unsigned LEB128, the wire form a request frame
/// builder embeds in its key (§4.5).
pub fn encode_collection_id(id: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    leb128::write::unsigned(&mut buf, id as u64).expect("writing to a Vec<u8> cannot fail");
    buf
}

/// Decodes a previously LEB128-encoded collection id, failing if the bytes
/// don't decode cleanly (a malformed server response, per §6 -
/// `CollectionMapDecodingFailed`).
pub fn decode_collection_id(mut bytes: &[u8]) -> Result<u32, CoreError> {
    leb128::read::unsigned(&mut bytes)
        .map_err(|e| CoreError::Dispatch(format!("malformed collection id: {e}")))
        .and_then(|v| u32::try_from(v).map_err(|_| CoreError::Dispatch("collection id out of range".into())))
}
