//! Typed configuration model, wire parsing, and collection manifest caching
//! (C6, §3, §4.5).

pub mod collections;
pub mod model;
pub mod parse;

pub use collections::{
    decode_collection_id, encode_collection_id, CollectionManifestCache, CollectionManifestLoader,
    ManifestResponse, DEFAULT_COLLECTION_ID,
};
pub use model::{BucketConfig, ClusterConfig, NodeInfo, PartitionMap, ServicePorts, PARTITION_NOT_EXISTENT};
pub use parse::parse_bucket_config;
