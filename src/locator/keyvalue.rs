//! Key-value locator (C5, §4.4): hashes a document key onto a partition and
//! resolves the partition's master or a requested replica.

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::config::BucketConfig;
use crate::types::NodeIdentifier;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Hashes `key` onto one of `num_partitions` partitions (§4.4 -
/// `crc32(key) & (P-1)`). Partition counts are powers of two in practice
/// (1024 is typical); the modulo fallback keeps this correct for any count
/// without re-deriving the mask.
pub fn partition_for_key(key: &[u8], num_partitions: usize) -> usize {
    let hash = CRC32.checksum(key);
    if num_partitions.is_power_of_two() {
        (hash as usize) & (num_partitions - 1)
    } else {
        (hash as usize) % num_partitions
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueLocator;

impl KeyValueLocator {
    /// Resolves `key`'s master (or `replica_index`'th replica) within
    /// `bucket`, honoring the fast-forward map when requested and present
    /// (§4.4).
    pub fn locate(
        &self,
        bucket: &BucketConfig,
        key: &[u8],
        replica_index: Option<usize>,
        use_fast_forward: bool,
    ) -> Option<NodeIdentifier> {
        let num_partitions = bucket.number_of_partitions()?;
        let partition = partition_for_key(key, num_partitions);
        let node = match replica_index {
            Some(replica) => bucket.node_for_replica(partition, replica, use_fast_forward),
            None => bucket.node_for_partition(partition, use_fast_forward),
        }?;
        Some(node.identifier.clone())
    }
}
