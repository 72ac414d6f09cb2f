//! Parsing of raw bucket-config JSON documents into [`BucketConfig`] (§4.5,
//! §6).
//!
//! The wire shape loosely follows what a real cluster manager hands back
//! from its terse HTTP config endpoint: a bucket document naming its
//! revision, nodes, per-node service ports, and (for partitioned buckets) a
//! partition map whose master/replica entries index into a `serverList` of
//! key-value hosts rather than into the node list directly. Resolving those
//! indices onto `BucketConfig::nodes` is the bulk of what this module does.

use std::collections::HashMap;

use serde::Deserialize;

use crate::config::model::{BucketConfig, NodeInfo, PartitionMap, ServicePorts};
use crate::error::ConfigError;
use crate::types::{BucketType, Capabilities, NodeIdentifier, ServiceType};

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    rev: i64,
    #[serde(default)]
    uuid: String,
    name: String,
    #[serde(rename = "nodesExt", default)]
    nodes_ext: Vec<RawNodeExt>,
    #[serde(rename = "vBucketServerMap")]
    vbucket_server_map: Option<RawVBucketServerMap>,
    #[serde(rename = "bucketCapabilities", default)]
    bucket_capabilities: Vec<String>,
    #[serde(rename = "clusterCapabilities", default)]
    cluster_capabilities: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawNodeExt {
    hostname: Option<String>,
    #[serde(default)]
    services: HashMap<String, u16>,
    #[serde(rename = "servicesTls", default)]
    services_tls: HashMap<String, u16>,
}

#[derive(Debug, Deserialize)]
struct RawVBucketServerMap {
    #[serde(rename = "serverList")]
    server_list: Vec<String>,
    #[serde(rename = "vBucketMap")]
    vbucket_map: Vec<Vec<i32>>,
    #[serde(rename = "vBucketMapForward")]
    vbucket_map_forward: Option<Vec<Vec<i32>>>,
}

const SERVICE_WIRE_KEYS: [(&str, ServiceType); 6] = [
    ("kv", ServiceType::KeyValue),
    ("mgmt", ServiceType::Manager),
    ("query", ServiceType::Query),
    ("search", ServiceType::Search),
    ("analytics", ServiceType::Analytics),
    ("views", ServiceType::Views),
];

fn parse_failure(origin: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::ParseFailure { origin: origin.to_string(), reason: reason.into() }
}

/// Parse a bucket-config JSON document, as received from `origin_host`
/// (used to fill in nodes that omit `hostname`, per §4.5).
pub fn parse_bucket_config(json: &[u8], origin_host: &str) -> Result<BucketConfig, ConfigError> {
    let raw: RawConfig =
        serde_json::from_slice(json).map_err(|e| parse_failure(origin_host, e.to_string()))?;

    let nodes: Vec<NodeInfo> = raw
        .nodes_ext
        .iter()
        .map(|n| node_info_from_raw(n, origin_host))
        .collect::<Result<_, _>>()?;

    let tainted = raw
        .vbucket_server_map
        .as_ref()
        .map(|m| m.vbucket_map_forward.is_some())
        .unwrap_or(false);

    let bucket_type = determine_bucket_type(raw.vbucket_server_map.is_some(), &raw.bucket_capabilities);

    let partitions = match &raw.vbucket_server_map {
        Some(map) => Some(parse_partition_map(map, &nodes, origin_host)?),
        None => None,
    };

    let capabilities = Capabilities {
        bucket: raw.bucket_capabilities.into_iter().collect(),
        cluster: raw.cluster_capabilities,
    };

    Ok(BucketConfig {
        revision: raw.rev,
        uuid: raw.uuid,
        name: raw.name,
        tainted,
        bucket_type,
        nodes,
        capabilities,
        partitions,
    })
}

fn node_info_from_raw(raw: &RawNodeExt, origin_host: &str) -> Result<NodeInfo, ConfigError> {
    let host = raw.hostname.clone().unwrap_or_else(|| origin_host.to_string());
    let manager_port = raw
        .services
        .get("mgmt")
        .copied()
        .or_else(|| raw.services_tls.get("mgmt").copied())
        .ok_or_else(|| parse_failure(origin_host, format!("node {host} has no manager port")))?;

    let mut ports = ServicePorts::default();
    for (key, service) in SERVICE_WIRE_KEYS {
        let plain = raw.services.get(key).copied();
        let tls = raw.services_tls.get(key).copied();
        ports.set(service, plain, tls);
    }

    Ok(NodeInfo { identifier: NodeIdentifier::new(host, manager_port), ports })
}

/// Bucket type is read off capability markers, not an explicit field:
/// buckets without a partition map are memcache buckets; partitioned
/// buckets advertise `couchapi` when they also serve views, and are
/// otherwise ephemeral (§4.5).
fn determine_bucket_type(has_partition_map: bool, capabilities: &[String]) -> BucketType {
    if !has_partition_map {
        return BucketType::Memcache;
    }
    if capabilities.iter().any(|c| c.eq_ignore_ascii_case("couchapi")) {
        BucketType::Partitioned
    } else {
        BucketType::Ephemeral
    }
}

/// Resolves `vBucketServerMap`'s `serverList`-indexed master/replica entries
/// onto indices into `nodes`, failing if the declared host count doesn't
/// match the number of nodes actually hosting key-value (§4.5, §6).
fn parse_partition_map(
    map: &RawVBucketServerMap,
    nodes: &[NodeInfo],
    origin_host: &str,
) -> Result<PartitionMap, ConfigError> {
    let server_hosts: Vec<String> = map
        .server_list
        .iter()
        .map(|entry| parse_host_port(entry, origin_host).map(|(host, _port)| host))
        .collect::<Result<_, _>>()?;

    let kv_node_indices: Vec<usize> =
        nodes.iter().enumerate().filter(|(_, n)| n.ports.hosts(ServiceType::KeyValue)).map(|(i, _)| i).collect();

    if server_hosts.len() != kv_node_indices.len() {
        return Err(parse_failure(
            origin_host,
            format!(
                "vBucketServerMap.serverList has {} hosts but {} nodes advertise key-value",
                server_hosts.len(),
                kv_node_indices.len()
            ),
        ));
    }

    let translate = |idx: i32| -> i32 {
        if idx < 0 {
            return idx;
        }
        kv_node_indices.get(idx as usize).map(|&n| n as i32).unwrap_or(-1)
    };

    let masters = map.vbucket_map.iter().map(|row| translate(row.first().copied().unwrap_or(-1))).collect();
    let replicas = map
        .vbucket_map
        .iter()
        .map(|row| row.iter().skip(1).map(|&r| translate(r)).collect())
        .collect();

    let mut partition_map = PartitionMap::new(masters, replicas);

    if let Some(forward) = &map.vbucket_map_forward {
        let forward_masters = forward.iter().map(|row| translate(row.first().copied().unwrap_or(-1))).collect();
        let forward_replicas =
            forward.iter().map(|row| row.iter().skip(1).map(|&r| translate(r)).collect()).collect();
        partition_map.fast_forward = Some(Box::new(PartitionMap::new(forward_masters, forward_replicas)));
    }

    Ok(partition_map)
}

/// Parses a `host:port` string, honoring bracketed IPv6 literals
/// (`[::1]:11210`). A port that isn't a parseable decimal is tolerated:
/// it's logged and resolved to `0` rather than failing the whole config
/// (§4.5, §7) — the host is what `parse_partition_map` actually keys on.
fn parse_host_port(entry: &str, origin_host: &str) -> Result<(String, u16), ConfigError> {
    if let Some(rest) = entry.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| parse_failure(origin_host, format!("unterminated IPv6 literal in '{entry}'")))?;
        let host = &rest[..end];
        let after = &rest[end + 1..];
        let port = after.strip_prefix(':').unwrap_or(after);
        return Ok((host.to_string(), parse_port_or_warn(entry, port)));
    }

    let (host, port) = entry
        .rsplit_once(':')
        .ok_or_else(|| parse_failure(origin_host, format!("missing port in '{entry}'")))?;
    Ok((host.to_string(), parse_port_or_warn(entry, port)))
}

fn parse_port_or_warn(entry: &str, port: &str) -> u16 {
    port.parse::<u16>().unwrap_or_else(|_| {
        tracing::warn!(entry, port, "unparseable port in serverList entry, defaulting to 0");
        0
    })
}
