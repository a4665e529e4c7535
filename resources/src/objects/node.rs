use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Live telemetry of one GPU on a node.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GpuMetrics {
    pub id: String,
    /// GPU utilization in percent.
    pub utilization: f64,
    /// Framebuffer memory in use, as reported by the exporter.
    pub memory_used: f64,
    pub memory_total: f64,
    /// Power draw in watts.
    pub power: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeState {
    Online,
    Offline,
}

/// One GPU node. A node exists only if at least one of its GPUs reported
/// utilization, so nothing currently produces `Offline`; nodes without
/// samples are simply not listed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub name: String,
    pub status: NodeState,
    /// Per-GPU telemetry, keyed by GPU id.
    pub gpus: BTreeMap<String, GpuMetrics>,
}

impl NodeRecord {
    pub fn new(name: String) -> Self {
        NodeRecord {
            name,
            status: NodeState::Online,
            gpus: BTreeMap::new(),
        }
    }

    /// Mean utilization across the node's GPUs, `0` for an empty node.
    pub fn average_utilization(&self) -> f64 {
        if self.gpus.is_empty() {
            return 0.0;
        }
        self.gpus.values().map(|gpu| gpu.utilization).sum::<f64>() / self.gpus.len() as f64
    }
}
