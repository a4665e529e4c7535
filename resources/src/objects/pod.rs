use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Utilization one pod gets out of one GPU.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodGpu {
    pub id: String,
    pub utilization: f64,
}

/// GPU usage of one pod, built from the pod-scoped utilization query.
/// Records are keyed by pod name and node together, so equally named
/// pods on different nodes stay apart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodRecord {
    pub name: String,
    pub node: String,
    pub gpus: BTreeMap<String, PodGpu>,
}

impl PodRecord {
    pub fn new(name: String, node: String) -> Self {
        PodRecord {
            name,
            node,
            gpus: BTreeMap::new(),
        }
    }
}
