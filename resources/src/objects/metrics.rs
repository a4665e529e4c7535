use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Candidate label names carrying the node identity of a series,
/// in resolution order.
const NODE_LABELS: [&str; 2] = ["node", "instance"];
/// Candidate label names carrying the GPU index. Exporters disagree on
/// the case of this label, and the names are matched case-sensitively.
const GPU_LABELS: [&str; 2] = ["gpu", "GPU"];
/// Candidate label names carrying the pod a series is attributed to.
const POD_LABELS: [&str; 2] = ["pod", "kubernetes_pod_name"];

/// One data point of an instant query: the label set of the series plus
/// the sample value as the backend returned it (a numeric string).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Sample {
    pub labels: HashMap<String, String>,
    pub timestamp: f64,
    pub value: String,
}

impl Sample {
    /// Sample value parsed as a number, `0` when it does not parse.
    pub fn number(&self) -> f64 {
        self.value.parse().unwrap_or(0.0)
    }

    /// Node the sample belongs to, `"unknown"` when the series carries
    /// no node label. Not guaranteed unique across backends with
    /// inconsistent labeling.
    pub fn node_key(&self) -> String {
        self.resolve(&NODE_LABELS, "unknown")
    }

    /// GPU index within the node, `"0"` when unlabeled.
    pub fn gpu_key(&self) -> String {
        self.resolve(&GPU_LABELS, "0")
    }

    /// Name of the pod the sample is attributed to.
    pub fn pod_name(&self) -> String {
        self.resolve(&POD_LABELS, "unknown")
    }

    fn resolve(&self, candidates: &[&str], fallback: &str) -> String {
        candidates
            .iter()
            .find_map(|name| self.labels.get(*name))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(labels: &[(&str, &str)], value: &str) -> Sample {
        Sample {
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timestamp: 1700000000.0,
            value: value.to_string(),
        }
    }

    #[test]
    fn node_key_prefers_node_over_instance() {
        let s = sample(&[("node", "n1"), ("instance", "10.0.0.1:9400")], "1");
        assert_eq!(s.node_key(), "n1");
        let s = sample(&[("instance", "10.0.0.1:9400")], "1");
        assert_eq!(s.node_key(), "10.0.0.1:9400");
    }

    #[test]
    fn node_key_falls_back_to_unknown() {
        let s = sample(&[("gpu", "0")], "1");
        assert_eq!(s.node_key(), "unknown");
    }

    #[test]
    fn gpu_key_is_case_sensitive() {
        let s = sample(&[("GPU", "3")], "1");
        assert_eq!(s.gpu_key(), "3");
        let s = sample(&[("gpu", "1"), ("GPU", "3")], "1");
        assert_eq!(s.gpu_key(), "1");
        let s = sample(&[("Gpu", "3")], "1");
        assert_eq!(s.gpu_key(), "0");
    }

    #[test]
    fn pod_name_falls_back_to_unknown() {
        let s = sample(&[("kubernetes_pod_name", "train-job")], "1");
        assert_eq!(s.pod_name(), "train-job");
        let s = sample(&[("node", "n1")], "1");
        assert_eq!(s.pod_name(), "unknown");
    }

    #[test]
    fn number_defaults_to_zero() {
        assert_eq!(sample(&[], "55.2").number(), 55.2);
        assert_eq!(sample(&[], "not-a-number").number(), 0.0);
        assert_eq!(sample(&[], "").number(), 0.0);
    }
}
