//! Merges flat instant-query results into the per-node, per-pod and
//! per-hardware record sets served by the dashboard.

use std::collections::HashMap;

use resources::objects::{
    hardware::{HardwareField, HardwareGpuRecord, HardwareNodeRecord},
    metrics::Sample,
    node::{GpuMetrics, NodeRecord},
    pod::{PodGpu, PodRecord},
};

/// Query results of the six node telemetry families.
#[derive(Debug, Default)]
pub struct NodeSamples {
    pub utilization: Vec<Sample>,
    /// Polled together with the others but not folded into any field.
    /// TODO: surface memory-copy utilization once the node card grows a
    /// column for it.
    pub mem_copy_utilization: Vec<Sample>,
    pub memory_used: Vec<Sample>,
    pub memory_total: Vec<Sample>,
    pub power: Vec<Sample>,
    pub temperature: Vec<Sample>,
}

/// Query results of the inventory families.
#[derive(Debug, Default)]
pub struct HardwareSamples {
    pub device_name: Vec<Sample>,
    pub driver_version: Vec<Sample>,
    pub nvml_version: Vec<Sample>,
    /// Polled for parity with the node telemetry set but not surfaced
    /// on any record field.
    pub minor_number: Vec<Sample>,
    pub oem_inforom_version: Vec<Sample>,
    /// One sample set per mapped inventory field.
    pub fields: Vec<(HardwareField, Vec<Sample>)>,
}

/// Merge the node telemetry families into per-node records, in order of
/// first appearance.
///
/// The utilization family decides which nodes and GPUs exist; the other
/// families only fill fields of GPUs seeded there, each family writing
/// one disjoint field. A sample for a GPU that never reported
/// utilization is dropped.
pub fn aggregate_nodes(samples: &NodeSamples) -> Vec<NodeRecord> {
    let mut nodes: Vec<NodeRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    // Seed nodes and GPUs from GPU utilization
    for sample in &samples.utilization {
        let node = sample.node_key();
        let gpu = sample.gpu_key();
        let i = *index.entry(node.clone()).or_insert_with(|| {
            nodes.push(NodeRecord::new(node));
            nodes.len() - 1
        });
        nodes[i].gpus.insert(
            gpu.clone(),
            GpuMetrics {
                id: gpu,
                utilization: sample.number(),
                ..GpuMetrics::default()
            },
        );
    }

    // Fold the dependent families over the seeded index
    apply_family(&mut nodes, &index, &samples.memory_used, |gpu, value| {
        gpu.memory_used = value
    });
    apply_family(&mut nodes, &index, &samples.memory_total, |gpu, value| {
        gpu.memory_total = value
    });
    apply_family(&mut nodes, &index, &samples.power, |gpu, value| {
        gpu.power = value
    });
    apply_family(&mut nodes, &index, &samples.temperature, |gpu, value| {
        gpu.temperature = value
    });

    nodes
}

fn apply_family<F>(
    nodes: &mut [NodeRecord],
    index: &HashMap<String, usize>,
    samples: &[Sample],
    write: F,
) where
    F: Fn(&mut GpuMetrics, f64),
{
    for sample in samples {
        let node = sample.node_key();
        let gpu = sample.gpu_key();
        let metrics = match index.get(&node) {
            Some(&i) => nodes[i].gpus.get_mut(&gpu),
            None => None,
        };
        match metrics {
            Some(metrics) => write(metrics, sample.number()),
            None => tracing::debug!("Dropping sample for unseeded GPU {} on {}", gpu, node),
        }
    }
}

/// Fold the pod-scoped utilization samples into per-pod records, in
/// order of first appearance.
pub fn aggregate_pods(samples: &[Sample]) -> Vec<PodRecord> {
    let mut pods: Vec<PodRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for sample in samples {
        let name = sample.pod_name();
        let node = sample.node_key();
        let gpu = sample.gpu_key();
        let key = format!("{}-{}", name, node);
        let i = *index.entry(key).or_insert_with(|| {
            pods.push(PodRecord::new(name, node));
            pods.len() - 1
        });
        pods[i].gpus.insert(
            gpu.clone(),
            PodGpu {
                id: gpu,
                utilization: sample.number(),
            },
        );
    }

    pods
}

/// Merge the inventory families into per-node hardware records. The
/// device-name family decides which GPUs are visible, mirroring how the
/// utilization family seeds the telemetry records.
pub fn aggregate_hardware(samples: &HardwareSamples) -> Vec<HardwareNodeRecord> {
    let mut nodes: Vec<HardwareNodeRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    // Seed from device names
    for sample in &samples.device_name {
        let node = sample.node_key();
        let gpu = sample.gpu_key();
        let name = if sample.value.is_empty() {
            "Unknown GPU".to_string()
        } else {
            sample.value.clone()
        };
        let i = *index.entry(node.clone()).or_insert_with(|| {
            nodes.push(HardwareNodeRecord::new(node));
            nodes.len() - 1
        });
        nodes[i]
            .gpus
            .insert(gpu.clone(), HardwareGpuRecord::new(gpu, name));
    }

    // Apply the mapped families over the seeded index
    for (field, field_samples) in &samples.fields {
        for sample in field_samples {
            let node = sample.node_key();
            let gpu = sample.gpu_key();
            let record = match index.get(&node) {
                Some(&i) => nodes[i].gpus.get_mut(&gpu),
                None => None,
            };
            match record {
                Some(record) => record.set(*field, &sample.value),
                None => {
                    tracing::debug!(
                        "Dropping {:?} sample for unseeded GPU {} on {}",
                        field,
                        gpu,
                        node
                    )
                },
            }
        }
    }

    // Driver and NVML versions are node-scoped
    for sample in &samples.driver_version {
        if let Some(&i) = index.get(&sample.node_key()) {
            nodes[i].driver_version = sample.value.clone();
        }
    }
    for sample in &samples.nvml_version {
        if let Some(&i) = index.get(&sample.node_key()) {
            nodes[i].nvml_version = sample.value.clone();
        }
    }

    nodes
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
    fn utilization_seeds_nodes_and_defaults_other_fields() {
        let samples = NodeSamples {
            utilization: vec![sample(&[("node", "n1"), ("gpu", "0")], "55.2")],
            ..NodeSamples::default()
        };
        let nodes = aggregate_nodes(&samples);

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "n1");
        assert_eq!(nodes[0].status.to_string(), "online");
        let gpu = &nodes[0].gpus["0"];
        assert_eq!(gpu.id, "0");
        assert_eq!(gpu.utilization, 55.2);
        assert_eq!(gpu.memory_used, 0.0);
        assert_eq!(gpu.memory_total, 0.0);
        assert_eq!(gpu.power, 0.0);
        assert_eq!(gpu.temperature, 0.0);
    }

    #[test]
    fn samples_for_unseeded_gpus_are_dropped() {
        let samples = NodeSamples {
            utilization: vec![sample(&[("node", "n1"), ("gpu", "0")], "80")],
            power: vec![
                sample(&[("node", "n1"), ("gpu", "3")], "250"),
                sample(&[("node", "n2"), ("gpu", "0")], "250"),
            ],
            ..NodeSamples::default()
        };
        let nodes = aggregate_nodes(&samples);

        assert_eq!(nodes.len(), 1);
        assert!(!nodes[0].gpus.contains_key("3"));
        assert_eq!(nodes[0].gpus["0"].power, 0.0);
    }

    #[test]
    fn dependent_families_fill_seeded_gpus() {
        let samples = NodeSamples {
            utilization: vec![sample(&[("node", "n1"), ("gpu", "0")], "80")],
            memory_used: vec![sample(&[("node", "n1"), ("gpu", "0")], "1000")],
            memory_total: vec![sample(&[("node", "n1"), ("gpu", "0")], "2000")],
            ..NodeSamples::default()
        };
        let nodes = aggregate_nodes(&samples);

        assert_eq!(nodes.len(), 1);
        let gpu = &nodes[0].gpus["0"];
        assert_eq!(gpu.utilization, 80.0);
        assert_eq!(gpu.memory_used, 1000.0);
        assert_eq!(gpu.memory_total, 2000.0);
        assert_eq!(gpu.power, 0.0);
        assert_eq!(gpu.temperature, 0.0);
    }

    #[test]
    fn aggregation_is_deterministic_over_identical_input() {
        let samples = NodeSamples {
            utilization: vec![
                sample(&[("node", "n2"), ("gpu", "0")], "10"),
                sample(&[("node", "n1"), ("gpu", "1")], "20"),
                sample(&[("node", "n1"), ("gpu", "0")], "30"),
            ],
            power: vec![sample(&[("node", "n1"), ("gpu", "1")], "150")],
            temperature: vec![sample(&[("node", "n2"), ("gpu", "0")], "60")],
            ..NodeSamples::default()
        };
        let first = aggregate_nodes(&samples);
        let second = aggregate_nodes(&samples);

        assert_eq!(first, second);
        // Insertion order of first appearance in the seeding family
        assert_eq!(first[0].name, "n2");
        assert_eq!(first[1].name, "n1");
    }

    #[test]
    fn missing_family_degrades_to_zero_fields() {
        // A failed power query yields an empty family, not an error
        let samples = NodeSamples {
            utilization: vec![sample(&[("node", "n1"), ("gpu", "0")], "80")],
            power: vec![],
            temperature: vec![sample(&[("node", "n1"), ("gpu", "0")], "70")],
            ..NodeSamples::default()
        };
        let nodes = aggregate_nodes(&samples);

        assert_eq!(nodes[0].gpus["0"].power, 0.0);
        assert_eq!(nodes[0].gpus["0"].temperature, 70.0);
    }

    #[test]
    fn pods_with_same_name_on_two_nodes_stay_apart() {
        let samples = vec![
            sample(&[("pod", "train-job"), ("node", "n1"), ("gpu", "0")], "90"),
            sample(&[("pod", "train-job"), ("node", "n2"), ("gpu", "0")], "40"),
        ];
        let pods = aggregate_pods(&samples);

        assert_eq!(pods.len(), 2);
        assert_eq!(pods[0].name, "train-job");
        assert_eq!(pods[0].node, "n1");
        assert_eq!(pods[1].node, "n2");
        assert_eq!(pods[0].gpus["0"].utilization, 90.0);
        assert_eq!(pods[1].gpus["0"].utilization, 40.0);
    }

    #[test]
    fn pod_gpus_accumulate_on_one_record() {
        let samples = vec![
            sample(&[("pod", "train-job"), ("node", "n1"), ("gpu", "0")], "90"),
            sample(&[("pod", "train-job"), ("node", "n1"), ("gpu", "1")], "70"),
        ];
        let pods = aggregate_pods(&samples);

        assert_eq!(pods.len(), 1);
        assert_eq!(pods[0].gpus.len(), 2);
    }

    #[test]
    fn hardware_fields_only_fill_seeded_gpus() {
        let samples = HardwareSamples {
            device_name: vec![sample(&[("node", "n1"), ("gpu", "0")], "Tesla V100")],
            fields: vec![
                (
                    HardwareField::Uuid,
                    vec![
                        sample(&[("node", "n1"), ("gpu", "0")], "GPU-1234-abcd"),
                        sample(&[("node", "n1"), ("gpu", "7")], "GPU-ffff-ffff"),
                    ],
                ),
                (
                    HardwareField::MemoryTotal,
                    vec![sample(&[("node", "n1"), ("gpu", "0")], "24576")],
                ),
            ],
            ..HardwareSamples::default()
        };
        let hardware = aggregate_hardware(&samples);

        assert_eq!(hardware.len(), 1);
        assert_eq!(hardware[0].gpus.len(), 1);
        let gpu = &hardware[0].gpus["0"];
        assert_eq!(gpu.name, "Tesla V100");
        assert_eq!(gpu.uuid, "GPU-1234-abcd");
        assert_eq!(gpu.memory_total, 24576.0);
    }

    #[test]
    fn empty_device_name_falls_back_to_unknown_gpu() {
        let samples = HardwareSamples {
            device_name: vec![sample(&[("node", "n1"), ("gpu", "0")], "")],
            ..HardwareSamples::default()
        };
        let hardware = aggregate_hardware(&samples);

        assert_eq!(hardware[0].gpus["0"].name, "Unknown GPU");
    }

    #[test]
    fn versions_merge_only_onto_seeded_nodes() {
        let samples = HardwareSamples {
            device_name: vec![sample(&[("node", "n1"), ("gpu", "0")], "Tesla V100")],
            driver_version: vec![
                sample(&[("node", "n1")], "535.129.03"),
                sample(&[("node", "n2")], "470.82.01"),
            ],
            nvml_version: vec![sample(&[("node", "n1")], "12.535.129.03")],
            ..HardwareSamples::default()
        };
        let hardware = aggregate_hardware(&samples);

        assert_eq!(hardware.len(), 1);
        assert_eq!(hardware[0].driver_version, "535.129.03");
        assert_eq!(hardware[0].nvml_version, "12.535.129.03");
    }
}
