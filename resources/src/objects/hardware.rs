use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inventory fields fed by one metric family each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareField {
    Brand,
    Serial,
    Uuid,
    PciBusId,
    MemoryTotal,
    Bar1Total,
    ComputeCapabilityMajor,
    ComputeCapabilityMinor,
    MultiprocessorCount,
    MemoryBusWidth,
    MaxMemoryClock,
    MaxSmClock,
    PowerLimit,
    PowerLimitMin,
    PowerLimitMax,
}

/// Static inventory of one GPU, seeded from the device-name query.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareGpuRecord {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub serial: String,
    pub uuid: String,
    pub pci_bus_id: String,
    pub memory_total: f64,
    pub bar1_total: f64,
    pub compute_capability_major: f64,
    pub compute_capability_minor: f64,
    pub multiprocessor_count: f64,
    pub memory_bus_width: f64,
    pub max_memory_clock: f64,
    pub max_sm_clock: f64,
    pub power_limit: f64,
    pub power_limit_min: f64,
    pub power_limit_max: f64,
}

impl HardwareGpuRecord {
    pub fn new(id: String, name: String) -> Self {
        HardwareGpuRecord {
            id,
            name,
            ..HardwareGpuRecord::default()
        }
    }

    /// Store a raw sample value into `field`. Identification fields keep
    /// the text as-is; the numeric fields parse as a float, `0` when the
    /// value does not parse.
    pub fn set(&mut self, field: HardwareField, value: &str) {
        match field {
            HardwareField::Brand => self.brand = value.to_string(),
            HardwareField::Serial => self.serial = value.to_string(),
            HardwareField::Uuid => self.uuid = value.to_string(),
            HardwareField::PciBusId => self.pci_bus_id = value.to_string(),
            HardwareField::MemoryTotal => self.memory_total = parse_number(value),
            HardwareField::Bar1Total => self.bar1_total = parse_number(value),
            HardwareField::ComputeCapabilityMajor => {
                self.compute_capability_major = parse_number(value)
            },
            HardwareField::ComputeCapabilityMinor => {
                self.compute_capability_minor = parse_number(value)
            },
            HardwareField::MultiprocessorCount => self.multiprocessor_count = parse_number(value),
            HardwareField::MemoryBusWidth => self.memory_bus_width = parse_number(value),
            HardwareField::MaxMemoryClock => self.max_memory_clock = parse_number(value),
            HardwareField::MaxSmClock => self.max_sm_clock = parse_number(value),
            HardwareField::PowerLimit => self.power_limit = parse_number(value),
            HardwareField::PowerLimitMin => self.power_limit_min = parse_number(value),
            HardwareField::PowerLimitMax => self.power_limit_max = parse_number(value),
        }
    }

    /// `major.minor` compute capability, when both parts are known.
    pub fn compute_capability(&self) -> Option<String> {
        if self.compute_capability_major != 0.0 && self.compute_capability_minor != 0.0 {
            Some(format!(
                "{}.{}",
                self.compute_capability_major, self.compute_capability_minor
            ))
        } else {
            None
        }
    }
}

fn parse_number(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

/// Hardware inventory of one node.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareNodeRecord {
    pub node: String,
    /// Per-GPU inventory, keyed by GPU id.
    pub gpus: BTreeMap<String, HardwareGpuRecord>,
    pub driver_version: String,
    pub nvml_version: String,
}

impl HardwareNodeRecord {
    pub fn new(node: String) -> Self {
        HardwareNodeRecord {
            node,
            gpus: BTreeMap::new(),
            driver_version: String::new(),
            nvml_version: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identification_fields_stay_text() {
        let mut gpu = HardwareGpuRecord::new("0".to_string(), "Tesla V100".to_string());
        gpu.set(HardwareField::Uuid, "GPU-1234-abcd");
        gpu.set(HardwareField::PciBusId, "00000000:1A:00.0");
        assert_eq!(gpu.uuid, "GPU-1234-abcd");
        assert_eq!(gpu.pci_bus_id, "00000000:1A:00.0");
    }

    #[test]
    fn numeric_fields_parse_or_zero() {
        let mut gpu = HardwareGpuRecord::new("0".to_string(), "Tesla V100".to_string());
        gpu.set(HardwareField::MemoryTotal, "24576");
        assert_eq!(gpu.memory_total, 24576.0);
        gpu.set(HardwareField::PowerLimit, "garbage");
        assert_eq!(gpu.power_limit, 0.0);
    }

    #[test]
    fn compute_capability_needs_both_parts() {
        let mut gpu = HardwareGpuRecord::new("0".to_string(), "Tesla V100".to_string());
        assert_eq!(gpu.compute_capability(), None);
        gpu.set(HardwareField::ComputeCapabilityMajor, "7");
        assert_eq!(gpu.compute_capability(), None);
        gpu.set(HardwareField::ComputeCapabilityMinor, "5");
        assert_eq!(gpu.compute_capability(), Some("7.5".to_string()));
    }
}
