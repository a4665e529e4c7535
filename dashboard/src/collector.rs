use std::time::Duration;

use futures::future::join_all;
use resources::{
    config::MonitorConfig,
    objects::{
        hardware::{HardwareField, HardwareNodeRecord},
        node::NodeRecord,
        pod::PodRecord,
    },
};
use tokio::join;

use crate::{
    aggregate::{self, HardwareSamples, NodeSamples},
    prometheus::MetricsClient,
};

/// Node telemetry families.
const GPU_UTIL: &str = "DCGM_FI_DEV_GPU_UTIL";
const MEM_COPY_UTIL: &str = "DCGM_FI_DEV_MEM_COPY_UTIL";
const FB_USED: &str = "DCGM_FI_DEV_FB_USED";
const FB_TOTAL: &str = "DCGM_FI_DEV_FB_TOTAL";
const POWER_USAGE: &str = "DCGM_FI_DEV_POWER_USAGE";
const GPU_TEMP: &str = "DCGM_FI_DEV_GPU_TEMP";

/// Utilization restricted to series attributed to a pod.
const POD_GPU_UTIL: &str = "DCGM_FI_DEV_GPU_UTIL{pod!=\"\"}";

/// Node-scoped inventory families.
const DRIVER_VERSION: &str = "DCGM_FI_DRIVER_VERSION";
const NVML_VERSION: &str = "DCGM_FI_NVML_VERSION";
/// Seeding family for the hardware records.
const DEV_NAME: &str = "DCGM_FI_DEV_NAME";
/// Polled but not surfaced on any record field.
const MINOR_NUMBER: &str = "DCGM_FI_DEV_MINOR_NUMBER";
const OEM_INFOROM_VER: &str = "DCGM_FI_DEV_OEM_INFOROM_VER";

/// Inventory families mapped onto one record field each.
const HARDWARE_FIELDS: [(&str, HardwareField); 15] = [
    ("DCGM_FI_DEV_BRAND", HardwareField::Brand),
    ("DCGM_FI_DEV_SERIAL", HardwareField::Serial),
    ("DCGM_FI_DEV_UUID", HardwareField::Uuid),
    ("DCGM_FI_DEV_PCI_BUSID", HardwareField::PciBusId),
    ("DCGM_FI_DEV_FB_TOTAL", HardwareField::MemoryTotal),
    ("DCGM_FI_DEV_BAR1_TOTAL", HardwareField::Bar1Total),
    ("DCGM_FI_DEV_CC_MAJOR", HardwareField::ComputeCapabilityMajor),
    ("DCGM_FI_DEV_CC_MINOR", HardwareField::ComputeCapabilityMinor),
    (
        "DCGM_FI_DEV_MULTIPROCESSOR_COUNT",
        HardwareField::MultiprocessorCount,
    ),
    ("DCGM_FI_DEV_MEMORY_BUS_WIDTH", HardwareField::MemoryBusWidth),
    ("DCGM_FI_DEV_MAX_MEM_CLOCK", HardwareField::MaxMemoryClock),
    ("DCGM_FI_DEV_MAX_SM_CLOCK", HardwareField::MaxSmClock),
    ("DCGM_FI_DEV_POWER_MGMT_LIMIT", HardwareField::PowerLimit),
    (
        "DCGM_FI_DEV_POWER_MGMT_LIMIT_MIN",
        HardwareField::PowerLimitMin,
    ),
    (
        "DCGM_FI_DEV_POWER_MGMT_LIMIT_MAX",
        HardwareField::PowerLimitMax,
    ),
];

/// Polls the metric families and rebuilds the aggregate record sets
/// from scratch. Every collection is a point-in-time snapshot; nothing
/// is carried over between ticks.
#[derive(Clone)]
pub struct Collector {
    client: MetricsClient,
}

impl Collector {
    pub fn new(config: &MonitorConfig) -> Self {
        // Bound each query by the refresh period so a stuck backend
        // cannot push one tick into the next.
        let timeout = Duration::from_secs(config.refresh_interval);
        Collector {
            client: MetricsClient::new(config.metrics_server.clone(), timeout),
        }
    }

    /// Fetch and aggregate the six node telemetry families. The queries
    /// are fired together; a failed family arrives as an empty sample
    /// set and its fields stay zero.
    pub async fn collect_nodes(&self) -> Vec<NodeRecord> {
        let (utilization, mem_copy_utilization, memory_used, memory_total, power, temperature) = join!(
            self.client.query_or_empty(GPU_UTIL),
            self.client.query_or_empty(MEM_COPY_UTIL),
            self.client.query_or_empty(FB_USED),
            self.client.query_or_empty(FB_TOTAL),
            self.client.query_or_empty(POWER_USAGE),
            self.client.query_or_empty(GPU_TEMP),
        );
        aggregate::aggregate_nodes(&NodeSamples {
            utilization,
            mem_copy_utilization,
            memory_used,
            memory_total,
            power,
            temperature,
        })
    }

    /// Fetch and aggregate the pod-scoped utilization family.
    pub async fn collect_pods(&self) -> Vec<PodRecord> {
        let samples = self.client.query_or_empty(POD_GPU_UTIL).await;
        aggregate::aggregate_pods(&samples)
    }

    /// Fetch and aggregate the inventory families.
    pub async fn collect_hardware(&self) -> Vec<HardwareNodeRecord> {
        let field_queries = join_all(HARDWARE_FIELDS.iter().map(|(expression, field)| async move {
            (*field, self.client.query_or_empty(expression).await)
        }));
        let ((device_name, driver_version, nvml_version, minor_number, oem_inforom_version), fields) = join!(
            async {
                join!(
                    self.client.query_or_empty(DEV_NAME),
                    self.client.query_or_empty(DRIVER_VERSION),
                    self.client.query_or_empty(NVML_VERSION),
                    self.client.query_or_empty(MINOR_NUMBER),
                    self.client.query_or_empty(OEM_INFOROM_VER),
                )
            },
            field_queries,
        );
        aggregate::aggregate_hardware(&HardwareSamples {
            device_name,
            driver_version,
            nvml_version,
            minor_number,
            oem_inforom_version,
            fields,
        })
    }
}
