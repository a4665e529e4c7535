use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Prometheus instance scraping the DCGM exporters.
    pub metrics_server: String,
    /// Address the dashboard listens on.
    pub listen_addr: String,
    /// Seconds between two refresh ticks.
    pub refresh_interval: u64,
    /// Log level of the dashboard binary.
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            metrics_server: "localhost:9090".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
            refresh_interval: 30,
            log_level: "info".to_string(),
        }
    }
}
