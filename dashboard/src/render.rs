//! Server-side rendering of the dashboard page. Builds the cards out of
//! the published snapshot; the snapshot itself is never modified here.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, TimeZone};
use resources::{models::RefreshPhase, objects::node::NodeRecord};

use crate::state::{DashboardState, Snapshot};

const PAGE_BASE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="REFRESH_PERIOD">
<title>GPU Cluster Dashboard</title>
<style>
body { font-family: sans-serif; background: #f0f2f5; margin: 0; padding: 20px; }
h1 { margin-top: 0; }
.dashboard { display: grid; grid-template-columns: repeat(auto-fit, minmax(340px, 1fr)); gap: 16px; }
.card { background: white; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.15); }
.card h3 { margin-top: 0; }
.metric { display: flex; justify-content: space-between; margin: 4px 0; }
.metric-label { color: #666; }
.metric-value { font-weight: 600; }
.gpu { margin-top: 12px; padding: 8px; background: #f7f7f9; border-radius: 6px; }
.status.online { color: #2e7d32; }
.status.offline { color: #c62828; }
.bar { height: 8px; background: #e0e0e0; border-radius: 4px; margin: 6px 0; }
.bar-fill { height: 8px; background: #1976d2; border-radius: 4px; }
.banner { background: #fdecea; color: #c62828; padding: 12px; border-radius: 8px; margin-bottom: 16px; }
.loading { color: #666; padding: 40px; text-align: center; }
</style>
</head>
<body>
<h1>GPU Cluster Dashboard</h1>
BODY
</body>
</html>
"#;

pub fn page(state: &DashboardState, refresh_period: u64) -> String {
    let mut body = String::new();
    if state.phase == RefreshPhase::Failed {
        let reason = state.last_error.as_deref().unwrap_or("unknown error");
        body.push_str(&format!(
            "<div class=\"banner\">Refresh failed: {}</div>\n",
            escape(reason)
        ));
    }
    match &state.snapshot {
        Some(snapshot) => {
            body.push_str("<div class=\"dashboard\">\n");
            body.push_str(&summary_card(snapshot));
            if !snapshot.hardware.is_empty() {
                body.push_str(&hardware_card(snapshot));
            }
            for node in &snapshot.nodes {
                body.push_str(&node_card(node));
            }
            if !snapshot.pods.is_empty() {
                body.push_str(&pod_card(snapshot));
            }
            body.push_str("</div>\n");
        },
        None => {
            body.push_str("<div class=\"loading\">Waiting for the first refresh...</div>\n");
        },
    }
    PAGE_BASE
        .replace("REFRESH_PERIOD", &refresh_period.to_string())
        .replace("BODY", &body)
}

fn metric(label: &str, value: String) -> String {
    format!(
        "<div class=\"metric\"><span class=\"metric-label\">{}</span><span class=\"metric-value\">{}</span></div>\n",
        label, value
    )
}

fn bar(percent: f64) -> String {
    format!(
        "<div class=\"bar\"><div class=\"bar-fill\" style=\"width: {:.0}%\"></div></div>\n",
        percent.clamp(0.0, 100.0)
    )
}

fn summary_card(snapshot: &Snapshot) -> String {
    let total_gpus: usize = snapshot.nodes.iter().map(|node| node.gpus.len()).sum();
    let average_utilization = if snapshot.nodes.is_empty() {
        0.0
    } else {
        snapshot
            .nodes
            .iter()
            .map(|node| node.average_utilization())
            .sum::<f64>()
            / snapshot.nodes.len() as f64
    };

    let mut card = String::from("<div class=\"card\">\n<h3>Cluster Summary</h3>\n");
    card.push_str(&metric("Nodes", snapshot.nodes.len().to_string()));
    card.push_str(&metric("GPUs", total_gpus.to_string()));
    card.push_str(&metric("GPU Pods", snapshot.pods.len().to_string()));
    card.push_str(&metric(
        "Average GPU Utilization",
        format!("{:.1}%", average_utilization),
    ));
    card.push_str(&bar(average_utilization));
    card.push_str(&metric(
        "Last Updated",
        Local
            .from_utc_datetime(&snapshot.updated_at)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    ));
    card.push_str("</div>\n");
    card
}

fn hardware_card(snapshot: &Snapshot) -> String {
    let total_gpus: usize = snapshot.hardware.iter().map(|node| node.gpus.len()).sum();
    let total_memory: f64 = snapshot
        .hardware
        .iter()
        .flat_map(|node| node.gpus.values())
        .map(|gpu| gpu.memory_total)
        .sum();
    let driver_versions: BTreeSet<&str> = snapshot
        .hardware
        .iter()
        .map(|node| node.driver_version.as_str())
        .filter(|version| !version.is_empty())
        .collect();
    // GPU count per device model
    let mut models: BTreeMap<&str, usize> = BTreeMap::new();
    for gpu in snapshot.hardware.iter().flat_map(|node| node.gpus.values()) {
        *models.entry(gpu.name.as_str()).or_default() += 1;
    }

    let mut card = String::from("<div class=\"card\">\n<h3>Hardware</h3>\n");
    card.push_str(&metric("Total GPUs", total_gpus.to_string()));
    card.push_str(&metric(
        "Total GPU Memory",
        format!("{:.1} GiB", total_memory / 1024.0),
    ));
    if !driver_versions.is_empty() {
        card.push_str(&metric(
            "Driver",
            escape(&driver_versions.into_iter().collect::<Vec<_>>().join(", ")),
        ));
    }
    for (model, count) in models {
        card.push_str(&metric(&escape(model), format!("x {}", count)));
    }
    for node in &snapshot.hardware {
        card.push_str(&format!("<div class=\"gpu\"><strong>{}</strong>\n", escape(&node.node)));
        for gpu in node.gpus.values() {
            card.push_str(&metric(
                &format!("GPU {}", escape(&gpu.id)),
                escape(&gpu.name),
            ));
            if !gpu.uuid.is_empty() {
                card.push_str(&metric("UUID", escape(&gpu.uuid)));
            }
            if gpu.memory_total > 0.0 {
                card.push_str(&metric("Memory", format!("{:.0} MiB", gpu.memory_total)));
            }
            if let Some(capability) = gpu.compute_capability() {
                card.push_str(&metric("Compute Capability", capability));
            }
            if gpu.multiprocessor_count > 0.0 {
                card.push_str(&metric("SMs", format!("{:.0}", gpu.multiprocessor_count)));
            }
            if gpu.power_limit > 0.0 {
                card.push_str(&metric("Power Limit", format!("{:.0} W", gpu.power_limit)));
            }
        }
        card.push_str("</div>\n");
    }
    card.push_str("</div>\n");
    card
}

fn node_card(node: &NodeRecord) -> String {
    let mut card = format!(
        "<div class=\"card\">\n<h3>Node: {}</h3>\n",
        escape(&node.name)
    );
    card.push_str(&metric(
        "Status",
        format!("<span class=\"status {0}\">{0}</span>", node.status),
    ));
    card.push_str(&metric("GPUs", node.gpus.len().to_string()));
    card.push_str(&metric(
        "Average Utilization",
        format!("{:.1}%", node.average_utilization()),
    ));
    card.push_str(&bar(node.average_utilization()));
    for gpu in node.gpus.values() {
        card.push_str(&format!("<div class=\"gpu\"><strong>GPU {}</strong>\n", escape(&gpu.id)));
        card.push_str(&metric("Utilization", format!("{:.1}%", gpu.utilization)));
        card.push_str(&metric(
            "Memory",
            format!("{:.0} / {:.0} MiB", gpu.memory_used, gpu.memory_total),
        ));
        card.push_str(&metric("Power", format!("{:.1} W", gpu.power)));
        card.push_str(&metric("Temperature", format!("{:.1} C", gpu.temperature)));
        card.push_str("</div>\n");
    }
    card.push_str("</div>\n");
    card
}

fn pod_card(snapshot: &Snapshot) -> String {
    let mut card = String::from("<div class=\"card\">\n<h3>Pod GPU Usage</h3>\n");
    for pod in &snapshot.pods {
        card.push_str(&format!("<div class=\"gpu\"><strong>{}</strong>\n", escape(&pod.name)));
        card.push_str(&metric("Node", escape(&pod.node)));
        for gpu in pod.gpus.values() {
            card.push_str(&metric(
                &format!("GPU {}", escape(&gpu.id)),
                format!("{:.1}%", gpu.utilization),
            ));
        }
        card.push_str("</div>\n");
    }
    card.push_str("</div>\n");
    card
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use resources::objects::node::GpuMetrics;

    use super::*;

    #[test]
    fn page_shows_loading_before_first_snapshot() {
        let state = DashboardState::new();
        let html = page(&state, 30);
        assert!(html.contains("Waiting for the first refresh"));
        assert!(html.contains("content=\"30\""));
    }

    #[test]
    fn page_renders_node_metrics() {
        let mut node = NodeRecord::new("n1".to_string());
        node.gpus.insert(
            "0".to_string(),
            GpuMetrics {
                id: "0".to_string(),
                utilization: 80.0,
                memory_used: 1000.0,
                memory_total: 2000.0,
                power: 250.0,
                temperature: 65.0,
            },
        );
        let mut state = DashboardState::new();
        state.begin();
        state.complete(Snapshot {
            nodes: vec![node],
            pods: vec![],
            hardware: vec![],
            updated_at: Local::now().naive_utc(),
        });

        let html = page(&state, 30);
        assert!(html.contains("Node: n1"));
        assert!(html.contains("80.0%"));
        assert!(html.contains("1000 / 2000 MiB"));
    }

    #[test]
    fn failed_phase_renders_banner_over_last_snapshot() {
        let mut state = DashboardState::new();
        state.begin();
        state.complete(Snapshot {
            nodes: vec![],
            pods: vec![],
            hardware: vec![],
            updated_at: Local::now().naive_utc(),
        });
        state.begin();
        state.fail("backend exploded".to_string());

        assert_eq!(state.phase, RefreshPhase::Failed);
        let html = page(&state, 30);
        assert!(html.contains("Refresh failed: backend exploded"));
        assert!(html.contains("Cluster Summary"));
    }
}
