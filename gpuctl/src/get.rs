use anyhow::Result;
use clap::Args;
use reqwest::blocking::Client;
use resources::{
    models::Response,
    objects::{hardware::HardwareNodeRecord, node::NodeRecord, pod::PodRecord},
};

use crate::{utils::gen_url, ResourceKind};

#[derive(Args)]
pub struct Arg {
    /// Kind of resource
    #[clap(arg_enum)]
    kind: ResourceKind,
}

impl Arg {
    pub fn handle(&self) -> Result<()> {
        let client = Client::new();
        let url = gen_url(self.kind.to_string())?;
        match self.kind {
            ResourceKind::Nodes => {
                let res = client.get(url).send()?.json::<Response<Vec<NodeRecord>>>()?;
                print_nodes(res.data.unwrap_or_default());
            },
            ResourceKind::Pods => {
                let res = client.get(url).send()?.json::<Response<Vec<PodRecord>>>()?;
                print_pods(res.data.unwrap_or_default());
            },
            ResourceKind::Hardware => {
                let res = client
                    .get(url)
                    .send()?
                    .json::<Response<Vec<HardwareNodeRecord>>>()?;
                print_hardware(res.data.unwrap_or_default());
            },
        }
        Ok(())
    }
}

fn print_nodes(nodes: Vec<NodeRecord>) {
    println!(
        "{: <20} {: <8} {: <4} {: <8} {: <16} {: <9} {: <7}",
        "NODE", "STATUS", "GPU", "UTIL(%)", "MEMORY(MIB)", "POWER(W)", "TEMP(C)"
    );
    for node in nodes {
        for gpu in node.gpus.values() {
            println!(
                "{: <20} {: <8} {: <4} {: <8.1} {: <16} {: <9.1} {: <7.1}",
                node.name,
                node.status,
                gpu.id,
                gpu.utilization,
                format!("{:.0}/{:.0}", gpu.memory_used, gpu.memory_total),
                gpu.power,
                gpu.temperature
            );
        }
    }
}

fn print_pods(pods: Vec<PodRecord>) {
    println!("{: <28} {: <20} {: <4} {: <8}", "POD", "NODE", "GPU", "UTIL(%)");
    for pod in pods {
        for gpu in pod.gpus.values() {
            println!(
                "{: <28} {: <20} {: <4} {: <8.1}",
                pod.name, pod.node, gpu.id, gpu.utilization
            );
        }
    }
}

fn print_hardware(hardware: Vec<HardwareNodeRecord>) {
    println!(
        "{: <20} {: <4} {: <24} {: <12} {: <8} {: <10} {: <12}",
        "NODE", "GPU", "NAME", "MEMORY(MIB)", "CC", "POWER(W)", "DRIVER"
    );
    for node in hardware {
        for gpu in node.gpus.values() {
            println!(
                "{: <20} {: <4} {: <24} {: <12.0} {: <8} {: <10.0} {: <12}",
                node.node,
                gpu.id,
                gpu.name,
                gpu.memory_total,
                gpu.compute_capability().unwrap_or_default(),
                gpu.power_limit,
                node.driver_version
            );
        }
    }
}
