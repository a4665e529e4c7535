use anyhow::Result;
use chrono::Local;
use chrono_humanize::{Accuracy, HumanTime, Tense};
use clap::Args;
use reqwest::blocking::Client;
use resources::models::{RefreshStatus, Response};

use crate::utils::gen_url;

#[derive(Args)]
pub struct Arg {}

impl Arg {
    pub fn handle(&self) -> Result<()> {
        let client = Client::new();
        let url = gen_url("status".to_string())?;
        let res = client.get(url).send()?.json::<Response<RefreshStatus>>()?;

        if let Some(status) = res.data {
            println!("{: <16} {}", "Phase:", status.phase);
            match status.last_updated {
                Some(time) => {
                    let d = HumanTime::from(time - Local::now().naive_utc());
                    println!(
                        "{: <16} {}",
                        "Last Updated:",
                        d.to_text_en(Accuracy::Rough, Tense::Past)
                    );
                },
                None => println!("{: <16} never", "Last Updated:"),
            }
            if let Some(error) = status.last_error {
                println!("{: <16} {}", "Last Error:", error);
            }
        }
        Ok(())
    }
}
