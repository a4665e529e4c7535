use anyhow::Result;
use clap::Args;
use reqwest::blocking::Client;
use resources::models::Response;

use crate::utils::gen_url;

#[derive(Args)]
pub struct Arg {}

impl Arg {
    pub fn handle(&self) -> Result<()> {
        let client = Client::new();
        let url = gen_url("refresh".to_string())?;
        let res = client.post(url).send()?.json::<Response<()>>()?;
        println!(
            "{}",
            res.msg.unwrap_or_else(|| "refresh triggered".to_string())
        );
        Ok(())
    }
}
