use anyhow::Result;
use reqwest::Url;

use crate::CONFIG;

pub fn gen_url(path: String) -> Result<Url> {
    let url = CONFIG.base_url.to_owned();
    Ok(url.join(format!("api/v1/{}", path).as_str())?)
}
