//! `annygate key` — print a query fingerprint.

use anyhow::{Context, Result};
use serde_json::Value;

use annygate::cache::make_key;

pub(crate) fn cmd_key(api: &str, params: &str) -> Result<()> {
    println!("{}", fingerprint(api, params)?);
    Ok(())
}

fn fingerprint(api: &str, params: &str) -> Result<String> {
    let params: Value = serde_json::from_str(params).context("params must be valid JSON")?;
    Ok(make_key(api, &params))
}
