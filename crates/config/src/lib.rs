use alloy::primitives::Address;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tidewatch_core::PricingParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    /// Factory contract whose pairs are indexed. Logs from any other
    /// contract carrying the same event signatures are ignored.
    pub factory: Address,
    /// Oracle and trust-filter parameters; omitted fields fall back to
    /// the original BSC-mainnet deployment.
    #[serde(default)]
    pub pricing: PricingParams,
}

impl Config {
    pub fn load(path: PathBuf) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}
