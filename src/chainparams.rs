// src/chainparams.rs

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{MetricsError, Result};

/// Stake blocks sampled by the kernel rate estimate unless configured otherwise.
pub const DEFAULT_KERNEL_SAMPLE_SIZE: u32 = 72;

const ENV_PREFIX: &str = "CHAIN_METRICS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainParams {
    pub network_id: String,
    /// Height at which classic difficulty stops applying.
    pub fork_height: u32,
    #[serde(default = "default_kernel_sample_size")]
    pub kernel_sample_size: u32,
}

fn default_kernel_sample_size() -> u32 {
    DEFAULT_KERNEL_SAMPLE_SIZE
}

impl ChainParams {
    pub fn mainnet() -> Self {
        ChainParams {
            network_id: "mainnet".to_string(),
            fork_height: 1_100_000,
            kernel_sample_size: DEFAULT_KERNEL_SAMPLE_SIZE,
        }
    }

    pub fn testnet() -> Self {
        ChainParams {
            network_id: "testnet".to_string(),
            fork_height: 3_000,
            kernel_sample_size: DEFAULT_KERNEL_SAMPLE_SIZE,
        }
    }

    /// Layers defaults, an optional config file and `CHAIN_METRICS_*` environment variables.
    ///
    /// The `network_id` picked by the file or environment selects which preset
    /// supplies the defaults for the remaining keys.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let network = Self::layered(path, Self::mainnet())?.get_string("network_id")?;
        let preset = match network.as_str() {
            "testnet" => Self::testnet(),
            "mainnet" => Self::mainnet(),
            other => {
                return Err(MetricsError::invalid("network_id", format!("unknown network `{}`", other)));
            }
        };
        let params: ChainParams = Self::layered(path, preset)?.try_deserialize()?;
        params.validate()?;
        log::info!(
            "Chain params loaded: network={}, fork_height={}, kernel_sample_size={}",
            params.network_id, params.fork_height, params.kernel_sample_size
        );
        Ok(params)
    }

    fn layered(path: Option<&str>, defaults: ChainParams) -> Result<Config> {
        let mut builder = Config::builder()
            .set_default("network_id", defaults.network_id)?
            .set_default("fork_height", i64::from(defaults.fork_height))?
            .set_default("kernel_sample_size", i64::from(defaults.kernel_sample_size))?;
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let built = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)).build()?;
        Ok(built)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kernel_sample_size == 0 {
            return Err(MetricsError::invalid("kernel_sample_size", "Sample size should be greater than 0."));
        }
        Ok(())
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
