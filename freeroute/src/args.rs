use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Freeroute LLM proxy
#[derive(Debug, Parser)]
#[command(
    name = "freeroute",
    about = "Resilient proxy over a pool of free-tier LLM backends"
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000", env = "FREEROUTE_LISTEN")]
    pub listen: SocketAddr,

    /// Upstream API base URL
    #[arg(
        long,
        default_value = freeroute_config::DEFAULT_BASE_URL,
        env = "FREEROUTE_BASE_URL"
    )]
    pub base_url: url::Url,

    /// Upstream API key; a key set through the dashboard takes priority
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path of the persisted configuration record
    #[arg(long, default_value = "config.json", env = "FREEROUTE_CONFIG")]
    pub config_path: PathBuf,

    /// Path of the persisted model memory record
    #[arg(long, default_value = "model_memory.json", env = "FREEROUTE_MEMORY")]
    pub memory_path: PathBuf,
}
