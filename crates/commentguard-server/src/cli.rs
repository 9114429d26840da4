//! Command-line arguments

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "commentguard-server")]
#[command(about = "CommentGuard comment moderation service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Listen address (overrides the config file)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port (overrides the config file)
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Moderation provider base URL
    #[arg(long)]
    pub provider_url: Option<String>,

    /// Moderation provider API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer token required on owner routes
    #[arg(long, env = "COMMENTGUARD_OWNER_TOKEN", hide_env_values = true)]
    pub owner_token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
