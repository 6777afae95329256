//! Server configuration

use clap::Parser;

/// Invited+ server configuration, from flags or environment
#[derive(Debug, Clone, Parser)]
#[command(name = "invited", about = "Invited+ event and task management server")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:invited.db")]
    pub database_url: String,
}
