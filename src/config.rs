use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "hostfs-bridge",
    version,
    about = "Executes filesystem commands on behalf of a sandboxed editor."
)]
pub struct Config {
    /// Server listening address
    #[arg(long, env = "ADDR", default_value = "0.0.0.0:3000")]
    pub addr: String,

    /// Directory that relative command paths resolve against
    #[arg(long, env = "BASE_PATH", default_value = "/var/www")]
    pub base_path: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.addr.parse()
    }
}
