use clap::Parser;
use std::net::SocketAddr;

/// IPL chase win predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-win-predictor", version, about)]
pub struct Config {
    /// Address the predictor form is served on
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8501")]
    pub listen_addr: String,

    /// Path to the exported classifier artifact (JSON)
    #[arg(long, env = "MODEL_PATH", default_value = "models/ipl.json")]
    pub model_path: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model_path.trim().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr '{}' is not a valid socket address (expected host:port)",
                self.listen_addr
            );
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listen_addr.parse()?)
    }
}
