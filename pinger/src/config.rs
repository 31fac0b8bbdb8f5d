use clap::Parser;
use serde::Deserialize;
use std::fs;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    62000
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Stop after this many seconds without a new connection
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

impl Config {
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Config, String> {
        let content = fs::read_to_string(path).map_err(|e| format!("Invalid path: {}", &e))?;
        toml::from_str(&content).map_err(|e| format!("Invalid toml: {e}"))
    }
}
