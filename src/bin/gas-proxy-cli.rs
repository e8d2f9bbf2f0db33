//! Operator CLI for a running relay.
//!
//! `ping` sends the liveness GET; `send` POSTs a file (or stdin) the way a
//! browser caller would, optionally with `X-Proxy-Key` and `Origin`.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN};

#[derive(Parser)]
#[command(name = "gas-proxy-cli")]
#[command(about = "Probe a running gas-proxy relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Shared secret sent as X-Proxy-Key.
    #[arg(short, long)]
    key: Option<String>,

    /// Origin header to present, for relays that enforce the allow-list.
    #[arg(short, long)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness probe (GET)
    Ping,
    /// Relay a payload (POST); reads stdin when no file is given
    Send {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert("x-proxy-key", HeaderValue::from_str(key)?);
    }
    if let Some(origin) = &cli.origin {
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
    }

    let res = match cli.command {
        Commands::Ping => client.get(&cli.url).headers(headers).send().await?,
        Commands::Send { file } => {
            let body = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            client
                .post(&cli.url)
                .headers(headers)
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(body)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let body = res.bytes().await?;

    eprintln!("{status} ({content_type})");
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&body)),
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
