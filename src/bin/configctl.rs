use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "configctl")]
#[command(about = "Management CLI for the configuration store", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CONFIG_STORE_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,
    /// Upload a YAML document
    Upload { service: String, file: PathBuf },
    /// Fetch a stored document
    Get {
        service: String,
        /// Exact version; latest when omitted
        #[arg(long)]
        version: Option<i64>,
        /// Render the document as a template
        #[arg(long)]
        template: bool,
        /// JSON file with template variables (implies --template)
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// List stored versions
    History { service: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let res = match cli.command {
        Commands::Health => client.get(endpoint(&base, &["health"])?).send().await?,
        Commands::Upload { service, file } => {
            let body = tokio::fs::read(&file).await?;
            client
                .post(endpoint(&base, &["config", service.as_str()])?)
                .header("content-type", "application/x-yaml")
                .body(body)
                .send()
                .await?
        }
        Commands::Get { service, version, template, context } => {
            let mut req = client.get(endpoint(&base, &["config", service.as_str()])?);
            if let Some(v) = version {
                req = req.query(&[("version", v)]);
            }
            if template || context.is_some() {
                req = req.query(&[("template", "1")]);
            }
            if let Some(path) = context {
                let ctx: Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
                req = req.json(&ctx);
            }
            req.send().await?
        }
        Commands::History { service } => {
            client
                .get(endpoint(&base, &["config", service.as_str(), "history"])?)
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("URL `{}` cannot carry a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
