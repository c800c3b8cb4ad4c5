use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

/// A non-success reply from the service.
#[derive(Debug, Error)]
#[error("product service returned {status}: {message}")]
struct RequestFailed {
    status: StatusCode,
    message: String,
}

impl RequestFailed {
    /// Prefer the `{"error": ..}` envelope, falling back to the raw body.
    fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());
        Self { status, message }
    }
}

#[derive(Parser)]
#[command(name = "products-cli")]
#[command(about = "Command-line client for the product service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product
    List,
    /// Show one product
    Get { id: i64 },
    /// Create a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
    },
    /// Change the given fields of a product
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
    },
    /// Delete a product
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/products", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::List => client.get(&base).send().await?,
        Commands::Get { id } => client.get(format!("{base}/{id}")).send().await?,
        Commands::Create { name, price } => {
            client
                .post(&base)
                .json(&serde_json::json!({ "name": name, "price": price }))
                .send()
                .await?
        }
        Commands::Update { id, name, price } => {
            let mut patch = Map::new();
            if let Some(name) = name {
                patch.insert("name".into(), Value::from(name));
            }
            if let Some(price) = price {
                patch.insert("price".into(), Value::from(price));
            }
            client
                .patch(format!("{base}/{id}"))
                .json(&patch)
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{base}/{id}")).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == StatusCode::NO_CONTENT {
        println!("Deleted");
        return Ok(());
    }
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RequestFailed::from_body(status, &body).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
