use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "bookswap-cli")]
#[command(about = "Management CLI for the BookSwap backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dashboard metrics, recent logs and active alerts
    Stats,
    /// Place a bid on a book
    Bid { book_id: i64, amount: f64 },
    /// Dump the Prometheus metrics text
    Metrics,
    /// List books
    Books {
        #[arg(long, default_value_t = 0)]
        skip: usize,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Check a username/password pair
    Login { username: String, password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Stats => {
            let res = client
                .get(format!("{}/api/dashboard-stats", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Bid { book_id, amount } => {
            let res = client
                .post(format!("{}/bid", cli.url))
                .json(&json!({ "book_id": book_id, "amount": amount }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Metrics => {
            let res = client.get(format!("{}/metrics", cli.url)).send().await?;
            print_trace_id(&res);
            println!("{}", res.text().await?);
        }
        Commands::Books { skip, limit } => {
            let res = client
                .get(format!("{}/api/books", cli.url))
                .query(&[("skip", skip), ("limit", limit)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Login { username, password } => {
            let res = client
                .post(format!("{}/login", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn print_trace_id(res: &reqwest::Response) {
    if let Some(id) = res.headers().get("x-trace-id").and_then(|v| v.to_str().ok()) {
        eprintln!("trace-id: {}", id);
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    print_trace_id(&res);
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
