//! Whale Data API admin tool
//!
//! Drives the write endpoints of a running service: seeding synthetic data,
//! triggering a GBIF sync (optionally in the background, polling until it
//! settles) and printing a summary of the stored records.
//!
//! Usage:
//!   `cargo run --bin whale_admin -- --url http://localhost:3000 seed --count 200`
//!   `cargo run --bin whale_admin -- sync --background`
//!   `cargo run --bin whale_admin -- list --region "Pacific Ocean"`

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "whale_admin", version, about = "Admin tool for the Whale Data API")]
struct Cli {
    /// API base URL
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace all records with synthetic data
    Seed {
        #[arg(short, long)]
        count: Option<usize>,
    },
    /// Fetch occurrences from GBIF and upsert them
    Sync {
        /// Run as a background job and poll until it finishes
        #[arg(short, long)]
        background: bool,
    },
    /// Summarise stored records per species
    List {
        #[arg(long)]
        species: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
}

struct AdminClient {
    base_url: String,
    client: Client,
}

impl AdminClient {
    fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Could not build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .request(method, &url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON from {url}"))?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            bail!("{url} returned {status}: {message}");
        }
        Ok(body)
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn seed(admin: &AdminClient, count: Option<usize>) -> Result<()> {
    let pb = spinner("Seeding synthetic whale records...");
    let query: Vec<(&str, String)> = count.map(|c| ("count", c.to_string())).into_iter().collect();
    let body = admin.request(Method::POST, "/seed-whales", &query).await;
    pb.finish_and_clear();

    let body = body?;
    println!(
        "{} {}",
        style("✓").green(),
        body["message"].as_str().unwrap_or("Seeded")
    );
    Ok(())
}

async fn sync(admin: &AdminClient, background: bool) -> Result<()> {
    if !background {
        let pb = spinner("Syncing occurrences from GBIF...");
        let body = admin.request(Method::POST, "/sync-gbif", &[]).await;
        pb.finish_and_clear();

        let body = body?;
        print_sync_summary(&body);
        return Ok(());
    }

    let job = admin
        .request(Method::POST, "/sync-gbif", &[("background", "true".to_string())])
        .await?;
    let job_id = job["job_id"].as_str().unwrap_or_default().to_string();
    println!("Started background sync {}", style(&job_id).cyan());

    let pb = spinner("Waiting for background sync...");
    let status = loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        let status = admin.request(Method::GET, "/sync-gbif/status", &[]).await?;
        if status["job_id"].as_str() != Some(job_id.as_str()) {
            pb.finish_and_clear();
            bail!("Another sync replaced job {job_id}");
        }
        match status["status"].as_str() {
            Some("completed" | "failed") => break status,
            Some(other) => pb.set_message(format!("Background sync is {other}...")),
            None => {}
        }
    };
    pb.finish_and_clear();

    if status["status"] == "failed" {
        bail!(
            "Background sync failed: {}",
            status["error"].as_str().unwrap_or("unknown error")
        );
    }
    print_sync_summary(&status["result"]);
    Ok(())
}

fn print_sync_summary(summary: &Value) {
    println!("{}", style("GBIF sync complete").bold().green());
    for key in ["fetched", "upserted", "skipped"] {
        println!(
            "{:.<20} {}",
            style(key).cyan(),
            style(summary[key].as_u64().unwrap_or(0)).bold()
        );
    }
}

async fn list(admin: &AdminClient, species: Option<String>, region: Option<String>) -> Result<()> {
    let mut query = Vec::new();
    if let Some(species) = species {
        query.push(("species", species));
    }
    if let Some(region) = region {
        query.push(("region", region));
    }

    let body = admin.request(Method::GET, "/population", &query).await?;
    let records = body["data"].as_array().cloned().unwrap_or_default();

    let mut per_species: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for record in &records {
        let name = record["common_name"]
            .as_str()
            .or_else(|| record["species"].as_str())
            .unwrap_or("Unknown")
            .to_string();
        let entry = per_species.entry(name).or_default();
        entry.0 += 1;
        entry.1 += record["population"].as_i64().unwrap_or(0);
    }

    println!(
        "{} {} records from {}",
        style("Whale population:").bold().blue(),
        style(records.len()).bold(),
        body["source"].as_str().unwrap_or("unknown source")
    );
    println!("{}", style("─".repeat(50)).dim());
    for (name, (rows, population)) in per_species {
        println!(
            "{:.<32} {:>5} rows {:>7} whales",
            style(name).cyan(),
            rows,
            style(population).bold().green()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let admin = AdminClient::new(&cli.url)?;

    println!("API URL: {}", style(&admin.base_url).cyan());

    match cli.command {
        Commands::Seed { count } => seed(&admin, count).await,
        Commands::Sync { background } => sync(&admin, background).await,
        Commands::List { species, region } => list(&admin, species, region).await,
    }
}
