//! Purges a list of URLs and reports the outcome of each one.
//!
//! The token is read from `AZ_TOKEN`, URLs from the command line:
//!
//! Run with: `AZ_TOKEN=... cargo run --example purge -- www.example.com/foo.jpg www.example.com/bar.jpg`

use azion::{Client, Error, ErrorKind, PurgeMethod};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("azion=info")
        .init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: purge <url>...");
        return Ok(());
    }

    let client = Client::builder().token_from_env()?.build()?;

    match client.purge_url(urls, PurgeMethod::Delete).await {
        Ok(purge) => {
            for url in purge.succeeded_values() {
                println!("purged   {}", url);
            }
            for (status, entry) in purge.failed() {
                for url in &entry.values {
                    println!("rejected {} ({}: {})", url, status, entry.details);
                }
            }
        }
        Err(Error::Api(err)) if err.kind == ErrorKind::Unauthorized => {
            eprintln!("Token rejected, get a new one with Client::authorize");
        }
        Err(Error::Api(err)) => {
            eprintln!("API error {}", err);
            for detail in &err.details {
                eprintln!("  {}", detail);
            }
        }
        Err(e) => eprintln!("Other error: {}", e),
    }

    Ok(())
}
