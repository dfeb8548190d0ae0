use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

use delscan_core::{config::ScrapeConfig, scrape::Scraper};
use delscan_replay::ReplayTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    delscan_core::logging::init("delscan")?;

    let mut args = std::env::args().skip(1);
    let dump = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: delscan <admin-log-dump.json>"),
    };
    if args.next().is_some() {
        bail!("usage: delscan <admin-log-dump.json>");
    }

    let cfg = ScrapeConfig::from_env()?;
    let transport = Arc::new(
        ReplayTransport::open(&dump)
            .with_context(|| format!("cannot open dump {}", dump.display()))?,
    );

    let summary = Scraper::new(transport, cfg).run().await?;

    println!("--- Report Saved: {} ---", summary.report_path.display());
    println!("Final Results:");
    println!(
        "  - Total messages processed: {}",
        summary.statistics.total
    );
    println!(
        "  - Users identified: {}",
        summary.statistics.users_found
    );
    println!("  - Cached users: {}", summary.cached_users);

    Ok(())
}
