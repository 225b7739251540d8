use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use avatar_fetch::{AvatarFetcher, FetchOptions, DEFAULT_URL_TEMPLATE};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Download user avatars into the local avatar cache", version)]
struct Args {
    /// User ids whose avatars should be cached.
    #[arg(required = true)]
    ids: Vec<String>,

    /// Cache directory; files are written as {id}.{extension}.
    #[arg(long, default_value = "user_profile")]
    dir: PathBuf,

    /// Avatar URL with {id} standing in for the user id.
    #[arg(long, default_value = DEFAULT_URL_TEMPLATE)]
    url_template: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Extension given to cached files.
    #[arg(long, default_value = "jpg")]
    extension: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let options = FetchOptions {
        dir: args.dir.clone(),
        url_template: args.url_template,
        extension: args.extension,
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let fetcher = AvatarFetcher::new(options).context("creating avatar fetcher")?;
    let report = fetcher.fetch_many(args.ids).await;

    println!(
        "[avatar_fetch] cached {} avatars in {}",
        report.saved.len(),
        args.dir.display()
    );
    if !report.failed.is_empty() {
        eprintln!(
            "[avatar_fetch] no avatar for: {}",
            report.failed.join(", ")
        );
    }
    Ok(())
}
