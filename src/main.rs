//! Tsuki provider probe - query the bot's external services from the shell
//!
//! A development tool that drives each provider client directly and prints
//! the decoded record as pretty JSON. Useful for checking what the bot will
//! see without running the bot itself.

use clap::Parser;
use serde::Serialize;

use tsuki_providers::cli::{parse_entity_kind, parse_feed_kind, Cli, Command};
use tsuki_providers::providers::{
    AniListClient, ColorClient, FeedClient, MediaKind, PronounClient, SongLinkClient, SongQuery,
    StatusClient,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Dispatches one subcommand to its provider client
async fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Status { hosts } => {
            let client = StatusClient::new()?;
            let checks = hosts.iter().map(|host| client.check(host));
            let results = futures::future::join_all(checks).await;

            let mut failed = false;
            for result in results {
                match result {
                    Ok(status) => print_record(&status)?,
                    Err(e) => {
                        eprintln!("error: {}", e);
                        failed = true;
                    }
                }
            }
            if failed {
                return Err("one or more status checks failed".into());
            }
        }

        Command::Song { url, platform, kind, id } => {
            let query = SongQuery {
                url,
                platform,
                kind: kind.as_deref().map(parse_entity_kind).transpose()?,
                id,
            };
            let client = SongLinkClient::new()?;
            print_record(&client.resolve(&query).await?)?;
        }

        Command::Pronouns { platform, id } => {
            let client = PronounClient::new()?;
            print_record(&client.lookup(&platform, &id).await?)?;
        }

        Command::Feed { user, kind } => {
            let kind = parse_feed_kind(&kind)?;
            let client = FeedClient::new()?;
            print_record(&client.fetch(&user, kind).await?)?;
        }

        Command::Color { hex } => {
            let client = ColorClient::new()?;
            print_record(&client.lookup_hex(&hex).await?)?;
        }

        Command::Media { search, manga } => {
            let kind = if manga { MediaKind::Manga } else { MediaKind::Anime };
            let client = AniListClient::new()?;
            print_record(&client.search(&search, kind).await?)?;
        }
    }

    Ok(())
}

/// Prints a decoded record as pretty JSON
fn print_record<T: Serialize>(record: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
