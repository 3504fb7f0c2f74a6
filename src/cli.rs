//! Command-line interface parsing for the provider probe
//!
//! This module handles parsing of CLI arguments using clap: one subcommand
//! per provider, plus the pure helpers that map argument strings onto the
//! providers' closed enums.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::providers::feed::FeedKind;
use crate::providers::songlink::EntityKind;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified feed kind is not recognized
    #[error("Invalid feed kind: '{0}'. Valid kinds: anime-list, anime-history, manga-list, manga-history")]
    InvalidFeedKind(String),

    /// The specified entity type is not recognized
    #[error("Invalid entity type: '{0}'. Valid types: song, album")]
    InvalidEntityKind(String),
}

/// Tsuki provider probe - query the bot's external services from the shell
#[derive(Parser, Debug)]
#[command(name = "tsuki-providers")]
#[command(about = "Query the Tsuki bot's provider clients from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One subcommand per provider client
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether one or more services are up
    Status {
        /// Hosts to check; URLs are accepted and normalized
        #[arg(required = true)]
        hosts: Vec<String>,
    },

    /// Resolve a song or album into links on every platform
    Song {
        /// Direct link to a track or album
        url: Option<String>,

        /// Platform name (e.g. spotify), used with --type and --id
        #[arg(long)]
        platform: Option<String>,

        /// Entity type: song or album
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Platform-specific entity id
        #[arg(long)]
        id: Option<String>,
    },

    /// Look up the pronouns registered for a platform account
    Pronouns {
        /// Platform the account lives on (e.g. discord)
        platform: String,
        /// Platform-specific account id
        id: String,
    },

    /// Fetch a user's anime/manga list feed
    Feed {
        /// List owner's username
        user: String,

        /// Feed kind: anime-list, anime-history, manga-list, manga-history
        #[arg(long, default_value = "anime-list")]
        kind: String,
    },

    /// Look up metadata for a hex color
    Color {
        /// Hex color, with or without a leading '#'
        hex: String,
    },

    /// Search series metadata
    Media {
        /// Title text to search for
        search: String,

        /// Search the manga catalog instead of anime
        #[arg(long)]
        manga: bool,
    },
}

/// Parses a feed kind argument into a FeedKind.
///
/// # Arguments
/// * `s` - The feed kind string from CLI
///
/// # Returns
/// * `Ok(FeedKind)` if the string matches a valid kind
/// * `Err(CliError::InvalidFeedKind)` if the string doesn't match
pub fn parse_feed_kind(s: &str) -> Result<FeedKind, CliError> {
    match s {
        "anime-list" => Ok(FeedKind::AnimeList),
        "anime-history" => Ok(FeedKind::AnimeHistory),
        "manga-list" => Ok(FeedKind::MangaList),
        "manga-history" => Ok(FeedKind::MangaHistory),
        _ => Err(CliError::InvalidFeedKind(s.to_string())),
    }
}

/// Parses an entity type argument into an EntityKind.
pub fn parse_entity_kind(s: &str) -> Result<EntityKind, CliError> {
    match s {
        "song" => Ok(EntityKind::Song),
        "album" => Ok(EntityKind::Album),
        _ => Err(CliError::InvalidEntityKind(s.to_string())),
    }
}
