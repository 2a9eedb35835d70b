// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share most of their flags:
// - validate: fetch, parse and validate a sitemap (nothing is submitted)
// - submit: the same, then submit every URL to the Google Indexing API
//
// The shared flags live in CommonArgs and are pulled into both subcommands
// with #[command(flatten)].
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use sitemap_sentinel::config::{Config, DEFAULT_USER_AGENT};
use sitemap_sentinel::indexing::{RetryPolicy, SubmitOptions};

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-sentinel",
    version,
    about = "Validate XML sitemaps and submit their URLs to the Google Indexing API",
    long_about = "sitemap-sentinel fetches a sitemap, checks it against the sitemaps.org protocol \
                  and reports every problem it finds. With `submit`, a sitemap that validates \
                  cleanly has its URLs sent to the Google Indexing API, with retries for \
                  transient failures."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and validate a sitemap
    ///
    /// Example: sitemap-sentinel validate https://example.com/sitemap.xml
    Validate {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Validate a sitemap, then submit its URLs for indexing
    ///
    /// Example: sitemap-sentinel submit https://example.com/sitemap.xml --credentials token.json
    Submit {
        #[command(flatten)]
        common: CommonArgs,

        /// Credentials file: {"access_token": ...}, an authorized_user or a service_account JSON
        #[arg(long)]
        credentials: PathBuf,

        /// API calls per URL before giving up on transient errors
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,

        /// URLs per progress line in the log
        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        /// Pause between two URLs, in milliseconds
        #[arg(long, default_value_t = 200)]
        request_interval_ms: u64,
    },
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Sitemap URL (e.g., https://example.com/sitemap.xml)
    pub url: String,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// User-Agent header for sitemap and link requests
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Also check that every listed URL responds
    #[arg(long)]
    pub check_links: bool,

    /// Maximum concurrent link checks
    #[arg(long, default_value_t = 5)]
    pub max_workers: usize,

    /// Fetch and validate the sitemaps listed by a sitemap index
    #[arg(long)]
    pub expand_index: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    fn config(&self) -> Config {
        Config {
            request_timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            check_links: self.check_links,
            max_workers: self.max_workers,
            expand_index: self.expand_index,
            ..Config::default()
        }
    }
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Validate { common } | Commands::Submit { common, .. } => common,
        }
    }

    /// Builds the run configuration from the parsed flags.
    pub fn config(&self) -> Config {
        match self {
            Commands::Validate { common } => common.config(),
            Commands::Submit {
                common,
                credentials,
                max_attempts,
                batch_size,
                request_interval_ms,
            } => Config {
                submit: true,
                credentials_path: Some(credentials.clone()),
                submit_options: SubmitOptions {
                    retry: RetryPolicy {
                        max_attempts: (*max_attempts).max(1),
                        ..RetryPolicy::default()
                    },
                    request_interval: Duration::from_millis(*request_interval_ms),
                    batch_size: *batch_size,
                    ..SubmitOptions::default()
                },
                ..common.config()
            },
        }
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It copies the fields of another Args struct into this command
//    - So `validate --json` and `submit --json` both work without repeating code
//
// 2. What is ArgAction::Count?
//    - Each -v adds one: -v = 1, -vv = 2
//    - Handy for "more verbose" flags
//
// 3. Why ..Config::default()?
//    - Struct update syntax: fill the remaining fields from another value
//    - New Config fields get a default without touching this file
// -----------------------------------------------------------------------------
