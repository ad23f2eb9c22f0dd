//! Command-line surface over the category store.
//!
//! # Responsibility
//! - Define commands and global options.
//! - Render store results as text or JSON.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use movie_queue_core::{CategoryFilter, CategoryStore, ItemLedger, StoreError, ALL_CATEGORIES};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "movie-queue")]
#[command(about = "Keep movie queues by category and pop a random pick", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "MOVIE_QUEUE_DB", help = "Ledger database file")]
    pub db: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "MOVIE_QUEUE_LOG_DIR",
        help = "Absolute directory for log files"
    )]
    pub log_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "trace|debug|info|warn|error")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Show movies, optionally for one category")]
    List {
        #[arg(long, short, default_value = ALL_CATEGORIES, help = "Category name or `all`")]
        category: String,

        #[arg(long, help = "Print JSON instead of text")]
        json: bool,
    },

    #[command(about = "Add a movie to a category")]
    Add {
        #[arg(help = "Category name")]
        category: String,

        #[arg(help = "Movie title")]
        title: String,
    },

    #[command(about = "Remove and print a random movie from a category")]
    Pop {
        #[arg(help = "Category name")]
        category: String,
    },

    #[command(about = "Create a new, empty category")]
    AddCategory {
        #[arg(help = "Category name")]
        name: String,
    },

    #[command(about = "List category names")]
    Categories,
}

/// Failure while running one command.
#[derive(Debug)]
pub enum CliError {
    Store(StoreError),
    Json(serde_json::Error),
    Output(io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "failed to encode JSON: {err}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        Self::Output(value)
    }
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    categories: &'a BTreeMap<String, Vec<String>>,
}

/// Runs one command against an initialized store, writing to `out`.
pub fn execute<L: ItemLedger>(
    command: &Command,
    store: &mut CategoryStore<L>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::List { category, json } => {
            let view = store.filter_by_category(&CategoryFilter::parse(category));
            if *json {
                let text = serde_json::to_string_pretty(&ListOutput { categories: &view })?;
                writeln!(out, "{text}")?;
            } else {
                write_listing(out, &view)?;
            }
        }
        Command::Add { category, title } => {
            let item = store.add_item(category, title)?;
            writeln!(out, "Added \"{}\" to {} (#{})", item.title, item.category, item.id)?;
        }
        Command::Pop { category } => match store.remove_random_item(category)? {
            Some(item) => writeln!(out, "{}", item.title)?,
            None => writeln!(out, "Nothing to pop in {category}.")?,
        },
        Command::AddCategory { name } => {
            if store.add_category(name)? {
                writeln!(out, "Created category {}.", name.trim())?;
            } else {
                writeln!(out, "Category {} already exists or is blank.", name.trim())?;
            }
        }
        Command::Categories => {
            for name in store.categories() {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}

fn write_listing(out: &mut impl Write, view: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
    for (category, titles) in view {
        writeln!(out, "{}", display_name(category))?;
        if titles.is_empty() {
            writeln!(out, "  No movies added to this category yet.")?;
        }
        for title in titles {
            writeln!(out, "  - {title}")?;
        }
    }
    Ok(())
}

fn display_name(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movie_queue_core::{SqliteItemLedger, DEFAULT_CATEGORIES};

    fn run(store: &mut CategoryStore<SqliteItemLedger>, args: &[&str]) -> String {
        let cli = Cli::try_parse_from(std::iter::once("movie-queue").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        execute(&cli.command, store, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_then_list_one_category() {
        let mut store = CategoryStore::open_in_memory(DEFAULT_CATEGORIES).unwrap();
        run(&mut store, &["add", "comedy", "Airplane"]);

        let listing = run(&mut store, &["list", "--category", "comedy"]);
        assert_eq!(listing, "Comedy\n  - Airplane\n");
    }

    #[test]
    fn pop_on_empty_category_reports_nothing() {
        let mut store = CategoryStore::open_in_memory(DEFAULT_CATEGORIES).unwrap();
        let output = run(&mut store, &["pop", "drama"]);
        assert_eq!(output, "Nothing to pop in drama.\n");
    }

    #[test]
    fn json_listing_contains_every_category() {
        let mut store = CategoryStore::open_in_memory(DEFAULT_CATEGORIES).unwrap();
        run(&mut store, &["add-category", "  Horror "]);

        let output = run(&mut store, &["list", "--json"]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["categories"]["Horror"], serde_json::json!([]));
        assert_eq!(value["categories"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn blank_title_surfaces_store_error() {
        let mut store = CategoryStore::open_in_memory(DEFAULT_CATEGORIES).unwrap();
        let cli = Cli::try_parse_from(["movie-queue", "add", "drama", "  "]).unwrap();
        let mut out = Vec::new();

        let err = execute(&cli.command, &mut store, &mut out).unwrap_err();
        assert!(matches!(err, CliError::Store(StoreError::Validation(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn display_name_capitalizes_first_letter() {
        assert_eq!(display_name("drama"), "Drama");
        assert_eq!(display_name(""), "");
    }
}
