//! Command-line interface for Foodgram.
//!
//! `serve` runs the HTTP API; the remaining commands bootstrap accounts and
//! catalog data directly against the database.

mod commands;

use clap::{Parser, Subcommand};

/// Foodgram - recipe sharing backend
#[derive(Parser)]
#[command(name = "foodgram")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "server")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an account without going through the API
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Read from FOODGRAM_NEW_PASSWORD when omitted
        #[arg(long, env = "FOODGRAM_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List registered accounts
    #[command(alias = "users")]
    ListUsers,

    /// Add an ingredient, creating its measurement unit if needed
    AddIngredient {
        name: String,
        /// Measurement unit, e.g. "g" or "pcs"
        unit: String,
    },

    /// Add a recipe tag
    AddTag {
        name: String,
        slug: String,
        /// Hex color such as #E26C2D
        #[arg(long)]
        color: Option<String>,
    },
}

pub use commands::*;
