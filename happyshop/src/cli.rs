use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "HappyShop order coordination demo")]
pub struct Arguments {
    /// Root directory for the order state directories. Overrides HS_ORDERS_ROOT.
    #[arg(short = 'o', long = "orders-root")]
    pub orders_root: Option<PathBuf>,
    /// URL of the SQLite product catalogue. Overrides HS_DATABASE_URL.
    #[arg(short = 'd', long = "database-url")]
    pub database_url: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive shop (the default).
    #[clap(name = "run")]
    Run,
    /// Seed the demo catalogue into the product database and exit.
    #[clap(name = "seed")]
    Seed,
}
