use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, FuzzySelect};
use dotenvy::dotenv;
use happyshop_engine::{OrderFileStore, OrderHub, OrderIdGenerator, SqliteStockDb};
use log::info;

mod cli;
mod clients;
mod config;

use cli::{Arguments, Command};
use clients::{customer::CustomerConsole, picker::PickerConsole, tracker::TrackerBoard};
use config::ShopConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let mut config = ShopConfig::from_env_or_default();
    if let Some(root) = args.orders_root {
        config.orders_root = root;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let stock = SqliteStockDb::new_with_url(&config.database_url).await?;
    if matches!(args.command, Some(Command::Seed)) {
        stock.seed_demo_catalogue().await?;
        println!("Catalogue seeded into {}.", config.database_url);
        stock.close().await;
        return Ok(());
    }
    if config.seed_demo {
        stock.seed_demo_catalogue().await?;
    }

    let store = OrderFileStore::new(&config.orders_root);
    store.ensure_directories().await?;
    let ids = OrderIdGenerator::initialize(&store).await?;
    let hub = Arc::new(OrderHub::new(store, ids, config.grace_period));
    hub.initialize().await?;

    info!(
        "🚀️ HappyShop is open. Orders live in {}, catalogue at {}",
        config.orders_root.display(),
        config.database_url
    );

    let tracker = TrackerBoard::start(&hub).await;
    let picker = PickerConsole::start(Arc::clone(&hub)).await;
    let mut customer = CustomerConsole::new(stock.clone(), Arc::clone(&hub));

    let theme = ColorfulTheme::default();
    const ROLES: [&str; 4] = ["Customer console", "Picker console", "Tracker board", "Exit"];
    loop {
        let i = FuzzySelect::with_theme(&theme).with_prompt("Select a role").items(&ROLES).default(0).interact()?;
        match ROLES[i] {
            "Customer console" => customer.run(&theme).await?,
            "Picker console" => picker.run(&theme).await?,
            "Tracker board" => println!("{}", tracker.render()),
            _ => break,
        }
    }
    stock.close().await;
    println!("Bye!");
    Ok(())
}
