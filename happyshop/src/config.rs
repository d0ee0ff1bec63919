use std::{env, path::PathBuf, time::Duration};

use happyshop_engine::hub::DEFAULT_COLLECTED_GRACE_PERIOD;
use hs_common::helpers::parse_boolean_flag;
use log::*;

const DEFAULT_ORDERS_ROOT: &str = "orders";
const DEFAULT_DATABASE_URL: &str = "sqlite:happyshop.sqlite3";

#[derive(Clone, Debug)]
pub struct ShopConfig {
    /// Root directory holding the four order state directories and the order counter file.
    pub orders_root: PathBuf,
    /// URL of the SQLite product catalogue.
    pub database_url: String,
    /// How long collected orders stay visible to trackers.
    pub grace_period: Duration,
    /// If true, the demo catalogue is seeded into an empty database at startup.
    pub seed_demo: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            orders_root: PathBuf::from(DEFAULT_ORDERS_ROOT),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            grace_period: DEFAULT_COLLECTED_GRACE_PERIOD,
            seed_demo: true,
        }
    }
}

impl ShopConfig {
    pub fn from_env_or_default() -> Self {
        let orders_root =
            env::var("HS_ORDERS_ROOT").map(PathBuf::from).ok().unwrap_or_else(|| PathBuf::from(DEFAULT_ORDERS_ROOT));
        let database_url = env::var("HS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ HS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let grace_period = env::var("HS_GRACE_PERIOD_SECS")
            .map(|s| {
                s.parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for HS_GRACE_PERIOD_SECS. {e} Using the default, {}s, instead.",
                        DEFAULT_COLLECTED_GRACE_PERIOD.as_secs()
                    );
                    DEFAULT_COLLECTED_GRACE_PERIOD
                })
            })
            .ok()
            .unwrap_or(DEFAULT_COLLECTED_GRACE_PERIOD);
        let seed_demo = parse_boolean_flag(env::var("HS_SEED_DEMO").ok(), true);
        Self { orders_root, database_url, grace_period, seed_demo }
    }
}
