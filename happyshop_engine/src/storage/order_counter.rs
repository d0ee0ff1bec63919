//! Process-wide order id allocation.
//!
//! Ids are monotonically increasing and never reused, even across restarts: initialisation takes the maximum of a
//! scan over all four state directories and a dedicated counter file persisted beside them. The counter file is what
//! keeps history alive when the `collected/` archive is emptied out-of-band.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicI64, Ordering},
};

use log::*;
use tokio::fs;

use crate::{
    order_types::{OrderId, OrderState},
    storage::{OrderFileStore, OrderStoreError},
};

pub const COUNTER_FILE_NAME: &str = ".order_counter";

#[derive(Debug)]
pub struct OrderIdGenerator {
    counter: AtomicI64,
    counter_file: PathBuf,
}

impl OrderIdGenerator {
    /// Scans the store and the persisted counter file and positions the counter at the highest id ever issued.
    pub async fn initialize(store: &OrderFileStore) -> Result<Self, OrderStoreError> {
        let mut highest = 0i64;
        for state in OrderState::ALL {
            let max_in_dir = store.list_ids(state).await?.into_iter().map(|id| id.value()).max().unwrap_or(0);
            highest = highest.max(max_in_dir);
        }
        let counter_file = store.root().join(COUNTER_FILE_NAME);
        let persisted = match fs::read_to_string(&counter_file).await {
            Ok(s) => s.trim().parse::<i64>().unwrap_or_else(|e| {
                warn!("🔢️ Ignoring unparseable order counter file {}: {e}", counter_file.display());
                0
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        let start = highest.max(persisted);
        info!("🔢️ Order counter initialised at {start}");
        Ok(Self { counter: AtomicI64::new(start), counter_file })
    }

    /// Returns the next fresh order id. Concurrent callers receive strictly distinct ids.
    ///
    /// The counter file is only a floor above the directory scan, so a failed write is logged rather than failing
    /// the order; every issued id also ends up as an order file, which the next scan will see.
    pub async fn next_id(&self) -> OrderId {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = fs::write(&self.counter_file, id.to_string()).await {
            warn!("🔢️ Could not persist order counter value {id}: {e}");
        }
        OrderId(id)
    }
}
