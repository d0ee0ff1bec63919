//! The on-disk order store.
//!
//! One text file per order, named `<order id>.txt`, living in exactly one of four sibling directories whose names
//! encode the order's state (`ordered/`, `progressing/`, `ready/`, `collected/`). The directory + filename pair is
//! the authoritative persisted state; the `State:` header inside the file is rewritten on each transition as a
//! debugging echo.
//!
//! The store is not thread-safe by contract. The hub is the only writer and performs every file operation inside its
//! serialised region.

use std::path::{Path, PathBuf};

use log::*;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

use crate::order_types::{OrderId, OrderState};

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("No order file exists for order {id} in {dir}/")]
    NotFound { id: OrderId, dir: &'static str },
    #[error("An order file for order {id} already exists in {dir}/")]
    AlreadyExists { id: OrderId, dir: &'static str },
    #[error("Order storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct OrderFileStore {
    root: PathBuf,
}

impl OrderFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self, state: OrderState) -> PathBuf {
        self.root.join(state.dir_name())
    }

    fn order_file_path(&self, state: OrderState, id: OrderId) -> PathBuf {
        self.state_dir(state).join(format!("{}.txt", id.value()))
    }

    /// Creates the four state directories (idempotent). Called once at startup, before any other operation.
    pub async fn ensure_directories(&self) -> Result<(), OrderStoreError> {
        for state in OrderState::ALL {
            fs::create_dir_all(self.state_dir(state)).await?;
        }
        Ok(())
    }

    /// Writes a brand-new order file. Fails with [`OrderStoreError::AlreadyExists`] if the id already has a file in
    /// this directory, which would indicate an id-counter defect.
    pub async fn create(&self, state: OrderState, id: OrderId, body: &str) -> Result<(), OrderStoreError> {
        let path = self.order_file_path(state, id);
        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(OrderStoreError::AlreadyExists { id, dir: state.dir_name() });
            },
            Err(e) => return Err(e.into()),
        };
        file.write_all(body.as_bytes()).await?;
        file.flush().await?;
        trace!("🗃️ Created order file {}", path.display());
        Ok(())
    }

    /// Returns the body of the order's file in the given state directory.
    pub async fn read(&self, state: OrderState, id: OrderId) -> Result<String, OrderStoreError> {
        let path = self.order_file_path(state, id);
        match fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OrderStoreError::NotFound { id, dir: state.dir_name() })
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrites the first line of the order's file to encode `new_state`, then moves the file from the source state
    /// directory to the target one.
    ///
    /// The header rewrite goes through a temporary file that is renamed over the original, and the move itself is a
    /// single `rename`, so at every instant exactly one copy of the order exists on disk and readers can never see
    /// the same id in two directories. A crash between the two renames leaves the file in the source directory with
    /// an updated header; the directory stays authoritative.
    pub async fn update_and_move(
        &self,
        id: OrderId,
        new_state: OrderState,
        from: OrderState,
        to: OrderState,
    ) -> Result<(), OrderStoreError> {
        let source = self.order_file_path(from, id);
        let target = self.order_file_path(to, id);
        if fs::try_exists(&target).await? {
            return Err(OrderStoreError::AlreadyExists { id, dir: to.dir_name() });
        }
        let body = match fs::read_to_string(&source).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OrderStoreError::NotFound { id, dir: from.dir_name() });
            },
            Err(e) => return Err(e.into()),
        };
        let rest = body.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
        let updated = format!("State: {new_state}\n{rest}");
        // The .tmp suffix keeps the scratch file invisible to list_ids.
        let scratch = source.with_extension("txt.tmp");
        fs::write(&scratch, updated).await?;
        fs::rename(&scratch, &source).await?;
        fs::rename(&source, &target).await?;
        debug!("🗃️ Moved order {id} from {}/ to {}/", from.dir_name(), to.dir_name());
        Ok(())
    }

    /// All order ids present in the given state directory, in ascending order. Files whose names do not parse as
    /// `<integer>.txt` are skipped. A missing directory is treated as empty.
    pub async fn list_ids(&self, state: OrderState) -> Result<Vec<OrderId>, OrderStoreError> {
        let dir = self.state_dir(state);
        if !fs::try_exists(&dir).await? {
            warn!("🗃️ {} does not exist yet; treating it as empty", dir.display());
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            match name.strip_suffix(".txt").and_then(|stem| stem.parse::<i64>().ok()) {
                Some(id) => ids.push(OrderId(id)),
                None => debug!("🗃️ Skipping non-order file {name} in {}/", state.dir_name()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
