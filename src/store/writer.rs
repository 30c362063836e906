//! Single-writer serialization point for the symbol store (spec §4.3: "one
//! writer, many readers"). Parallel collectors submit batches over a bounded
//! `crossbeam_channel`; a dedicated thread drains it and is the only thing
//! that ever calls a `&mut SqliteStore` method, so SQLite never sees
//! concurrent writers, and a slow disk applies backpressure to the
//! collectors instead of an unbounded queue growing without limit.

use crate::model::{Reference, Symbol};
use crate::store::SqliteStore;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::thread::JoinHandle;
use tracing::{error, warn};

pub enum WriteCommand {
    ClearFile(String),
    Symbols(Vec<Symbol>),
    References(Vec<Reference>),
}

pub struct StoreWriter {
    tx: Sender<WriteCommand>,
    handle: Option<JoinHandle<()>>,
}

impl StoreWriter {
    /// Spawns the writer thread against a fresh connection to `db_path`.
    /// `queue_depth` bounds how many pending batches collectors may queue
    /// before `send` blocks, providing backpressure against slow disk I/O.
    pub fn spawn(db_path: PathBuf, queue_depth: usize) -> anyhow::Result<Self> {
        let (tx, rx): (Sender<WriteCommand>, Receiver<WriteCommand>) = bounded(queue_depth.max(1));
        let mut store = SqliteStore::open(&db_path)?;

        let handle = std::thread::Builder::new()
            .name("symbol-store-writer".into())
            .spawn(move || run_writer_loop(&mut store, rx))?;

        Ok(Self { tx, handle: Some(handle) })
    }

    pub fn sender(&self) -> Sender<WriteCommand> {
        self.tx.clone()
    }

    pub fn clear_file(&self, file_path: impl Into<String>) {
        if self.tx.send(WriteCommand::ClearFile(file_path.into())).is_err() {
            warn!("store writer channel closed, dropping clear_file command");
        }
    }

    pub fn submit_symbols(&self, symbols: Vec<Symbol>) {
        if symbols.is_empty() {
            return;
        }
        if self.tx.send(WriteCommand::Symbols(symbols)).is_err() {
            warn!("store writer channel closed, dropping symbol batch");
        }
    }

    pub fn submit_references(&self, references: Vec<Reference>) {
        if references.is_empty() {
            return;
        }
        if self.tx.send(WriteCommand::References(references)).is_err() {
            warn!("store writer channel closed, dropping reference batch");
        }
    }

    /// Drops the sender (closing the channel) and blocks until the writer
    /// thread has drained every queued command.
    pub fn shutdown(mut self) {
        drop(std::mem::replace(&mut self.tx, bounded(1).0));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_writer_loop(store: &mut SqliteStore, rx: Receiver<WriteCommand>) {
    for cmd in rx.iter() {
        let result = match cmd {
            WriteCommand::ClearFile(path) => store.clear_file(&path).map_err(anyhow::Error::from),
            WriteCommand::Symbols(symbols) => store.insert_symbols(&symbols).map_err(anyhow::Error::from),
            WriteCommand::References(references) => store.insert_references(&references).map_err(anyhow::Error::from),
        };
        if let Err(err) = result {
            error!(error = %err, "store writer: batch failed, continuing");
        }
    }
}
