use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use lexicard_lib::scheduler::{CardState, Scheduler};
use lexicard_lib::storage::CardStore;

/// Shared application state for CLI commands
pub struct App {
    pub store: CardStore,
    pub scheduler: Scheduler,
}

impl App {
    /// Open the store and load every card into a scheduler
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => CardStore::default_data_dir().context("Failed to get data directory")?,
        };

        let store = CardStore::new(data_dir);
        store.init().context("Failed to initialize card store")?;

        let scheduler = store
            .open_scheduler()
            .with_context(|| format!("Failed to load cards from {}", store.data_dir().display()))?;

        Ok(Self { store, scheduler })
    }

    /// Write all cards back to the store
    pub fn save(&self) -> Result<()> {
        self.store
            .save_cards(self.scheduler.cards())
            .context("Failed to save cards")
    }

    pub fn find_card(&self, id: Uuid) -> Result<&CardState> {
        self.scheduler
            .get(&id)
            .with_context(|| format!("No card with id {}", id))
    }
}
