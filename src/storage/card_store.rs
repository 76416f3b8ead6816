//! JSON file storage for card state and review history
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── config.toml     # Optional scheduler configuration
//! ├── cards.json      # Array of all card states
//! └── reviews.jsonl   # One review record per line, oldest first
//! ```
//!
//! The scheduler never calls into this module. Callers load the cards into a
//! `Scheduler`, run operations, and write the results back.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, SchedulerConfig};
use crate::scheduler::{CardState, NewCard, ReviewRecord, Scheduler, SchedulerError};

#[derive(Error, Debug)]
pub enum CardStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Could not determine a data directory")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, CardStoreError>;

/// Storage manager for card records
pub struct CardStore {
    data_dir: PathBuf,
}

impl CardStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Platform data directory, e.g. ~/.local/share/lexicard
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|d| d.join("lexicard"))
            .ok_or(CardStoreError::NoDataDir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn cards_path(&self) -> PathBuf {
        self.data_dir.join("cards.json")
    }

    fn reviews_path(&self) -> PathBuf {
        self.data_dir.join("reviews.jsonl")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    /// Create the data directory and an empty cards.json
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let cards_path = self.cards_path();
        if !cards_path.exists() {
            let empty: Vec<CardState> = Vec::new();
            fs::write(&cards_path, serde_json::to_string_pretty(&empty)?)?;
        }

        Ok(())
    }

    // ==================== Cards ====================

    pub fn load_cards(&self) -> Result<Vec<CardState>> {
        let cards_path = self.cards_path();
        if !cards_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&cards_path)?;
        let cards: Vec<CardState> = serde_json::from_str(&content)?;
        Ok(cards)
    }

    /// Replace cards.json with `cards`, sorted by id for stable diffs
    pub fn save_cards<'a, I>(&self, cards: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CardState>,
    {
        self.init()?;

        let mut cards: Vec<&CardState> = cards.into_iter().collect();
        cards.sort_by_key(|c| c.id);

        // Write to a sibling file first so a crash never leaves half a file
        let tmp_path = self.data_dir.join("cards.json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(&cards)?)?;
        fs::rename(&tmp_path, self.cards_path())?;

        log::debug!("Saved {} cards to {:?}", cards.len(), self.cards_path());
        Ok(())
    }

    /// Load the configuration and every stored card into a fresh scheduler
    pub fn open_scheduler(&self) -> Result<Scheduler> {
        let config = SchedulerConfig::load(&self.config_path())?;
        let mut scheduler = Scheduler::new(config);
        let cards = self.load_cards()?;
        scheduler.load(cards.into_iter().map(NewCard::from))?;
        Ok(scheduler)
    }

    // ==================== Review History ====================

    pub fn append_review(&self, record: &ReviewRecord) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.reviews_path())?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    /// Review records in file order, optionally for a single card.
    /// Lines that fail to parse are skipped with a warning.
    pub fn load_reviews(&self, card_id: Option<Uuid>) -> Result<Vec<ReviewRecord>> {
        let path = self.reviews_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ReviewRecord>(&line) {
                Ok(record) => {
                    if card_id.map_or(true, |id| record.card_id == id) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping unparseable review at {:?}:{}: {}", path, line_no + 1, e);
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ReviewSubmission;
    use tempfile::TempDir;

    fn create_test_store() -> (CardStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = CardStore::new(temp_dir.path().join("data"));
        (store, temp_dir)
    }

    #[test]
    fn test_empty_store() {
        let (store, _temp) = create_test_store();
        assert!(store.load_cards().unwrap().is_empty());
        assert!(store.load_reviews(None).unwrap().is_empty());

        let scheduler = store.open_scheduler().unwrap();
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let (store, _temp) = create_test_store();

        let mut scheduler = store.open_scheduler().unwrap();
        let id = Uuid::new_v4();
        scheduler.add_card(NewCard::new(id, "Hola")).unwrap();
        let outcome = scheduler.apply_review(id, ReviewSubmission::new(5)).unwrap();
        store.save_cards(scheduler.cards()).unwrap();

        let reopened = store.open_scheduler().unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&id), Some(&outcome.card));
        assert_eq!(reopened.search("ho", 10).len(), 1);
    }

    #[test]
    fn test_review_history() {
        let (store, _temp) = create_test_store();

        let mut scheduler = Scheduler::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        scheduler.add_card(NewCard::new(first, "uno")).unwrap();
        scheduler.add_card(NewCard::new(second, "dos")).unwrap();

        for (id, quality) in [(first, 4), (second, 1), (first, 2)] {
            let outcome = scheduler.apply_review(id, ReviewSubmission::new(quality)).unwrap();
            store.append_review(&outcome.record).unwrap();
        }

        let all = store.load_reviews(None).unwrap();
        assert_eq!(all.len(), 3);

        let history = store.load_reviews(Some(first)).unwrap();
        let qualities: Vec<i32> = history.iter().map(|r| r.quality).collect();
        assert_eq!(qualities, vec![4, 2]);
    }

    #[test]
    fn test_corrupt_review_lines_are_skipped() {
        let (store, _temp) = create_test_store();
        store.init().unwrap();
        fs::write(store.reviews_path(), "not json\n\n").unwrap();

        assert!(store.load_reviews(None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ids_in_file_are_rejected() {
        let (store, _temp) = create_test_store();

        let mut scheduler = Scheduler::default();
        let id = Uuid::new_v4();
        let card = scheduler.add_card(NewCard::new(id, "uno")).unwrap();
        store.save_cards([&card, &card]).unwrap();

        assert!(matches!(
            store.open_scheduler(),
            Err(CardStoreError::Scheduler(SchedulerError::DuplicateId(_)))
        ));
    }
}
