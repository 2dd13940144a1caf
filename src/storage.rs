//! JSON-file persistence for the vocabulary collection
//!
//! Layout under the data directory:
//! ```text
//! shengci/
//! ├── words.json     # All words, scheduling state inline
//! └── folders.json   # All folders
//! ```
//!
//! Every bulk read runs the scheduling-state migration, so callers only
//! ever see fully initialized, valid words. Writes are whole-file,
//! last-writer-wins; sessions are single-user, single-device.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Folder, Word};
use crate::srs::state;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Word not found: {0}")]
    WordNotFound(Uuid),

    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage manager for words and folders.
pub struct VocabStorage {
    base_path: PathBuf,
}

impl VocabStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("shengci"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Initialize the storage directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    fn words_path(&self) -> PathBuf {
        self.base_path.join("words.json")
    }

    fn folders_path(&self) -> PathBuf {
        self.base_path.join("folders.json")
    }

    // ==================== Word Operations ====================

    /// Load all words, migrating legacy scheduling state in the process.
    pub fn load_words(&self) -> Result<Vec<Word>> {
        let path = self.words_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let words: Vec<Word> = serde_json::from_str(&content)?;

        let legacy = words
            .iter()
            .filter(|w| w.scheduling.state().is_none())
            .count();
        if legacy > 0 {
            log::info!("initializing scheduling state for {} legacy words", legacy);
        }

        Ok(state::migrate_batch(words, Utc::now()))
    }

    pub fn save_words(&self, words: &[Word]) -> Result<()> {
        self.init()?;
        fs::write(self.words_path(), serde_json::to_string_pretty(words)?)?;
        Ok(())
    }

    /// Add a word, initializing its scheduling state.
    pub fn add_word(&self, word: Word) -> Result<Vec<Word>> {
        let now = Utc::now();
        let word = state::validate(state::ensure_initialized(word, now), now);
        let folder_id = word.folder_id;

        let mut words = self.load_words()?;
        words.push(word);
        self.save_words(&words)?;
        self.refresh_folder_count(folder_id)?;

        Ok(words)
    }

    /// Replace a word by id, bumping its modification time.
    pub fn update_word(&self, word: &Word) -> Result<()> {
        let mut words = self.load_words()?;
        let pos = words
            .iter()
            .position(|w| w.id == word.id)
            .ok_or(StorageError::WordNotFound(word.id))?;

        let mut updated = word.clone();
        updated.updated_at = Utc::now();
        words[pos] = updated;

        self.save_words(&words)
    }

    pub fn delete_word(&self, word_id: Uuid) -> Result<()> {
        let mut words = self.load_words()?;
        let pos = words
            .iter()
            .position(|w| w.id == word_id)
            .ok_or(StorageError::WordNotFound(word_id))?;

        let folder_id = words[pos].folder_id;
        words.remove(pos);
        self.save_words(&words)?;
        self.refresh_folder_count(folder_id)
    }

    pub fn words_in_folder(&self, folder_id: Uuid) -> Result<Vec<Word>> {
        Ok(self
            .load_words()?
            .into_iter()
            .filter(|w| w.folder_id == folder_id)
            .collect())
    }

    // ==================== Folder Operations ====================

    pub fn load_folders(&self) -> Result<Vec<Folder>> {
        let path = self.folders_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let folders: Vec<Folder> = serde_json::from_str(&content)?;
        Ok(folders)
    }

    pub fn save_folders(&self, folders: &[Folder]) -> Result<()> {
        self.init()?;
        fs::write(
            self.folders_path(),
            serde_json::to_string_pretty(folders)?,
        )?;
        Ok(())
    }

    pub fn get_folder(&self, folder_id: Uuid) -> Result<Folder> {
        self.load_folders()?
            .into_iter()
            .find(|f| f.id == folder_id)
            .ok_or(StorageError::FolderNotFound(folder_id))
    }

    pub fn add_folder(&self, folder: Folder) -> Result<Vec<Folder>> {
        let mut folders = self.load_folders()?;
        folders.push(folder);
        self.save_folders(&folders)?;
        Ok(folders)
    }

    /// Delete a folder and every word in it.
    pub fn delete_folder(&self, folder_id: Uuid) -> Result<()> {
        let mut folders = self.load_folders()?;
        let before = folders.len();
        folders.retain(|f| f.id != folder_id);
        if folders.len() == before {
            return Err(StorageError::FolderNotFound(folder_id));
        }
        self.save_folders(&folders)?;

        let mut words = self.load_words()?;
        words.retain(|w| w.folder_id != folder_id);
        self.save_words(&words)
    }

    /// Recount a folder's words after an add or delete.
    fn refresh_folder_count(&self, folder_id: Uuid) -> Result<()> {
        let count = self.words_in_folder(folder_id)?.len();
        let mut folders = self.load_folders()?;
        if let Some(folder) = folders.iter_mut().find(|f| f.id == folder_id) {
            folder.word_count = count;
            folder.updated_at = Utc::now();
            self.save_folders(&folders)?;
        }
        Ok(())
    }
}
