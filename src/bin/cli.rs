//! Command-line driver for the shengci vocabulary trainer

use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use shengci::{
    collection_stats, compose_session, due_words, search_words, Folder, SessionConfig,
    TestMode, TestSession, VocabStorage, Word,
};

#[derive(Parser)]
#[command(name = "shengci", about = "Vocabulary trainer with spaced repetition", version)]
struct Cli {
    /// Use a specific data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage folders
    #[command(subcommand)]
    Folder(FolderCommand),

    /// Add a word to a folder
    Add {
        /// The word in Chinese characters
        chinese: String,
        /// Pinyin romanization
        pinyin: String,
        /// English meaning
        english: String,
        /// Folder name (case-insensitive prefix match)
        #[arg(long)]
        folder: String,
    },

    /// List words
    List {
        /// Filter by folder name
        #[arg(long)]
        folder: Option<String>,
        /// Filter by a search query (Chinese, English, or pinyin)
        #[arg(long)]
        query: Option<String>,
    },

    /// List words due for review
    Due {
        /// Filter by folder name
        #[arg(long)]
        folder: Option<String>,
    },

    /// Show collection statistics
    Stats {
        /// Filter by folder name
        #[arg(long)]
        folder: Option<String>,
    },

    /// Run a study session
    Study {
        /// Folder name (case-insensitive prefix match)
        folder: String,
        /// Word selection mode
        #[arg(long, value_enum, default_value = "normal")]
        mode: StudyMode,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    /// Create a new folder
    Add { name: String },
    /// List folders with word counts
    List,
    /// Delete a folder and every word in it
    Delete { name: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StudyMode {
    Normal,
    Unseen,
    Learned,
}

impl From<StudyMode> for TestMode {
    fn from(mode: StudyMode) -> Self {
        match mode {
            StudyMode::Normal => TestMode::Normal,
            StudyMode::Unseen => TestMode::Unseen,
            StudyMode::Learned => TestMode::Learned,
        }
    }
}

fn open_storage(data_dir: Option<PathBuf>) -> anyhow::Result<VocabStorage> {
    let base = match data_dir {
        Some(dir) => dir,
        None => VocabStorage::default_data_dir()?,
    };
    let storage = VocabStorage::new(base);
    storage.init()?;
    Ok(storage)
}

/// Resolve a folder by case-insensitive name prefix.
fn find_folder(storage: &VocabStorage, name: &str) -> anyhow::Result<Folder> {
    let lower = name.to_lowercase();
    storage
        .load_folders()?
        .into_iter()
        .find(|f| f.name.to_lowercase().starts_with(&lower))
        .with_context(|| format!("no folder matching '{}'", name))
}

fn folder_pool(storage: &VocabStorage, folder: Option<&str>) -> anyhow::Result<Vec<Word>> {
    match folder {
        Some(name) => {
            let folder = find_folder(storage, name)?;
            Ok(storage.words_in_folder(folder.id)?)
        }
        None => Ok(storage.load_words()?),
    }
}

fn print_word(word: &Word) {
    println!(
        "{}  {}  {}  [{}]  practiced {}",
        word.chinese,
        word.pinyin,
        word.english,
        word.status.label(),
        word.practiced_count
    );
}

fn run_study(storage: &VocabStorage, folder: &Folder, mode: TestMode) -> anyhow::Result<()> {
    let pool = storage.words_in_folder(folder.id)?;
    let mut rng = rand::thread_rng();
    let words = compose_session(pool, mode, &SessionConfig::default(), &mut rng, Utc::now());

    if words.is_empty() {
        println!("No words to test in '{}'.", folder.name);
        return Ok(());
    }

    let total = words.len();
    let mut session = TestSession::new(folder.id, mode, words, Utc::now());
    let stdin = io::stdin();
    let mut line = String::new();

    while let Some(word) = session.current().cloned() {
        println!();
        println!("{}  ({})", word.chinese, word.pinyin);
        print!("Press Enter to reveal... ");
        io::stdout().flush()?;
        line.clear();
        stdin.lock().read_line(&mut line)?;

        println!("{}", word.english);
        print!("Did you know it? [y/n] ");
        io::stdout().flush()?;
        line.clear();
        stdin.lock().read_line(&mut line)?;
        let correct = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");

        if let Some(updated) = session.record_answer(correct, Utc::now()) {
            storage.update_word(&updated)?;
        }
    }

    let score = session.score();
    println!();
    println!("Done: {}/{} correct ({}%)", score.score, total, score.percentage);
    if !session.incorrect_words.is_empty() {
        println!("To review again:");
        for word in &session.incorrect_words {
            println!("  {}  {}  {}", word.chinese, word.pinyin, word.english);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let storage = open_storage(cli.data_dir)?;

    match cli.command {
        Command::Folder(FolderCommand::Add { name }) => {
            let folder = Folder::new(name, Utc::now());
            storage.add_folder(folder.clone())?;
            println!("Created folder '{}'", folder.name);
        }
        Command::Folder(FolderCommand::List) => {
            for folder in storage.load_folders()? {
                println!("{}  ({} words)", folder.name, folder.word_count);
            }
        }
        Command::Folder(FolderCommand::Delete { name }) => {
            let folder = find_folder(&storage, &name)?;
            storage.delete_folder(folder.id)?;
            println!("Deleted folder '{}' and its words", folder.name);
        }
        Command::Add {
            chinese,
            pinyin,
            english,
            folder,
        } => {
            let folder = find_folder(&storage, &folder)?;
            let word = Word::new(chinese, pinyin, english, folder.id, Utc::now());
            storage.add_word(word.clone())?;
            println!("Added '{}' to '{}'", word.chinese, folder.name);
        }
        Command::List { folder, query } => {
            let words = folder_pool(&storage, folder.as_deref())?;
            let filtered = match query.as_deref() {
                Some(query) => search_words(&words, query),
                None => words.iter().collect(),
            };
            for word in filtered {
                print_word(word);
            }
        }
        Command::Due { folder } => {
            let words = folder_pool(&storage, folder.as_deref())?;
            for word in due_words(&words, Utc::now()) {
                print_word(word);
            }
        }
        Command::Stats { folder } => {
            let words = folder_pool(&storage, folder.as_deref())?;
            let stats = collection_stats(&words, Utc::now());
            println!("total:        {}", stats.total_words);
            println!("new:          {}", stats.new_words);
            println!("learned:      {}", stats.learned_words);
            println!("needs review: {}", stats.needs_review_words);
            println!("due now:      {}", stats.due_words);
        }
        Command::Study { folder, mode } => {
            let folder = find_folder(&storage, &folder)?;
            run_study(&storage, &folder, mode.into())?;
        }
    }

    Ok(())
}
