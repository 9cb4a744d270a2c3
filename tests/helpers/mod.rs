use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use nexus_study::application::record_store::{RecordStore, StoreState};
use nexus_study::application::SystemClock;
use nexus_study::cli::args::Args;
use nexus_study::domain::{Note, Question};
use nexus_study::infrastructure::json_store::write_document;
use nexus_study::infrastructure::{Config, JsonFileStore};
use nexus_study::util::testing::{note, question};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture for a store file and config in a temporary directory
#[allow(dead_code)]
pub struct TestStore {
    _temp_dir: TempDir,
    pub store_path: PathBuf,
    pub config_path: PathBuf,
}

#[allow(dead_code)]
impl TestStore {
    /// Empty store with a default config next to it
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let store_path = temp_dir.path().join("store.json");
        let config_path = temp_dir.path().join("config.toml");
        Config::create_default(&config_path)?;

        Ok(Self {
            _temp_dir: temp_dir,
            store_path,
            config_path,
        })
    }

    /// Store seeded with the golden dataset
    pub fn seeded() -> Result<Self> {
        let fixture = Self::new()?;
        let state = golden_state();
        write_document(&fixture.store_path, &state.to_document(Utc::now()))?;
        Ok(fixture)
    }

    pub fn open(&self) -> Result<RecordStore<JsonFileStore>> {
        Ok(RecordStore::open(
            JsonFileStore::new(&self.store_path),
            SystemClock,
        )?)
    }

    /// Path for an extra file inside the fixture directory
    pub fn file(&self, name: &str) -> PathBuf {
        self._temp_dir.path().join(name)
    }

    /// Run the CLI against this store and capture its output
    pub fn run(&self, command: &[&str]) -> Result<String> {
        let store = self.store_path.to_string_lossy().to_string();
        let config = self.config_path.to_string_lossy().to_string();
        let mut argv = vec!["nexus-study", "--store", store.as_str(), "--config", config.as_str()];
        argv.extend_from_slice(command);

        let args = Args::try_parse_from(argv)?;
        let mut out = Vec::new();
        nexus_study::execute(args, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

/// Known ids in the golden dataset
#[allow(dead_code)]
pub mod ids {
    pub const Q_DUE: &str = "q-due";
    pub const Q_LATER: &str = "q-later";
    pub const Q_OVERDUE: &str = "q-overdue";

    pub const N_LIMITS: &str = "n-limits";
    pub const N_VECTORS: &str = "n-vectors";
    pub const N_LOOSE: &str = "n-loose";
    pub const N_CITING: &str = "n-citing";
}

fn golden_question(id: &str, subject: &str, text: &str) -> Question {
    let mut q = question(id);
    q.subject = subject.to_string();
    q.question_text = text.to_string();
    q
}

fn golden_note(id: &str, folder: &str, title: &str, content: &str) -> Note {
    let mut n = note(id, folder, title);
    n.content = content.to_string();
    n
}

/// Three questions (two due), four notes and one empty declared folder
pub fn golden_state() -> StoreState {
    let now = Utc::now();

    let mut due = golden_question(ids::Q_DUE, "Calculus", "Derivative of $x^2$?");
    due.next_review_at = now - Duration::hours(1);
    let mut overdue = golden_question(ids::Q_OVERDUE, "Algebra", "Solve $2x = 4$");
    overdue.next_review_at = now - Duration::days(3);
    let mut later = golden_question(ids::Q_LATER, "Calculus", "Limit of sin(x)/x");
    later.next_review_at = now + Duration::days(2);
    later.review_count = 2;

    let notes = vec![
        golden_note(
            ids::N_LIMITS,
            "Math/Calculus",
            "Limits",
            "# Limits\n\nThe limit $\\lim_{x \\to 0} \\frac{\\sin x}{x} = 1$.\n\n$$\\int_0^1 x\\,dx$$",
        ),
        golden_note(ids::N_VECTORS, "Math", "Vectors", "Dot product $a \\cdot b$."),
        golden_note(ids::N_LOOSE, "", "Scratch", "loose thoughts"),
        golden_note(
            ids::N_CITING,
            "Math/Calculus",
            "Derivatives review",
            "Mistake:\n\n::ref[q-due]::\n\nand a missing one ::ref[gone]::",
        ),
    ];

    StoreState {
        questions: vec![due, overdue, later],
        notes,
        folders: vec!["Math".to_string(), "Math/Calculus".to_string(), "Physics".to_string()],
        settings: Some(serde_json::json!({"theme": "dark"})),
    }
}
