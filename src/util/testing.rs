// src/util/testing.rs

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::env;
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::clock::Clock;
use crate::application::record_store::{StorePersistence, StoreState};
use crate::domain::{Difficulty, DomainError, Note, Question, QuestionAnalysis, QuestionKind};

/// Question fixture, due now, never reviewed.
pub fn question(id: &str) -> Question {
    let now = Utc::now();
    Question {
        id: id.to_string(),
        subject: "Math".to_string(),
        kind: QuestionKind::SingleChoice,
        tags: vec!["arithmetic".to_string()],
        question_text: "What is 2 + 2?".to_string(),
        question_image: None,
        options: Some(vec!["3".to_string(), "4".to_string(), "5".to_string()]),
        wrong_answer: "3".to_string(),
        correct_answer: "4".to_string(),
        explanation: "Add the two numbers.".to_string(),
        ai_diagnosis: String::new(),
        analysis: QuestionAnalysis {
            core_concept: "Addition".to_string(),
            ..QuestionAnalysis::default()
        },
        user_notes: "Slow down on easy ones.".to_string(),
        added_at: now,
        updated_at: None,
        next_review_at: now,
        review_count: 0,
        difficulty_rating: Difficulty::default(),
    }
}

/// Note fixture with body `Body of {title}` and no history.
pub fn note(id: &str, folder: &str, title: &str) -> Note {
    let now = Utc::now();
    Note {
        id: id.to_string(),
        folder: folder.to_string(),
        title: title.to_string(),
        content: format!("Body of {title}"),
        tags: vec![],
        created_at: now,
        updated_at: now,
        versions: vec![],
    }
}

/// Clock frozen at a settable instant. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01T00:00:00Z
        Self::at(Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// In-memory persistence double
///
/// Records the last saved state and how many saves were attempted.
///
/// # Examples
///
/// ```
/// use nexus_study::application::record_store::StorePersistence;
/// use nexus_study::util::testing::MockPersistence;
///
/// let mut mock = MockPersistence::builder().failing_saves().build();
/// assert!(mock.save(&Default::default()).is_err());
/// assert_eq!(mock.save_attempts(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockPersistence {
    initial: Option<StoreState>,
    fail_load: bool,
    fail_save: bool,
    saved: Option<StoreState>,
    save_attempts: usize,
    log: Vec<String>,
}

impl MockPersistence {
    pub fn builder() -> MockPersistenceBuilder {
        MockPersistenceBuilder::default()
    }

    pub fn saved(&self) -> Option<&StoreState> {
        self.saved.as_ref()
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts
    }

    /// `load`/`save` calls in order
    pub fn calls(&self) -> Vec<String> {
        self.log.clone()
    }
}

impl StorePersistence for MockPersistence {
    fn load(&mut self) -> Result<Option<StoreState>, DomainError> {
        self.log.push("load".to_string());
        if self.fail_load {
            return Err(DomainError::Persistence("load failed".to_string()));
        }
        Ok(self.initial.clone())
    }

    fn save(&mut self, state: &StoreState) -> Result<(), DomainError> {
        self.log.push("save".to_string());
        self.save_attempts += 1;
        if self.fail_save {
            return Err(DomainError::Persistence("disk full".to_string()));
        }
        self.saved = Some(state.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockPersistenceBuilder {
    initial: Option<StoreState>,
    fail_load: bool,
    fail_save: bool,
}

impl MockPersistenceBuilder {
    /// State handed out by `load`
    pub fn with_state(mut self, state: StoreState) -> Self {
        self.initial = Some(state);
        self
    }

    pub fn failing_loads(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn build(self) -> MockPersistence {
        MockPersistence {
            initial: self.initial,
            fail_load: self.fail_load,
            fail_save: self.fail_save,
            ..MockPersistence::default()
        }
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["pulldown_cmark"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
