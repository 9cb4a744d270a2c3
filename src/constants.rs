// src/constants.rs
//
// Application-wide constants extracted from magic numbers throughout the codebase.
// Each constant is documented with its purpose and usage context.

/// Number of snapshots kept per note, newest first.
///
/// Older snapshots are dropped silently when a new one is prepended.
///
/// Used in: `application/version_ledger.rs`
pub const MAX_NOTE_VERSIONS: usize = 10;

/// Maximum number of answer options a choice question may carry (A-D).
///
/// Used in: `application/record_store.rs`, `infrastructure/markdown/references.rs`
pub const MAX_QUESTION_OPTIONS: usize = 4;

/// Letters used to label question options in quoted transcripts.
pub const OPTION_LETTERS: [&str; MAX_QUESTION_OPTIONS] = ["A", "B", "C", "D"];

/// Folder a note lands in when its folder path is empty.
///
/// Declaring this folder explicitly is a no-op, it only exists implicitly.
///
/// Used in: `application/tree_organizer.rs`, `application/record_store.rs`
pub const UNCATEGORIZED_FOLDER: &str = "Uncategorized";

/// Display name for notes without a title.
///
/// Used in: `application/tree_organizer.rs`
pub const UNTITLED_NOTE: &str = "Untitled";

/// Review interval unit in hours (one day).
///
/// A `good` rating schedules `(review_count + 1)` units ahead, a `bad`
/// rating half a unit.
///
/// Used in: `application/review_scheduler.rs`
pub const REVIEW_BASE_INTERVAL_HOURS: i64 = 24;

/// Placeholder namespace for protected math expressions during Markdown parsing.
///
/// Placeholders are ASCII alphanumeric only so the Markdown parser passes them
/// through untouched. If the input already contains this prefix a numeric
/// suffix is appended until the namespace is unique for that input.
///
/// Used in: `infrastructure/markdown/renderer.rs`
pub const MATH_PLACEHOLDER_BASE: &str = "nxmathph";

/// Placeholder namespace for citation tokens, distinct from the math namespace.
///
/// Used in: `infrastructure/markdown/references.rs`
pub const REF_PLACEHOLDER_BASE: &str = "nxrefph";

/// Fragment returned when there is nothing to render.
///
/// Used in: `infrastructure/markdown/renderer.rs`, `infrastructure/config.rs`
pub const EMPTY_STATE_HTML: &str = r#"<p class="empty-state">Nothing to display yet.</p>"#;

/// Format version written into backup documents and the JSON store.
///
/// Used in: `application/record_store.rs`
pub const BACKUP_FORMAT_VERSION: u32 = 3;

/// Directory name below the platform config/data dirs.
///
/// Used in: `infrastructure/config.rs`
pub const APP_DIR_NAME: &str = "nexus-study";
