// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::record_store::RecordStore;
use crate::application::{review_scheduler, tree_organizer, SystemClock};
use crate::cli::args::{Args, Command};
use crate::domain::{BackupDocument, DomainError, TreeNode};
use crate::infrastructure::json_store::write_document;
use crate::infrastructure::markdown::ContentRenderer;
use crate::infrastructure::{Config, JsonFileStore, PageViewer};
use crate::ports::HtmlPresenter;
use crate::util::text::excerpt;

type Store = RecordStore<JsonFileStore>;

pub fn run(args: Args) -> Result<()> {
    let stdout = std::io::stdout();
    execute(args, &mut stdout.lock())
}

/// Run one command, writing its report to `out`.
pub fn execute<W: Write>(args: Args, out: &mut W) -> Result<()> {
    debug!(?args, "Starting nexus-study with arguments");

    // Initialize infrastructure
    let config = Config::discover(args.config.as_deref())?;
    let store_path = match args.store {
        Some(path) => {
            debug!(?path, "Using provided store path");
            path
        }
        None => config.store_path()?,
    };

    // Initialize application
    let mut store = RecordStore::open(JsonFileStore::new(&store_path), SystemClock)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;

    match args.command {
        Command::Render { note_id, page, open } => {
            render_note(&store, &config, &note_id, page, open, out)
        }
        Command::Tree { sort, query } => {
            print_tree(&store, sort.unwrap_or(config.tree.sort), query.as_deref(), out)
        }
        Command::Due => print_due(&store, out),
        Command::Rate {
            question_id,
            outcome,
        } => {
            info!(%question_id, ?outcome, "Rating question");
            store.rate_question(&question_id, outcome)?;
            if let Some(question) = store.question(&question_id) {
                writeln!(
                    out,
                    "{}: next review {} (reviews: {})",
                    question.id,
                    question.next_review_at.format("%Y-%m-%d %H:%M UTC"),
                    question.review_count
                )?;
            }
            Ok(())
        }
        Command::Folder { path } => {
            store.declare_folder(&path)?;
            writeln!(out, "{} folders declared", store.folders().len())?;
            Ok(())
        }
        Command::Versions { note_id } => print_versions(&store, &note_id, out),
        Command::Restore {
            note_id,
            version_id,
        } => {
            let note = store
                .note(&note_id)
                .ok_or_else(|| DomainError::NoteNotFound(note_id.clone()))?;
            if note.find_version(&version_id).is_none() {
                anyhow::bail!("Note {} has no version {}", note_id, version_id);
            }
            store.restore_version(&note_id, &version_id)?;
            info!(%note_id, %version_id, "Restored note version");
            writeln!(out, "Restored {} to version {}", note_id, version_id)?;
            Ok(())
        }
        Command::Import {
            file,
            strategy,
            dry_run,
        } => {
            let document = read_backup(&file)?;
            let preview = store.preview_import(&document);
            writeln!(
                out,
                "questions: {} ({} existing ids), notes: {} ({} existing ids), folders: {}, settings: {}",
                preview.question_count,
                preview.duplicate_questions,
                preview.note_count,
                preview.duplicate_notes,
                preview
                    .folder_count
                    .map_or_else(|| "unchanged".to_string(), |n| n.to_string()),
                if preview.has_settings { "replaced" } else { "unchanged" },
            )?;
            if dry_run {
                return Ok(());
            }
            store.import_backup(document, strategy)?;
            writeln!(
                out,
                "Imported with {:?}: {} questions, {} notes",
                strategy,
                store.questions().len(),
                store.notes().len()
            )?;
            Ok(())
        }
        Command::Export { file } => {
            write_document(&file, &store.export_backup())?;
            info!(path = ?file, "Exported backup");
            writeln!(out, "Exported to {}", file.display())?;
            Ok(())
        }
    }
}

fn render_note<W: Write>(
    store: &Store,
    config: &Config,
    note_id: &str,
    page: bool,
    open: bool,
    out: &mut W,
) -> Result<()> {
    let note = store
        .note(note_id)
        .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
    let presenter = HtmlPresenter::new(ContentRenderer::with_options(config.render_options()));

    if !page {
        writeln!(out, "{}", presenter.render_body(note, store))?;
        return Ok(());
    }

    let html = presenter.render_page(note, store);
    if open {
        let mut viewer = PageViewer::new();
        let path = viewer.write_page(&html)?;
        viewer.open_in_browser(&path)?;
        writeln!(out, "{}", path.display())?;
    } else {
        writeln!(out, "{}", html)?;
    }
    Ok(())
}

fn print_tree<W: Write>(
    store: &Store,
    sort: application::SortMode,
    query: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let tree = tree_organizer::build_tree(store.notes(), store.folders(), sort);
    let tree = match query {
        Some(query) => tree_organizer::filter_tree(&tree, query),
        None => tree,
    };

    for (depth, node) in tree_organizer::walk(&tree) {
        let indent = "  ".repeat(depth);
        match node {
            TreeNode::Folder(folder) => writeln!(out, "{}{}/", indent, folder.name)?,
            TreeNode::Note(leaf) => writeln!(out, "{}- {}  [{}]", indent, leaf.name, leaf.note.id)?,
        }
    }
    Ok(())
}

fn print_due<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    let due = store.due_questions();
    writeln!(out, "{} of {} questions due", due.len(), store.questions().len())?;
    for question in due {
        let (bad, good) = review_scheduler::preview_intervals(question);
        writeln!(
            out,
            "{}  [{}]  {}  (bad: {}h, good: {}d)",
            question.id,
            question.subject,
            excerpt(&question.question_text, 60),
            bad.num_hours(),
            good.num_days()
        )?;
    }
    Ok(())
}

fn print_versions<W: Write>(store: &Store, note_id: &str, out: &mut W) -> Result<()> {
    let note = store
        .note(note_id)
        .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
    if note.versions.is_empty() {
        writeln!(out, "No saved versions")?;
    }
    for version in &note.versions {
        writeln!(
            out,
            "{}  {}  {}  {}",
            version.id,
            version.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            version.name.as_deref().unwrap_or("-"),
            version.title
        )?;
    }
    Ok(())
}

fn read_backup(path: &Path) -> Result<BackupDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file {}", path.display()))?;
    Ok(BackupDocument::from_json(&json)?)
}
