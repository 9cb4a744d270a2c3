// src/application/tree_organizer.rs
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_NOTE;
use crate::domain::{FolderNode, FolderPath, Note, NoteNode, TreeNode};
use crate::util::text::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Notes by last update, newest first
    #[default]
    Updated,
    /// Notes by title
    Title,
}

/// Folder paths the user has expanded in the navigation view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedPaths(HashSet<String>);

impl ExpandedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Returns the new expansion state of `path`.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.0.remove(path) {
            false
        } else {
            self.0.insert(path.to_string());
            true
        }
    }
}

#[derive(Default)]
struct FolderBuilder<'a> {
    folders: BTreeMap<String, FolderBuilder<'a>>,
    notes: Vec<&'a Note>,
}

impl<'a> FolderBuilder<'a> {
    fn descend(&mut self, segments: &[String]) -> &mut FolderBuilder<'a> {
        segments.iter().fold(self, |node, segment| {
            node.folders.entry(segment.clone()).or_default()
        })
    }

    fn into_nodes(
        self,
        parent_path: &[String],
        sort_mode: SortMode,
        expanded: &ExpandedPaths,
    ) -> Vec<TreeNode<'a>> {
        let level = parent_path.len();
        let folder_path = parent_path.join("/");

        let mut folders: Vec<TreeNode<'a>> = self
            .folders
            .into_iter()
            .map(|(name, builder)| {
                let mut segments = parent_path.to_vec();
                segments.push(name.clone());
                let path = segments.join("/");
                TreeNode::Folder(FolderNode {
                    expanded: expanded.contains(&path),
                    children: builder.into_nodes(&segments, sort_mode, expanded),
                    name,
                    path,
                    level,
                    has_match: false,
                })
            })
            .collect();

        let notes = self.notes.into_iter().map(|note| {
            TreeNode::Note(NoteNode {
                name: display_title(note),
                path: folder_path.clone(),
                level,
                has_match: false,
                note,
            })
        });

        folders.extend(notes);
        folders.sort_by(|a, b| compare_nodes(a, b, sort_mode));
        folders
    }
}

fn display_title(note: &Note) -> String {
    if note.title.trim().is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        note.title.clone()
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Folders before notes; folders by name; notes by `sort_mode`.
/// The sort is stable, so notes with equal keys keep input order.
fn compare_nodes(a: &TreeNode, b: &TreeNode, sort_mode: SortMode) -> Ordering {
    match (a, b) {
        (TreeNode::Folder(_), TreeNode::Note(_)) => Ordering::Less,
        (TreeNode::Note(_), TreeNode::Folder(_)) => Ordering::Greater,
        (TreeNode::Folder(x), TreeNode::Folder(y)) => compare_names(&x.name, &y.name),
        (TreeNode::Note(x), TreeNode::Note(y)) => match sort_mode {
            SortMode::Title => compare_names(&x.name, &y.name),
            SortMode::Updated => y.note.updated_at.cmp(&x.note.updated_at),
        },
    }
}

/// Build the navigation tree from notes and declared folders.
///
/// Declared folders exist even when empty; intermediate folders are created
/// for every path segment. Notes with an empty folder go to the
/// uncategorized folder.
pub fn build_tree<'a>(
    notes: &'a [Note],
    declared_folders: &[String],
    sort_mode: SortMode,
) -> Vec<TreeNode<'a>> {
    build_tree_with_expansion(notes, declared_folders, sort_mode, &ExpandedPaths::new())
}

pub fn build_tree_with_expansion<'a>(
    notes: &'a [Note],
    declared_folders: &[String],
    sort_mode: SortMode,
    expanded: &ExpandedPaths,
) -> Vec<TreeNode<'a>> {
    let mut root = FolderBuilder::default();

    for declared in declared_folders {
        root.descend(FolderPath::parse(declared).segments());
    }
    for note in notes {
        let folder = FolderPath::for_note(&note.folder);
        root.descend(folder.segments()).notes.push(note);
    }

    root.into_nodes(&[], sort_mode, expanded)
}

/// Prune the tree to nodes matching `query` (case-insensitive).
///
/// A note matches on title, tags or body. A folder is kept when its name
/// matches or any descendant does, and is forced open. An empty query
/// returns the tree unchanged.
pub fn filter_tree<'a>(nodes: &[TreeNode<'a>], query: &str) -> Vec<TreeNode<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return nodes.to_vec();
    }
    prune(nodes, &query)
}

fn prune<'a>(nodes: &[TreeNode<'a>], query: &str) -> Vec<TreeNode<'a>> {
    nodes
        .iter()
        .filter_map(|node| match node {
            TreeNode::Note(leaf) => note_matches(leaf, query).then(|| {
                TreeNode::Note(NoteNode {
                    has_match: true,
                    ..leaf.clone()
                })
            }),
            TreeNode::Folder(folder) => {
                let children = prune(&folder.children, query);
                let name_match = contains_ignore_case(&folder.name, query);
                if children.is_empty() && !name_match {
                    return None;
                }
                let has_match = name_match || children.iter().any(TreeNode::has_match);
                Some(TreeNode::Folder(FolderNode {
                    name: folder.name.clone(),
                    path: folder.path.clone(),
                    level: folder.level,
                    expanded: true,
                    has_match,
                    children,
                }))
            }
        })
        .collect()
}

fn note_matches(leaf: &NoteNode, query: &str) -> bool {
    contains_ignore_case(&leaf.name, query)
        || contains_ignore_case(&leaf.note.content, query)
        || leaf.note.tags.iter().any(|tag| contains_ignore_case(tag, query))
}

/// Depth-first walk, yielding each node with its depth.
pub fn walk<'t, 'a>(nodes: &'t [TreeNode<'a>]) -> Vec<(usize, &'t TreeNode<'a>)> {
    fn visit<'t, 'a>(nodes: &'t [TreeNode<'a>], depth: usize, out: &mut Vec<(usize, &'t TreeNode<'a>)>) {
        for node in nodes {
            out.push((depth, node));
            visit(node.children(), depth + 1, out);
        }
    }
    let mut out = Vec::new();
    visit(nodes, 0, &mut out);
    out
}
