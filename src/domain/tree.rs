// src/domain/tree.rs
use super::Note;

/// Node of the navigation tree. Rebuilt on every read, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<'a> {
    Folder(FolderNode<'a>),
    Note(NoteNode<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode<'a> {
    pub name: String,
    /// Full normalized path, e.g. `Math/Algebra`
    pub path: String,
    /// Depth below the root (root children are level 0)
    pub level: usize,
    pub expanded: bool,
    pub has_match: bool,
    pub children: Vec<TreeNode<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteNode<'a> {
    pub name: String,
    pub path: String,
    pub level: usize,
    pub has_match: bool,
    pub note: &'a Note,
}

impl<'a> TreeNode<'a> {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => &folder.name,
            TreeNode::Note(note) => &note.name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    pub fn children(&self) -> &[TreeNode<'a>] {
        match self {
            TreeNode::Folder(folder) => &folder.children,
            TreeNode::Note(_) => &[],
        }
    }

    pub fn has_match(&self) -> bool {
        match self {
            TreeNode::Folder(folder) => folder.has_match,
            TreeNode::Note(note) => note.has_match,
        }
    }
}
