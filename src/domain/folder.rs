// src/domain/folder.rs
use crate::constants::UNCATEGORIZED_FOLDER;

/// Slash-delimited folder path, normalized into its non-empty segments.
///
/// `"/Math//Algebra/"` and `"Math/Algebra"` are the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FolderPath {
    segments: Vec<String>,
}

impl FolderPath {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Folder a note is filed under: an empty path means the uncategorized folder.
    pub fn for_note(raw: &str) -> Self {
        if raw.is_empty() {
            Self::parse(UNCATEGORIZED_FOLDER)
        } else {
            Self::parse(raw)
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// `A/B/C` yields `A`, `A/B`, `A/B/C`.
    pub fn ancestors_and_self(&self) -> Vec<String> {
        (1..=self.segments.len())
            .map(|depth| self.segments[..depth].join("/"))
            .collect()
    }

    pub fn as_path_string(&self) -> String {
        self.segments.join("/")
    }

    pub fn is_uncategorized(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == UNCATEGORIZED_FOLDER
    }
}
