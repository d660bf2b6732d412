use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

/// Line diff of one file
#[derive(Debug, Clone)]
pub struct PreviewDiff {
    pub file_path: PathBuf,
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Unified diff body
    pub diff: String,
}

impl PreviewDiff {
    /// Generate a human-readable diff output
    pub fn format_diff(&self) -> String {
        format!(
            "--- {path}\n+++ {path}\n{}",
            self.diff,
            path = self.file_path.display()
        )
    }
}

pub fn unified_diff(path: &Path, old: &str, new: &str) -> PreviewDiff {
    let diff = TextDiff::from_lines(old, new);
    let mut lines_added = 0;
    let mut lines_removed = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => lines_added += 1,
            ChangeTag::Delete => lines_removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let body = diff.unified_diff().context_radius(2).to_string();

    PreviewDiff {
        file_path: path.to_path_buf(),
        lines_added,
        lines_removed,
        diff: body,
    }
}

/// Generate preview for all files
pub fn generate_preview(diffs: &[PreviewDiff]) -> String {
    if diffs.is_empty() {
        return "No changes\n".to_string();
    }

    let mut output = String::new();
    for diff in diffs {
        output.push_str(&diff.format_diff());
        if !output.ends_with('\n') {
            output.push('\n');
        }
    }
    output
}
