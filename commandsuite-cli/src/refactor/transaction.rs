use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::preview::{unified_diff, PreviewDiff};

/// A single file rewrite in a transaction
#[derive(Debug, Clone)]
pub struct FileOperation {
    pub path: PathBuf,

    /// The content before the rewrite (for rollback)
    pub original_content: String,

    pub new_content: String,

    /// Whether this operation has been written
    pub applied: bool,
}

/// Transaction execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Actually write files
    Execute,

    /// Dry-run - don't write files
    DryRun,
}

/// File rewrites with all-or-nothing semantics.
///
/// [`FileEditProcessor`](super::edits::FileEditProcessor) commits one
/// operation per request, so rollback only matters for callers that batch
/// several files.
#[derive(Debug)]
pub struct RefactoringTransaction {
    operations: Vec<FileOperation>,
    committed: bool,
    mode: TransactionMode,
}

impl RefactoringTransaction {
    pub fn new(mode: TransactionMode) -> Self {
        Self {
            operations: Vec::new(),
            committed: false,
            mode,
        }
    }

    pub fn add_operation(
        &mut self,
        path: PathBuf,
        original_content: String,
        new_content: String,
    ) -> Result<()> {
        if self.committed {
            anyhow::bail!("Cannot add operations to a committed transaction");
        }

        self.operations.push(FileOperation {
            path,
            original_content,
            new_content,
            applied: false,
        });

        Ok(())
    }

    /// Writes every operation, restoring the already written files if one
    /// of them fails
    pub fn commit(&mut self) -> Result<TransactionResult> {
        if self.committed {
            anyhow::bail!("Transaction has already been committed");
        }

        let mut result = TransactionResult {
            mode: self.mode,
            files_modified: Vec::new(),
        };

        if self.mode == TransactionMode::DryRun {
            result.files_modified = self.changed_paths();
            self.committed = true;
            return Ok(result);
        }

        for i in 0..self.operations.len() {
            let operation = &self.operations[i];
            if operation.original_content == operation.new_content {
                continue;
            }

            let written = fs::write(&operation.path, &operation.new_content)
                .with_context(|| format!("Failed to write file: {}", operation.path.display()));
            if let Err(e) = written {
                tracing::error!("{:#}", e);
                if let Err(rollback_err) = self.rollback() {
                    return Err(e.context(format!(
                        "Rollback failed: {}. Manual recovery may be required.",
                        rollback_err
                    )));
                }
                return Err(e.context("Transaction failed. All changes have been rolled back."));
            }

            self.operations[i].applied = true;
            result.files_modified.push(self.operations[i].path.clone());
        }

        self.committed = true;
        Ok(result)
    }

    /// Restores the original content of every written file
    pub fn rollback(&mut self) -> Result<()> {
        let mut errors = Vec::new();

        for operation in self.operations.iter_mut().rev() {
            if !operation.applied {
                continue;
            }

            match fs::write(&operation.path, &operation.original_content) {
                Ok(()) => operation.applied = false,
                Err(e) => errors.push(format!("{}: {}", operation.path.display(), e)),
            }
        }

        if !errors.is_empty() {
            anyhow::bail!("Rollback encountered errors: {}", errors.join("; "));
        }

        Ok(())
    }

    /// Line diffs of every operation that changes its file
    pub fn preview(&self) -> Vec<PreviewDiff> {
        self.operations
            .iter()
            .filter(|op| op.original_content != op.new_content)
            .map(|op| unified_diff(&op.path, &op.original_content, &op.new_content))
            .collect()
    }

    fn changed_paths(&self) -> Vec<PathBuf> {
        self.operations
            .iter()
            .filter(|op| op.original_content != op.new_content)
            .map(|op| op.path.clone())
            .collect()
    }
}

/// Result of a transaction execution
#[derive(Debug, Clone)]
pub struct TransactionResult {
    pub mode: TransactionMode,
    /// Files written, or that would be written in dry-run mode
    pub files_modified: Vec<PathBuf>,
}

impl TransactionResult {
    pub fn format_summary(&self) -> String {
        let verb = if self.mode == TransactionMode::DryRun {
            "Would modify"
        } else {
            "Modified"
        };
        let mut output = format!(
            "{} {} file{}\n",
            verb,
            self.files_modified.len(),
            if self.files_modified.len() == 1 { "" } else { "s" }
        );
        for file in &self.files_modified {
            output.push_str(&format!("   {}\n", file.display()));
        }
        output
    }
}
