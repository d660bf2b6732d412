use async_trait::async_trait;
use commandsuite::host::DocumentEditProcessor;
use commandsuite::types::offset_of;
use commandsuite::{EditSet, SuiteError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use super::preview::{generate_preview, PreviewDiff};
use super::transaction::{RefactoringTransaction, TransactionMode};
use crate::document::DocumentSnapshot;

/// Applies edit sets to a script file through a [`RefactoringTransaction`].
///
/// The file must still hold the text the request was started against.
pub struct FileEditProcessor {
    path: PathBuf,
    snapshot: DocumentSnapshot,
    mode: TransactionMode,
    previews: Arc<Mutex<Vec<PreviewDiff>>>,
}

impl FileEditProcessor {
    pub fn new(path: impl Into<PathBuf>, snapshot: DocumentSnapshot) -> Self {
        Self {
            path: path.into(),
            snapshot,
            mode: TransactionMode::Execute,
            previews: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.mode = if dry_run {
            TransactionMode::DryRun
        } else {
            TransactionMode::Execute
        };
        self
    }

    /// Handle to the diffs recorded by applied edits
    pub fn previews(&self) -> PreviewLog {
        PreviewLog {
            diffs: Arc::clone(&self.previews),
        }
    }
}

/// Diffs of the edits a [`FileEditProcessor`] applied
#[derive(Clone)]
pub struct PreviewLog {
    diffs: Arc<Mutex<Vec<PreviewDiff>>>,
}

impl PreviewLog {
    pub fn is_empty(&self) -> bool {
        self.diffs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Formats and clears the recorded diffs
    pub fn take(&self) -> String {
        let diffs = std::mem::take(&mut *self.diffs.lock().unwrap_or_else(PoisonError::into_inner));
        generate_preview(&diffs)
    }
}

#[async_trait]
impl DocumentEditProcessor for FileEditProcessor {
    async fn apply(&self, edits: EditSet, token: &CancellationToken) -> commandsuite::Result<()> {
        if token.is_cancelled() {
            return Err(SuiteError::Cancelled);
        }

        let current = tokio::fs::read_to_string(&self.path).await?;
        match self.snapshot.get() {
            Some(original) if original == current => {}
            Some(_) => {
                return Err(SuiteError::EditConflict(format!(
                    "{} changed on disk since it was read",
                    self.path.display()
                )))
            }
            None => {
                return Err(SuiteError::EditConflict(format!(
                    "{} was never read for this request",
                    self.path.display()
                )))
            }
        }

        let updated = apply_edits(&current, &edits)?;

        let mut tx = RefactoringTransaction::new(self.mode);
        tx.add_operation(self.path.clone(), current, updated)?;
        let diffs = tx.preview();
        for diff in &diffs {
            tracing::debug!(
                "{}: +{} -{} line(s)",
                diff.file_path.display(),
                diff.lines_added,
                diff.lines_removed
            );
        }
        let result = tx.commit()?;
        tracing::info!("{}", result.format_summary().trim_end());

        self.previews
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(diffs);
        Ok(())
    }
}

/// Applies `edits` to `text`. Every range is resolved against the original
/// text, so edits must not overlap.
pub fn apply_edits(text: &str, edits: &EditSet) -> Result<String, SuiteError> {
    let mut spans = Vec::with_capacity(edits.len());
    for edit in edits.iter() {
        let start = offset_of(text, edit.range.start);
        let end = offset_of(text, edit.range.end);
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(SuiteError::EditConflict(format!(
                    "edit range {} is outside the document",
                    edit.range
                )))
            }
        };
        if start > end {
            return Err(SuiteError::EditConflict(format!(
                "edit range {} ends before it starts",
                edit.range
            )));
        }
        spans.push((start, end, edit.new_text.as_str()));
    }

    spans.sort_by_key(|&(start, end, _)| (start, end));
    for pair in spans.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(SuiteError::EditConflict(
                "edits overlap each other".to_string(),
            ));
        }
    }

    let mut result = text.to_string();
    for (start, end, new_text) in spans.into_iter().rev() {
        result.replace_range(start..end, new_text);
    }
    Ok(result)
}
