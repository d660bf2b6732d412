pub mod lexer;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use commandsuite::host::{DocumentContextProvider, DocumentParser, NavigationService};
use commandsuite::ui::MessageSink;
use commandsuite::{DocumentContext, Position, Range, SuiteError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

pub use lexer::ScriptLexer;

/// The text a request was started against, shared between the reader and
/// the writer of a document
#[derive(Debug, Clone, Default)]
pub struct DocumentSnapshot {
    text: Arc<Mutex<Option<String>>>,
}

impl DocumentSnapshot {
    pub fn record(&self, text: &str) {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
    }

    pub fn get(&self) -> Option<String> {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A script file on disk, read and tokenized when a request starts.
pub struct FileDocument {
    path: PathBuf,
    cursor: Position,
    selection: Option<Range>,
    parser: Arc<dyn DocumentParser>,
    snapshot: DocumentSnapshot,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>, cursor: Position) -> Self {
        Self {
            path: path.into(),
            cursor,
            selection: None,
            parser: Arc::new(ScriptLexer),
            snapshot: DocumentSnapshot::default(),
        }
    }

    pub fn with_selection(mut self, selection: Option<Range>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.snapshot.clone()
    }
}

#[async_trait]
impl DocumentContextProvider for FileDocument {
    async fn document_context(
        &self,
        token: &CancellationToken,
    ) -> commandsuite::Result<DocumentContext> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read file: {}", self.path.display()))?;

        if commandsuite::types::offset_of(&text, self.cursor).is_none() {
            return Err(anyhow!(
                "{} is outside {}",
                self.cursor,
                self.path.display()
            )
            .into());
        }
        if let Some(selection) = self.selection {
            let inside = |p| commandsuite::types::offset_of(&text, p).is_some();
            if !inside(selection.start) || !inside(selection.end) {
                return Err(anyhow!(
                    "Selection {} is outside {}",
                    selection,
                    self.path.display()
                )
                .into());
            }
        }
        if token.is_cancelled() {
            return Err(SuiteError::Cancelled);
        }

        let parsed = self.parser.parse(&text).await?;
        tracing::debug!(
            "Read {} ({} bytes, {} tokens)",
            self.path.display(),
            text.len(),
            parsed.tokens.len()
        );
        self.snapshot.record(&text);

        let mut ctx = DocumentContext::new(text, self.cursor)
            .with_path(self.path.clone())
            .with_tokens(parsed.tokens)
            .with_selection(self.selection)
            .with_cancellation(token.clone());
        if let Some(syntax) = parsed.syntax {
            ctx = ctx.with_syntax(syntax);
        }
        Ok(ctx)
    }
}

/// Navigation for a host without an editor view: the new selection is
/// reported to the user.
pub struct ReportingNavigation {
    path: PathBuf,
    sink: Arc<MessageSink>,
}

impl ReportingNavigation {
    pub fn new(path: impl Into<PathBuf>, sink: Arc<MessageSink>) -> Self {
        Self {
            path: path.into(),
            sink,
        }
    }
}

#[async_trait]
impl NavigationService for ReportingNavigation {
    async fn set_selection(
        &self,
        range: Range,
        token: &CancellationToken,
    ) -> commandsuite::Result<()> {
        if token.is_cancelled() {
            return Err(SuiteError::Cancelled);
        }
        self.sink
            .info(format!("Selection: {}:{}", self.path.display(), range))
    }
}
