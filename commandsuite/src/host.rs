//! Services the hosting editor provides to the command suite.

use crate::error::Result;
use crate::token::Token;
use crate::types::{DocumentContext, EditSet, Range, SyntaxHandle};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Output of [`DocumentParser::parse`]
#[derive(Clone, Default)]
pub struct ParsedDocument {
    pub tokens: Vec<Token>,
    pub syntax: Option<SyntaxHandle>,
}

impl std::fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("tokens", &self.tokens.len())
            .field("syntax", &self.syntax.is_some())
            .finish()
    }
}

#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<ParsedDocument>;
}

/// Snapshot of the document the user invoked the command in.
#[async_trait]
pub trait DocumentContextProvider: Send + Sync {
    async fn document_context(&self, token: &CancellationToken) -> Result<DocumentContext>;
}

/// Applies an [`EditSet`] to a document, all edits or none.
///
/// Overlapping or stale ranges fail with
/// [`SuiteError::EditConflict`](crate::error::SuiteError::EditConflict).
#[async_trait]
pub trait DocumentEditProcessor: Send + Sync {
    async fn apply(&self, edits: EditSet, token: &CancellationToken) -> Result<()>;
}

#[async_trait]
pub trait NavigationService: Send + Sync {
    async fn set_selection(&self, range: Range, token: &CancellationToken) -> Result<()>;
}
