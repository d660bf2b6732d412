use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A 1-based line/column position in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span between two positions, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

/// An ordered batch of edits that must be applied to one document as a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSet {
    pub edits: Vec<TextEdit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            edits: vec![TextEdit::new(range, new_text)],
        }
    }

    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextEdit> {
        self.edits.iter()
    }
}

impl FromIterator<TextEdit> for EditSet {
    fn from_iter<I: IntoIterator<Item = TextEdit>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// Opaque parse result handed through to providers
pub type SyntaxHandle = Arc<dyn Any + Send + Sync>;

/// Snapshot of the editor state a single refactor request runs against.
///
/// Built once per request and never mutated afterwards. Cloning only bumps
/// reference counts.
#[derive(Clone)]
pub struct DocumentContext {
    path: Option<PathBuf>,
    text: Arc<str>,
    tokens: Arc<[Token]>,
    syntax: Option<SyntaxHandle>,
    cursor: Position,
    selection: Option<Range>,
    cancellation: CancellationToken,
}

impl DocumentContext {
    pub fn new(text: impl Into<Arc<str>>, cursor: Position) -> Self {
        Self {
            path: None,
            text: text.into(),
            tokens: Arc::from(Vec::new()),
            syntax: None,
            cursor,
            selection: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = Arc::from(tokens);
        self
    }

    pub fn with_syntax(mut self, syntax: SyntaxHandle) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn with_selection(mut self, selection: Option<Range>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn syntax(&self) -> Option<&SyntaxHandle> {
        self.syntax.as_ref()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn selection(&self) -> Option<Range> {
        self.selection
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Byte offset of a 1-based position, if it falls inside the document
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        offset_of(&self.text, position)
    }

    /// Position of a byte offset
    pub fn position_of(&self, offset: usize) -> Position {
        position_of(&self.text, offset)
    }

    /// The innermost token whose span covers the cursor
    pub fn token_at_cursor(&self) -> Option<&Token> {
        let offset = self.offset_of(self.cursor)?;
        self.tokens
            .iter()
            .find(|token| token.start() <= offset && offset < token.end())
    }

    /// Text of the line (without terminator) the cursor sits on
    pub fn cursor_line(&self) -> &str {
        self.text
            .lines()
            .nth(self.cursor.line.saturating_sub(1))
            .unwrap_or("")
    }
}

impl fmt::Debug for DocumentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentContext")
            .field("path", &self.path)
            .field("cursor", &self.cursor)
            .field("selection", &self.selection)
            .field("tokens", &self.tokens.len())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

/// Converts a 1-based line/column into a byte offset. Columns count chars.
/// The column one past the end of a line is valid.
pub fn offset_of(text: &str, position: Position) -> Option<usize> {
    if position.line == 0 || position.column == 0 {
        return None;
    }

    let mut line_start = 0;
    for _ in 1..position.line {
        let newline = text[line_start..].find('\n')?;
        line_start += newline + 1;
    }

    let line_end = text[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(text.len());
    let line = &text[line_start..line_end];

    let mut chars = line.char_indices();
    for _ in 1..position.column {
        chars.next()?;
    }
    Some(line_start + chars.next().map(|(i, _)| i).unwrap_or(line.len()))
}

pub fn position_of(text: &str, offset: usize) -> Position {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    Position::new(line, column)
}
