use serde::{Deserialize, Serialize};

/// Lexical classification used to pick a highlight style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    String,
    Number,
    Keyword,
    Operator,
    Identifier,
    Member,
    Type,
    Command,
    Parameter,
    Variable,
    Default,
}

/// A lexical unit of a script. Offsets are byte offsets into the source the
/// token was lexed from, `end` exclusive.
///
/// Expandable strings carry the tokens of their embedded expressions. Nested
/// offsets are absolute (same coordinate space as the outer token) and lie
/// inside the outer span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Leaf {
        class: TokenClass,
        start: usize,
        end: usize,
        text: String,
    },
    Expandable {
        start: usize,
        end: usize,
        text: String,
        nested: Vec<Token>,
    },
}

impl Token {
    pub fn leaf(class: TokenClass, start: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Token::Leaf {
            class,
            start,
            end: start + text.len(),
            text,
        }
    }

    pub fn expandable(start: usize, text: impl Into<String>, nested: Vec<Token>) -> Self {
        let text = text.into();
        Token::Expandable {
            start,
            end: start + text.len(),
            text,
            nested,
        }
    }

    pub fn start(&self) -> usize {
        match self {
            Token::Leaf { start, .. } | Token::Expandable { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Token::Leaf { end, .. } | Token::Expandable { end, .. } => *end,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Token::Leaf { text, .. } | Token::Expandable { text, .. } => text,
        }
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Token::Leaf { class, .. } => *class,
            Token::Expandable { .. } => TokenClass::String,
        }
    }

    pub fn nested(&self) -> &[Token] {
        match self {
            Token::Leaf { .. } => &[],
            Token::Expandable { nested, .. } => nested,
        }
    }

    pub fn is_string(&self) -> bool {
        self.class() == TokenClass::String
    }
}
