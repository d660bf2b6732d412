use async_trait::async_trait;
use commandsuite::host::{DocumentParser, ParsedDocument};
use commandsuite::{Token, TokenClass};

const KEYWORDS: &[&str] = &[
    "begin", "break", "catch", "class", "continue", "do", "dynamicparam", "else", "elseif", "end",
    "enum", "exit", "filter", "finally", "for", "foreach", "function", "if", "param", "process",
    "return", "switch", "throw", "trap", "try", "until", "using", "while",
];

const DASH_OPERATORS: &[&str] = &[
    "and", "as", "band", "bor", "bxor", "contains", "eq", "f", "ge", "gt", "in", "is", "isnot",
    "join", "le", "like", "lt", "match", "ne", "not", "notcontains", "notin", "notlike",
    "notmatch", "or", "replace", "split", "xor",
];

/// Tokenizer for PowerShell-style scripts.
///
/// Spaces between tokens are left out; line breaks, tabs and comments are
/// kept as [`TokenClass::Default`] tokens so the stream can be rendered back
/// to the original text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptLexer;

impl ScriptLexer {
    pub fn tokenize(text: &str) -> Vec<Token> {
        Lexer::new(text, 0).run()
    }
}

#[async_trait]
impl DocumentParser for ScriptLexer {
    async fn parse(&self, text: &str) -> commandsuite::Result<ParsedDocument> {
        Ok(ParsedDocument {
            tokens: Self::tokenize(text),
            syntax: None,
        })
    }
}

struct Lexer<'a> {
    text: &'a str,
    /// Offset of `text` within the whole document
    base: usize,
    pos: usize,
    tokens: Vec<Token>,
    command_position: bool,
    after_dot: bool,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            base,
            pos: 0,
            tokens: Vec::new(),
            command_position: true,
            after_dot: false,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                ' ' => {
                    self.bump();
                }
                '\t' => {
                    self.eat_while(|c| c == '\t');
                    self.push(TokenClass::Default, start);
                }
                '\r' | '\n' => {
                    if self.bump() == Some('\r') && self.peek() == Some('\n') {
                        self.bump();
                    }
                    self.push(TokenClass::Default, start);
                    self.command_position = true;
                }
                '#' => {
                    self.eat_while(|c| c != '\n' && c != '\r');
                    self.push(TokenClass::Default, start);
                }
                '$' => self.variable(start),
                '\'' => {
                    self.single_quoted();
                    self.push(TokenClass::String, start);
                    self.command_position = false;
                }
                '"' => self.double_quoted(start),
                '0'..='9' => {
                    self.eat_while(|c| c.is_ascii_alphanumeric() || c == '.');
                    self.push(TokenClass::Number, start);
                    self.command_position = false;
                }
                '-' if self.peek_nth(1).is_some_and(|c| c.is_ascii_alphabetic()) => {
                    self.bump();
                    self.eat_while(is_word_char);
                    let word = self.text[start + 1..self.pos].to_ascii_lowercase();
                    let class = if DASH_OPERATORS.contains(&word.as_str()) {
                        TokenClass::Operator
                    } else {
                        TokenClass::Parameter
                    };
                    self.push(class, start);
                    self.command_position = false;
                }
                '[' if self.type_literal_len().is_some() => {
                    let len = self.type_literal_len().unwrap_or(1);
                    self.pos += len;
                    self.push(TokenClass::Type, start);
                }
                c if is_word_start(c) => self.word(start),
                _ => self.punctuation(start, ch),
            }
        }
        self.tokens
    }

    fn word(&mut self, start: usize) {
        self.eat_while(is_word_char);
        let word = &self.text[start..self.pos];
        let class = if self.after_dot {
            TokenClass::Member
        } else if KEYWORDS.contains(&word.to_ascii_lowercase().as_str()) {
            TokenClass::Keyword
        } else if self.command_position {
            TokenClass::Command
        } else {
            TokenClass::Identifier
        };
        self.push(class, start);
        self.command_position = false;
    }

    fn punctuation(&mut self, start: usize, ch: char) {
        self.bump();
        let class = match ch {
            '=' | '+' | '-' | '*' | '/' | '%' | '!' | '<' | '>' | '&' | '|' | '.' | ',' => {
                TokenClass::Operator
            }
            _ => TokenClass::Default,
        };
        self.push(class, start);
        self.command_position = matches!(ch, '|' | ';' | '{' | '(' | '=' | '&');
        self.after_dot = ch == '.';
    }

    fn variable(&mut self, start: usize) {
        self.bump();
        match self.peek() {
            Some('(') => {
                // subexpression: lex the inside as ordinary code
                self.bump();
                self.push(TokenClass::Operator, start);
                self.command_position = true;
                return;
            }
            Some('{') => {
                self.eat_while(|c| c != '}');
                self.bump();
            }
            Some('$' | '?' | '^') => {
                self.bump();
            }
            _ => self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == ':'),
        }
        self.push(TokenClass::Variable, start);
        self.command_position = false;
    }

    fn single_quoted(&mut self) {
        self.bump();
        while let Some(c) = self.bump() {
            if c == '\'' {
                if self.peek() == Some('\'') {
                    self.bump();
                    continue;
                }
                return;
            }
        }
    }

    fn double_quoted(&mut self, start: usize) {
        self.bump();
        let mut nested = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '`' => {
                    self.bump();
                    self.bump();
                }
                '"' => {
                    self.bump();
                    if self.peek() == Some('"') {
                        self.bump();
                        continue;
                    }
                    break;
                }
                '$' if self.peek_nth(1) == Some('(') => {
                    let open = self.pos;
                    let close = self.matching_paren(open + 1);
                    nested.push(Token::leaf(
                        TokenClass::Operator,
                        self.base + open,
                        &self.text[open..open + 2],
                    ));
                    let inner = &self.text[open + 2..close];
                    nested.extend(Lexer::new(inner, self.base + open + 2).run());
                    self.pos = close;
                    if self.peek() == Some(')') {
                        self.bump();
                        nested.push(Token::leaf(TokenClass::Default, self.base + close, ")"));
                    }
                }
                '$' if self
                    .peek_nth(1)
                    .is_some_and(|n| n.is_alphanumeric() || n == '_' || n == '{') =>
                {
                    let var_start = self.pos;
                    self.bump();
                    if self.peek() == Some('{') {
                        self.eat_while(|c| c != '}' && c != '"');
                        if self.peek() == Some('}') {
                            self.bump();
                        }
                    } else {
                        self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == ':');
                    }
                    nested.push(Token::leaf(
                        TokenClass::Variable,
                        self.base + var_start,
                        &self.text[var_start..self.pos],
                    ));
                }
                _ => {
                    self.bump();
                }
            }
        }

        let text = &self.text[start..self.pos];
        if nested.is_empty() {
            self.tokens
                .push(Token::leaf(TokenClass::String, self.base + start, text));
        } else {
            self.tokens
                .push(Token::expandable(self.base + start, text, nested));
        }
        self.command_position = false;
        self.after_dot = false;
    }

    /// Offset of the `)` closing the `(` at `open`, or the end of text
    fn matching_paren(&self, open: usize) -> usize {
        let mut depth = 0;
        for (i, c) in self.text[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return open + i;
                    }
                }
                _ => {}
            }
        }
        self.text.len()
    }

    /// Length of a `[Type.Name]` literal starting at the cursor
    fn type_literal_len(&self) -> Option<usize> {
        let rest = &self.text[self.pos..];
        let close = rest.find(']')?;
        let name = &rest[1..close];
        let valid = name.chars().next().is_some_and(|c| c.is_alphabetic())
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '`' | '[' | ','));
        valid.then_some(close + 1)
    }

    fn push(&mut self, class: TokenClass, start: usize) {
        self.tokens.push(Token::leaf(
            class,
            self.base + start,
            &self.text[start..self.pos],
        ));
        if class != TokenClass::Operator || !self.text[start..self.pos].ends_with('.') {
            self.after_dot = false;
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
