use super::colors::{fg, reset, Palette};
use crate::token::Token;
use regex::Regex;
use std::sync::OnceLock;

/// Number of terminal rows `content` occupies when wrapped at
/// `max_line_length` columns.
///
/// A newline, or a column counter that has already reached the limit, starts
/// a new row; the character that triggers the wrap is consumed by it. A
/// carriage return never advances the column. Empty text still takes one row.
pub fn measure_height(content: &str, max_line_length: usize) -> usize {
    if content.is_empty() {
        return 1;
    }

    let max_line_length = max_line_length.max(1);
    let mut lines = 1;
    let mut column = 0;
    for ch in content.chars() {
        if column >= max_line_length || ch == '\n' {
            lines += 1;
            column = 0;
            continue;
        }

        if ch != '\r' {
            column += 1;
        }
    }

    lines
}

/// Longest prefix of `content` that stays within `max_rows` rows at
/// `max_line_length` columns, with the same wrap rules as [`measure_height`].
pub fn fit_to_height(content: &str, max_line_length: usize, max_rows: usize) -> &str {
    let max_line_length = max_line_length.max(1);
    let max_rows = max_rows.max(1);
    let mut lines = 1;
    let mut column = 0;
    for (i, ch) in content.char_indices() {
        if column >= max_line_length || ch == '\n' {
            if lines == max_rows {
                return &content[..i];
            }
            lines += 1;
            column = 0;
            continue;
        }

        if ch != '\r' {
            column += 1;
        }
    }

    content
}

/// Renders a contiguous token stream as highlighted text.
///
/// Gaps between consecutive tokens are filled with spaces so the output keeps
/// the source's column layout.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut last_end = tokens.first().map(Token::start).unwrap_or(0);
    for token in tokens {
        pad(&mut out, token.start().saturating_sub(last_end));
        last_end = token.end();
        write_token(token, &mut out);
    }

    out.push_str(&reset());
    out
}

fn write_token(token: &Token, out: &mut String) {
    match token {
        Token::Expandable {
            start,
            end,
            text,
            nested,
        } => {
            let string_style = fg(Palette::STRING);
            let mut last_end = *start;
            for inner in nested {
                out.push_str(&string_style);
                out.push_str(slice(
                    text,
                    last_end.saturating_sub(*start),
                    inner.start().saturating_sub(*start),
                ));
                write_token(inner, out);
                last_end = inner.end();
            }

            out.push_str(&string_style);
            out.push_str(slice(text, last_end.saturating_sub(*start), end - start));
        }
        Token::Leaf { class, text, .. } => {
            out.push_str(&fg(Palette::for_class(*class)));
            out.push_str(text);
        }
    }
}

fn slice(text: &str, from: usize, to: usize) -> &str {
    if from >= to {
        return "";
    }
    text.get(from..to).unwrap_or("")
}

fn pad(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}

fn style_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("static pattern"))
}

/// Removes terminal style escapes, leaving the plain text
pub fn strip_styles(styled: &str) -> String {
    style_pattern().replace_all(styled, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenClass;

    #[test]
    fn test_measure_empty_is_one_line() {
        assert_eq!(measure_height("", 10), 1);
    }

    #[test]
    fn test_measure_fits_on_one_line() {
        assert_eq!(measure_height("abc", 10), 1);
        assert_eq!(measure_height("abcdefghij", 10), 1);
    }

    #[test]
    fn test_measure_wraps_once_per_boundary() {
        assert_eq!(measure_height("abcdefghijk", 10), 2);
        assert_eq!(measure_height("abc\ndef", 10), 2);
        assert_eq!(measure_height("abc\n", 10), 2);
        assert_eq!(measure_height("a\nb\nc", 10), 3);
    }

    #[test]
    fn test_measure_carriage_return_is_free() {
        assert_eq!(measure_height("abcdefghi\r", 10), 1);
        assert_eq!(measure_height("abc\r\ndef", 10), 2);
        assert_eq!(
            measure_height("abcde\r\r\r\r\rfghij", 10),
            measure_height("abcdefghij", 10)
        );
    }

    #[test]
    fn test_measure_wrap_consumes_trigger_char() {
        // the 11th char starts row two and is not counted on it
        assert_eq!(measure_height(&"x".repeat(21), 10), 2);
        assert_eq!(measure_height(&"x".repeat(22), 10), 3);
    }

    #[test]
    fn test_measure_zero_width_treated_as_one() {
        assert_eq!(measure_height("a", 0), 1);
        assert_eq!(measure_height("ab", 0), 2);
    }

    #[test]
    fn test_fit_to_height_truncates_at_row_limit() {
        let text = "x".repeat(35);
        let fitted = fit_to_height(&text, 10, 2);
        assert_eq!(fitted.len(), 21);
        assert_eq!(measure_height(fitted, 10), 2);
        assert_eq!(fit_to_height("a\nb\nc", 10, 2), "a\nb");
        assert_eq!(fit_to_height("short", 10, 1), "short");
    }

    #[test]
    fn test_render_fills_gaps_with_spaces() {
        let tokens = vec![
            Token::leaf(TokenClass::Command, 0, "Get-Item"),
            Token::leaf(TokenClass::Parameter, 11, "-Path"),
            Token::leaf(TokenClass::String, 17, "'x'"),
        ];
        let rendered = render_tokens(&tokens);
        assert_eq!(strip_styles(&rendered), "Get-Item   -Path 'x'");
        assert!(rendered.contains(&fg(Palette::COMMAND)));
        assert!(rendered.contains(&fg(Palette::PARAMETER)));
        assert!(rendered.ends_with(&reset()));
    }

    #[test]
    fn test_render_expandable_splices_nested_tokens() {
        let source = "\"a $b c $d\"";
        let tokens = vec![Token::expandable(
            0,
            source,
            vec![
                Token::leaf(TokenClass::Variable, 3, "$b"),
                Token::leaf(TokenClass::Variable, 8, "$d"),
            ],
        )];

        let rendered = render_tokens(&tokens);
        let string = fg(Palette::STRING);
        let variable = fg(Palette::VARIABLE);
        let expected = format!(
            "{string}\"a {variable}$b{string} c {variable}$d{string}\"{}",
            reset()
        );
        assert_eq!(rendered, expected);
        assert_eq!(strip_styles(&rendered), source);
    }

    #[test]
    fn test_render_round_trip_over_lines() {
        let source = "if ($x) {\n    Write-Host \"v: $x\" 42\n}";
        let tokens = vec![
            Token::leaf(TokenClass::Keyword, 0, "if"),
            Token::leaf(TokenClass::Default, 3, "("),
            Token::leaf(TokenClass::Variable, 4, "$x"),
            Token::leaf(TokenClass::Default, 6, ")"),
            Token::leaf(TokenClass::Default, 8, "{"),
            Token::leaf(TokenClass::Default, 9, "\n"),
            Token::leaf(TokenClass::Command, 14, "Write-Host"),
            Token::expandable(25, "\"v: $x\"", vec![Token::leaf(TokenClass::Variable, 29, "$x")]),
            Token::leaf(TokenClass::Number, 33, "42"),
            Token::leaf(TokenClass::Default, 35, "\n"),
            Token::leaf(TokenClass::Default, 36, "}"),
        ];
        assert_eq!(strip_styles(&render_tokens(&tokens)), source);
    }

    #[test]
    fn test_render_empty_stream_is_reset_only() {
        assert_eq!(render_tokens(&[]), reset());
    }
}
