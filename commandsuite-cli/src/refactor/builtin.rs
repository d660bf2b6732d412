use anyhow::{anyhow, Result};
use async_trait::async_trait;
use commandsuite::providers::ProviderCandidate;
use commandsuite::ui::{show_choice_prompt, RefactorUi};
use commandsuite::{DocumentContext, EditSet, Range, RefactorProvider, SuiteError, Token};
use std::sync::Arc;

/// Scope the built-in refactors are declared in
pub const BUILTIN_SCOPE: &str = "builtin";

/// The refactors shipped with `cmdsuite`
pub fn builtin_providers() -> Vec<ProviderCandidate> {
    let providers: Vec<Arc<dyn RefactorProvider>> = vec![
        Arc::new(ChangeStringEnclosure),
        Arc::new(SurroundSelectedLines),
    ];
    providers
        .into_iter()
        .map(|provider| ProviderCandidate {
            module: BUILTIN_SCOPE.to_string(),
            marked: true,
            provider,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
}

impl Quote {
    fn of(text: &str) -> Option<Self> {
        match text.chars().next()? {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            _ => None,
        }
    }

    fn label(&self) -> String {
        match self {
            Quote::Single => "Single quoted".to_string(),
            Quote::Double => "Double quoted".to_string(),
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            Quote::Single => Some("Verbatim string, no expansion".to_string()),
            Quote::Double => Some("Expandable string".to_string()),
        }
    }
}

/// Switches the string under the cursor between single and double quotes
pub struct ChangeStringEnclosure;

impl ChangeStringEnclosure {
    fn string_at_cursor(ctx: &DocumentContext) -> Option<(&Token, Quote)> {
        let token = ctx.token_at_cursor().filter(|t| t.is_string())?;
        let quote = Quote::of(token.text())?;
        Some((token, quote))
    }
}

#[async_trait]
impl RefactorProvider for ChangeStringEnclosure {
    fn name(&self) -> &str {
        "Change string enclosure"
    }

    fn description(&self) -> &str {
        "Switch the string under the cursor between single and double quotes"
    }

    fn is_applicable(&self, ctx: &DocumentContext) -> Result<bool> {
        Ok(Self::string_at_cursor(ctx).is_some())
    }

    async fn compute_edits(&self, ctx: &DocumentContext, ui: &dyn RefactorUi) -> Result<EditSet> {
        let (token, current) = Self::string_at_cursor(ctx)
            .ok_or_else(|| anyhow!("No string at {}", ctx.cursor()))?;

        let target = show_choice_prompt(
            ui,
            "Change string enclosure",
            "Choose the new enclosure",
            vec![Quote::Single, Quote::Double],
            Quote::label,
            Quote::help,
        )
        .await?
        .ok_or(SuiteError::Cancelled)?;

        if target == current {
            return Ok(EditSet::new());
        }
        if !token.nested().is_empty() {
            ui.show_warning_message("The string contains expressions and cannot be made verbatim")
                .await?;
            return Ok(EditSet::new());
        }

        let converted = match target {
            Quote::Double => to_double_quoted(token.text()),
            Quote::Single => match to_single_quoted(token.text()) {
                Some(converted) => converted,
                None => {
                    ui.show_warning_message(
                        "The string contains escape sequences that have no verbatim form",
                    )
                    .await?;
                    return Ok(EditSet::new());
                }
            },
        };

        let range = Range {
            start: ctx.position_of(token.start()),
            end: ctx.position_of(token.end()),
        };
        Ok(EditSet::single(range, converted))
    }
}

fn inner(text: &str) -> &str {
    if text.len() < 2 {
        return "";
    }
    &text[1..text.len() - 1]
}

fn to_double_quoted(text: &str) -> String {
    let value = inner(text).replace("''", "'");
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '`' | '"' | '$') {
            out.push('`');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// `None` when the string holds an escape that only exists in expandable form
fn to_single_quoted(text: &str) -> Option<String> {
    let mut value = String::new();
    let mut chars = inner(text).chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => match chars.next() {
                Some('0' | 'a' | 'b' | 'e' | 'f' | 'n' | 'r' | 't' | 'u' | 'v') => return None,
                Some(escaped) => value.push(escaped),
                None => value.push('`'),
            },
            '"' if chars.peek() == Some(&'"') => {
                chars.next();
                value.push('"');
            }
            _ => value.push(c),
        }
    }
    Some(format!("'{}'", value.replace('\'', "''")))
}

/// Wraps the selected lines in a block with a user-supplied header
pub struct SurroundSelectedLines;

#[async_trait]
impl RefactorProvider for SurroundSelectedLines {
    fn name(&self) -> &str {
        "Surround selected lines"
    }

    fn description(&self) -> &str {
        "Wrap the selected lines in a block, e.g. a loop or try statement"
    }

    fn is_applicable(&self, ctx: &DocumentContext) -> Result<bool> {
        Ok(ctx.selection().is_some())
    }

    async fn compute_edits(&self, ctx: &DocumentContext, ui: &dyn RefactorUi) -> Result<EditSet> {
        let selection = ctx
            .selection()
            .ok_or_else(|| anyhow!("Nothing is selected"))?;

        let header = ui
            .show_input_prompt("Surround selected lines", "Block header, e.g. foreach ($item in $items)")
            .await?
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or(SuiteError::Cancelled)?;

        let start_line = selection.start.line;
        // A selection ending at column 1 does not include that line
        let end_line = if selection.end.column == 1 && selection.end.line > start_line {
            selection.end.line - 1
        } else {
            selection.end.line
        };

        let lines: Vec<&str> = ctx
            .text()
            .lines()
            .skip(start_line.saturating_sub(1))
            .take((end_line + 1).saturating_sub(start_line))
            .collect();
        let first = lines
            .first()
            .ok_or_else(|| anyhow!("Selection {} is outside the document", selection))?;
        let indent: String = first.chars().take_while(|c| c.is_whitespace()).collect();

        let mut block = format!("{}{} {{\n", indent, header);
        for line in &lines {
            if !line.trim().is_empty() {
                block.push_str("    ");
                block.push_str(line);
            }
            block.push('\n');
        }
        block.push_str(&indent);
        block.push('}');

        let last = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        let range = Range::new(start_line, 1, start_line + lines.len() - 1, last + 1);
        Ok(EditSet::single(range, block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ScriptLexer;
    use crate::refactor::edits::apply_edits;
    use commandsuite::ui::Choice;
    use commandsuite::Position;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedUi {
        pick: Option<usize>,
        input: Option<String>,
        warnings: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RefactorUi for ScriptedUi {
        async fn show_input_prompt(
            &self,
            _caption: &str,
            _message: &str,
        ) -> commandsuite::Result<Option<String>> {
            Ok(self.input.clone())
        }

        async fn choose(
            &self,
            _caption: &str,
            _message: &str,
            _choices: Vec<Choice>,
        ) -> commandsuite::Result<Option<usize>> {
            Ok(self.pick)
        }

        async fn show_error_message(&self, _message: &str) -> commandsuite::Result<()> {
            Ok(())
        }

        async fn show_warning_message(&self, message: &str) -> commandsuite::Result<()> {
            self.warnings.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn show_information_message(&self, _message: &str) -> commandsuite::Result<()> {
            Ok(())
        }
    }

    fn ctx(text: &str, cursor: Position) -> DocumentContext {
        DocumentContext::new(text, cursor).with_tokens(ScriptLexer::tokenize(text))
    }

    fn pick(index: usize) -> ScriptedUi {
        ScriptedUi {
            pick: Some(index),
            ..Default::default()
        }
    }

    async fn rewrite(provider: &dyn RefactorProvider, ctx: &DocumentContext, ui: &ScriptedUi) -> String {
        let edits = provider.compute_edits(ctx, ui).await.unwrap();
        apply_edits(ctx.text(), &edits).unwrap()
    }

    #[test]
    fn test_quote_conversions() {
        assert_eq!(to_double_quoted("'it''s $5'"), "\"it's `$5\"");
        assert_eq!(to_single_quoted("\"say `\"hi`\"\"").unwrap(), "'say \"hi\"'");
        assert_eq!(to_single_quoted("\"a\"\"b\"").unwrap(), "'a\"b'");
        assert_eq!(to_single_quoted("\"don't\"").unwrap(), "'don''t'");
        assert_eq!(to_single_quoted("\"line`n\""), None);
    }

    #[test]
    fn test_enclosure_applicability() {
        let provider = ChangeStringEnclosure;
        assert!(provider
            .is_applicable(&ctx("Get-Item 'a'", Position::new(1, 11)))
            .unwrap());
        assert!(!provider
            .is_applicable(&ctx("Get-Item 'a'", Position::new(1, 2)))
            .unwrap());
    }

    #[tokio::test]
    async fn test_single_to_double() {
        let ctx = ctx("Write-Host 'cost: $5'\n", Position::new(1, 14));
        let result = rewrite(&ChangeStringEnclosure, &ctx, &pick(1)).await;
        assert_eq!(result, "Write-Host \"cost: `$5\"\n");
    }

    #[tokio::test]
    async fn test_same_enclosure_is_no_op() {
        let ctx = ctx("Write-Host 'a'\n", Position::new(1, 13));
        let edits = ChangeStringEnclosure
            .compute_edits(&ctx, &pick(0))
            .await
            .unwrap();
        assert!(edits.is_empty());
    }

    #[tokio::test]
    async fn test_expandable_with_expressions_is_kept() {
        let ctx = ctx("Write-Host \"hi $name\"\n", Position::new(1, 13));
        let ui = pick(0);
        let edits = ChangeStringEnclosure.compute_edits(&ctx, &ui).await.unwrap();

        assert!(edits.is_empty());
        assert_eq!(ui.warnings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_choice_is_cancellation() {
        let ctx = ctx("Write-Host 'a'\n", Position::new(1, 13));
        let err = ChangeStringEnclosure
            .compute_edits(&ctx, &ScriptedUi::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SuiteError>(),
            Some(SuiteError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_surround_selected_lines() {
        let text = "function Test {\n    Get-Item\n\n    Remove-Item\n}\n";
        let ctx = ctx(text, Position::new(2, 5)).with_selection(Some(Range::new(2, 5, 5, 1)));
        let ui = ScriptedUi {
            input: Some("try".to_string()),
            ..Default::default()
        };

        let result = rewrite(&SurroundSelectedLines, &ctx, &ui).await;
        assert_eq!(
            result,
            "function Test {\n    try {\n        Get-Item\n\n        Remove-Item\n    }\n}\n"
        );
    }

    #[tokio::test]
    async fn test_surround_without_header_is_cancellation() {
        let ctx = ctx("a\n", Position::new(1, 1)).with_selection(Some(Range::new(1, 1, 1, 2)));
        let ui = ScriptedUi {
            input: Some("   ".to_string()),
            ..Default::default()
        };
        let err = SurroundSelectedLines.compute_edits(&ctx, &ui).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SuiteError>(),
            Some(SuiteError::Cancelled)
        ));
    }

    #[test]
    fn test_builtin_providers_are_marked() {
        let candidates = builtin_providers();
        assert_eq!(candidates.len(), 2);
        assert!(candidates
            .iter()
            .all(|c| c.marked && c.module == BUILTIN_SCOPE));
    }
}
