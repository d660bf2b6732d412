use anyhow::{Context, Result};
use commandsuite::ui::render_tokens;
use std::path::Path;

use crate::document::ScriptLexer;

/// Syntax-highlighted copy of `text`
pub fn highlight(text: &str) -> String {
    let tokens = ScriptLexer::tokenize(text);
    // Leading whitespace is not covered by any token
    let lead = tokens.first().map(|t| t.start()).unwrap_or(text.len());
    let mut out = text[..lead].to_string();
    out.push_str(&render_tokens(&tokens));
    out
}

pub async fn run(file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    print!("{}", highlight(&text));
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
