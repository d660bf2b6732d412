use anyhow::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A refactor offered at a location
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
}

pub struct OutputWriter<W: Write> {
    format: OutputFormat,
    out: W,
}

impl OutputWriter<std::io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }
}

impl<W: Write> OutputWriter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn write_providers(&mut self, location: &str, providers: &[ProviderInfo]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(providers)?)?;
            }
            OutputFormat::Text => {
                if providers.is_empty() {
                    writeln!(self.out, "No refactors available at {}", location)?;
                    return Ok(());
                }
                writeln!(self.out, "Refactors available at {}:", location)?;
                for provider in providers {
                    writeln!(self.out, "  {}", provider.name)?;
                    if !provider.description.is_empty() {
                        writeln!(self.out, "      {}", provider.description)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn providers() -> Vec<ProviderInfo> {
        vec![ProviderInfo {
            name: "Change string enclosure".to_string(),
            description: "Switch between quote styles".to_string(),
        }]
    }

    #[test]
    fn test_text_output() {
        let mut writer = OutputWriter::new(OutputFormat::Text, Vec::new());
        writer.write_providers("a.ps1:1:1", &providers()).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            out,
            "Refactors available at a.ps1:1:1:\n  Change string enclosure\n      Switch between quote styles\n"
        );
    }

    #[test]
    fn test_json_output() {
        let mut writer = OutputWriter::new(OutputFormat::Json, Vec::new());
        writer.write_providers("a.ps1:1:1", &providers()).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Change string enclosure");
    }

    #[test]
    fn test_text_output_when_empty() {
        let mut writer = OutputWriter::new(OutputFormat::Text, Vec::new());
        writer.write_providers("a.ps1:2:1", &[]).unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "No refactors available at a.ps1:2:1\n");
    }
}
