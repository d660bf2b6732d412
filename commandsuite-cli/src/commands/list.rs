use anyhow::Result;
use commandsuite::host::DocumentContextProvider;
use commandsuite::SuiteConfig;
use tokio_util::sync::CancellationToken;

use super::FileSession;
use crate::core::location::{parse_location, parse_selection};
use crate::core::output::{OutputFormat, OutputWriter, ProviderInfo};

pub async fn run(
    location: &str,
    select: Option<&str>,
    format: OutputFormat,
    config: SuiteConfig,
) -> Result<()> {
    let target = parse_location(location)?;
    let selection = select.map(parse_selection).transpose()?;
    let session = FileSession::open(&target, selection, config, true)?;

    let ctx = session
        .document
        .document_context(&CancellationToken::new())
        .await?;
    let providers: Vec<ProviderInfo> = session
        .suite
        .providers_for(&ctx)
        .iter()
        .map(|provider| ProviderInfo {
            name: provider.name().to_string(),
            description: provider.description().to_string(),
        })
        .collect();

    OutputWriter::stdout(format).write_providers(location, &providers)
}
