use anyhow::Result;
use commandsuite::ui::CrosstermConsole;
use commandsuite::{RefactorOutcome, SuiteConfig};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::FileSession;
use crate::core::location::{parse_location, parse_selection};

pub fn run(
    runtime: &Runtime,
    location: &str,
    select: Option<&str>,
    dry_run: bool,
    config: SuiteConfig,
) -> Result<()> {
    let target = parse_location(location)?;
    let selection = select.map(parse_selection).transpose()?;
    let session = FileSession::open(&target, selection, config, dry_run)?;

    let token = CancellationToken::new();
    let interrupt = token.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut ui = session.suite.ui_context(Box::new(CrosstermConsole::new()));
    let outcome = session
        .suite
        .request_refactor(&mut ui, runtime.handle(), &token)?;

    match outcome {
        RefactorOutcome::NoRefactors => {
            println!("No refactors available at {}", location);
        }
        RefactorOutcome::Cancelled => {
            println!("Refactor cancelled");
        }
        RefactorOutcome::Applied { provider, edits } => {
            if dry_run {
                print!("{}", session.previews.take());
                println!("\n💡 Run without --dry-run to apply '{}'", provider);
            } else {
                println!("✅ Applied '{}' ({} edit{})", provider, edits, if edits == 1 { "" } else { "s" });
            }
        }
        RefactorOutcome::Rejected { provider, reason } => {
            tracing::debug!("'{}' was rejected: {}", provider, reason);
        }
    }

    Ok(())
}
