pub mod init_config;
pub mod list;
pub mod refactor;
pub mod render;

use anyhow::Result;
use commandsuite::host::DocumentContextProvider;
use commandsuite::ui::MessageSink;
use commandsuite::{CommandSuite, Range, SuiteConfig};
use std::path::Path;
use std::sync::Arc;

use crate::core::location::Location;
use crate::document::{FileDocument, ReportingNavigation};
use crate::refactor::{builtin_providers, FileEditProcessor, PreviewLog, BUILTIN_SCOPE};

/// Config from `--config`, or the usual global/project lookup
pub fn load_config(path: Option<&Path>) -> Result<SuiteConfig> {
    match path {
        Some(path) => SuiteConfig::load_from_file(path),
        None => SuiteConfig::load(),
    }
}

/// A suite wired to one file on disk, with the built-in refactors loaded
pub struct FileSession {
    pub suite: CommandSuite,
    pub document: Arc<FileDocument>,
    pub previews: PreviewLog,
}

impl FileSession {
    pub fn open(
        location: &Location,
        selection: Option<Range>,
        config: SuiteConfig,
        dry_run: bool,
    ) -> Result<Self> {
        let sink = Arc::new(MessageSink::stdout().with_color(config.messages.color));
        let document = Arc::new(
            FileDocument::new(&location.file_path, location.position).with_selection(selection),
        );
        let processor =
            FileEditProcessor::new(&location.file_path, document.snapshot()).dry_run(dry_run);
        let previews = processor.previews();

        let suite = CommandSuite::builder()
            .context_provider(Arc::clone(&document) as Arc<dyn DocumentContextProvider>)
            .edit_processor(Arc::new(processor))
            .navigation(Arc::new(ReportingNavigation::new(
                &location.file_path,
                Arc::clone(&sink),
            )))
            .sink(sink)
            .config(config)
            .build()?;

        let imported = suite.import_scope(BUILTIN_SCOPE, &builtin_providers());
        tracing::debug!("Loaded {} built-in refactor(s)", imported);

        Ok(Self {
            suite,
            document,
            previews,
        })
    }
}
