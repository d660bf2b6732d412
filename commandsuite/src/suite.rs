//! The refactor command: from a document context to applied edits.

use crate::config::SuiteConfig;
use crate::controller::ThreadController;
use crate::error::{Result, SuiteError};
use crate::host::{DocumentContextProvider, DocumentEditProcessor, NavigationService};
use crate::providers::{ProviderRegistry, ProviderSource, RefactorProvider};
use crate::token::Token;
use crate::types::{DocumentContext, Position};
use crate::ui::console::Console;
use crate::ui::messages::MessageSink;
use crate::ui::render::render_tokens;
use crate::ui::service::{show_choice_prompt, ConsoleUi, RefactorUi};
use crate::ui::UiContext;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// How a refactor request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefactorOutcome {
    /// No registered provider applies at the cursor
    NoRefactors,
    /// The user or host backed out; nothing was applied
    Cancelled,
    Applied { provider: String, edits: usize },
    /// The edit processor refused the provider's edits
    Rejected { provider: String, reason: String },
}

/// Refactor orchestration for one editor session.
///
/// Cloning shares the registry and collaborators.
#[derive(Clone)]
pub struct CommandSuite {
    registry: Arc<RwLock<ProviderRegistry>>,
    context_provider: Arc<dyn DocumentContextProvider>,
    edit_processor: Arc<dyn DocumentEditProcessor>,
    navigation: Arc<dyn NavigationService>,
    sink: Arc<MessageSink>,
    config: Arc<SuiteConfig>,
}

impl CommandSuite {
    pub fn builder() -> CommandSuiteBuilder {
        CommandSuiteBuilder::default()
    }

    pub fn sink(&self) -> &Arc<MessageSink> {
        &self.sink
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// UI-thread state for `console`, wired to this suite's sink and menu
    /// settings
    pub fn ui_context(&self, console: Box<dyn Console>) -> UiContext {
        UiContext::new(console, Arc::clone(&self.sink)).with_options(self.config.menu_options())
    }

    pub fn register_provider(&self, provider: Arc<dyn RefactorProvider>) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(provider);
    }

    pub fn import_scope(&self, scope: &str, source: &dyn ProviderSource) -> usize {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .import_scope(scope, source)
    }

    /// Providers applicable to `ctx`, in registration order
    pub fn providers_for(&self, ctx: &DocumentContext) -> Vec<Arc<dyn RefactorProvider>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .query(ctx)
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Runs one refactor request. Must be called on the thread that owns
    /// `ui`; the computation itself runs on `runtime`.
    ///
    /// Cancellation is reported as [`RefactorOutcome::Cancelled`], never as
    /// an error.
    pub fn request_refactor(
        &self,
        ui: &mut UiContext,
        runtime: &Handle,
        token: &CancellationToken,
    ) -> Result<RefactorOutcome> {
        let controller = ThreadController::new().with_poll_interval(self.config.poll_interval());
        let control = controller.handle();
        let suite = self.clone();
        let worker_token = token.clone();

        let request = async move {
            let ctx = suite
                .context_provider
                .document_context(&worker_token)
                .await?
                .with_cancellation(worker_token);
            tracing::debug!("Refactor requested at {}", ctx.cursor());

            let console_ui =
                ConsoleUi::new(control, Arc::clone(&suite.sink)).with_preview(preview_line(&ctx));
            suite.run_request(&ctx, &console_ui).await
        };

        let result = controller.give_control(ui, runtime, request, token);
        if let Err(e) = self.sink.flush() {
            tracing::error!("Failed to flush queued messages: {}", e);
        }

        match result {
            Ok(outcome) => {
                tracing::info!("Refactor request finished: {:?}", outcome);
                Ok(outcome)
            }
            Err(e) if e.is_cancellation() => {
                tracing::info!("Refactor request cancelled");
                Ok(RefactorOutcome::Cancelled)
            }
            Err(e) => {
                tracing::error!("Refactor request failed: {}", e);
                Err(e)
            }
        }
    }

    /// The request itself, against an already built context.
    pub async fn run_request(
        &self,
        ctx: &DocumentContext,
        ui: &dyn RefactorUi,
    ) -> Result<RefactorOutcome> {
        let token = ctx.cancellation();

        let candidates = self.providers_for(ctx);
        if candidates.is_empty() {
            tracing::debug!("No refactors apply at {}", ctx.cursor());
            return Ok(RefactorOutcome::NoRefactors);
        }
        if token.is_cancelled() {
            return Ok(RefactorOutcome::Cancelled);
        }

        let picked = show_choice_prompt(
            ui,
            &self.config.refactor.select_caption,
            &self.config.refactor.select_message,
            candidates,
            |provider| provider.name().to_string(),
            |provider| Some(provider.description().to_string()).filter(|d| !d.is_empty()),
        )
        .await;
        let provider = match picked {
            Ok(Some(provider)) => provider,
            Ok(None) => return Ok(RefactorOutcome::Cancelled),
            Err(e) if e.is_cancellation() => return Ok(RefactorOutcome::Cancelled),
            Err(e) => return Err(e),
        };
        if token.is_cancelled() {
            return Ok(RefactorOutcome::Cancelled);
        }

        let name = provider.name().to_string();
        tracing::info!("Computing edits for '{}'", name);
        let edits = match provider.compute_edits(ctx, ui).await {
            Ok(edits) => edits,
            Err(e) => {
                let e = SuiteError::from(e);
                if e.is_cancellation() {
                    return Ok(RefactorOutcome::Cancelled);
                }
                return Err(e);
            }
        };
        if token.is_cancelled() {
            tracing::debug!("Dropping {} edit(s) from '{}' after cancellation", edits.len(), name);
            return Ok(RefactorOutcome::Cancelled);
        }

        let count = edits.len();
        match self.edit_processor.apply(edits, token).await {
            Ok(()) => {}
            Err(SuiteError::EditConflict(reason)) => {
                ui.show_error_message(&format!("{} could not be applied: {}", name, reason))
                    .await?;
                return Ok(RefactorOutcome::Rejected {
                    provider: name,
                    reason,
                });
            }
            Err(e) if e.is_cancellation() => return Ok(RefactorOutcome::Cancelled),
            Err(e) => return Err(e),
        }

        if let Some(range) = ctx.selection() {
            self.navigation.set_selection(range, token).await?;
        }

        Ok(RefactorOutcome::Applied {
            provider: name,
            edits: count,
        })
    }
}

/// Highlighted text of the cursor line, when the context carries tokens
fn preview_line(ctx: &DocumentContext) -> Option<String> {
    let line_start = ctx.offset_of(Position::new(ctx.cursor().line, 1))?;
    let line_end = line_start + ctx.cursor_line().len();
    let tokens: Vec<Token> = ctx
        .tokens()
        .iter()
        .filter(|token| token.start() >= line_start && token.end() <= line_end)
        .cloned()
        .collect();
    if tokens.is_empty() {
        return None;
    }
    Some(render_tokens(&tokens))
}

#[derive(Default)]
pub struct CommandSuiteBuilder {
    context_provider: Option<Arc<dyn DocumentContextProvider>>,
    edit_processor: Option<Arc<dyn DocumentEditProcessor>>,
    navigation: Option<Arc<dyn NavigationService>>,
    sink: Option<Arc<MessageSink>>,
    config: SuiteConfig,
}

impl CommandSuiteBuilder {
    pub fn context_provider(mut self, provider: Arc<dyn DocumentContextProvider>) -> Self {
        self.context_provider = Some(provider);
        self
    }

    pub fn edit_processor(mut self, processor: Arc<dyn DocumentEditProcessor>) -> Self {
        self.edit_processor = Some(processor);
        self
    }

    pub fn navigation(mut self, navigation: Arc<dyn NavigationService>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Defaults to stdout, colored per the config
    pub fn sink(mut self, sink: Arc<MessageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CommandSuite> {
        let context_provider = self
            .context_provider
            .ok_or_else(|| SuiteError::Config("no document context provider".to_string()))?;
        let edit_processor = self
            .edit_processor
            .ok_or_else(|| SuiteError::Config("no document edit processor".to_string()))?;
        let navigation = self
            .navigation
            .ok_or_else(|| SuiteError::Config("no navigation service".to_string()))?;
        let sink = self.sink.unwrap_or_else(|| {
            Arc::new(MessageSink::stdout().with_color(self.config.messages.color))
        });

        Ok(CommandSuite {
            registry: Arc::new(RwLock::new(ProviderRegistry::new())),
            context_provider,
            edit_processor,
            navigation,
            sink,
            config: Arc::new(self.config),
        })
    }
}

/// Holds the one [`CommandSuite`] of a session.
pub struct SuiteSlot {
    cell: OnceLock<CommandSuite>,
}

impl SuiteSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn initialize(&self, suite: CommandSuite) -> Result<&CommandSuite> {
        self.cell
            .set(suite)
            .map_err(|_| SuiteError::AlreadyInitialized)?;
        self.instance()
    }

    pub fn instance(&self) -> Result<&CommandSuite> {
        self.cell.get().ok_or(SuiteError::NotInitialized)
    }
}

impl Default for SuiteSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenClass;
    use crate::types::{EditSet, Range};
    use crate::ui::service::Choice;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        edits: Mutex<Vec<EditSet>>,
        selections: Mutex<Vec<Range>>,
        conflict: bool,
    }

    #[async_trait]
    impl DocumentContextProvider for Recorder {
        async fn document_context(&self, _token: &CancellationToken) -> Result<DocumentContext> {
            Ok(DocumentContext::new("x", Position::new(1, 1)))
        }
    }

    #[async_trait]
    impl DocumentEditProcessor for Recorder {
        async fn apply(&self, edits: EditSet, _token: &CancellationToken) -> Result<()> {
            if self.conflict {
                return Err(SuiteError::EditConflict("ranges overlap".to_string()));
            }
            self.edits.lock().unwrap().push(edits);
            Ok(())
        }
    }

    #[async_trait]
    impl NavigationService for Recorder {
        async fn set_selection(&self, range: Range, _token: &CancellationToken) -> Result<()> {
            self.selections.lock().unwrap().push(range);
            Ok(())
        }
    }

    /// Picks a fixed choice and records everything it is asked to show
    #[derive(Default)]
    struct MockUi {
        pick: Option<usize>,
        prompts: AtomicUsize,
        labels: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RefactorUi for MockUi {
        async fn show_input_prompt(&self, _caption: &str, _message: &str) -> Result<Option<String>> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn choose(
            &self,
            caption: &str,
            _message: &str,
            choices: Vec<Choice>,
        ) -> Result<Option<usize>> {
            assert_eq!(caption, "Select a refactor option");
            self.prompts.fetch_add(1, Ordering::SeqCst);
            *self.labels.lock().unwrap() = choices.into_iter().map(|c| c.label).collect();
            Ok(self.pick)
        }

        async fn show_error_message(&self, message: &str) -> Result<()> {
            self.errors.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn show_warning_message(&self, _message: &str) -> Result<()> {
            Ok(())
        }

        async fn show_information_message(&self, _message: &str) -> Result<()> {
            Ok(())
        }
    }

    struct Fixed {
        name: &'static str,
        applicable: bool,
        result: fn() -> anyhow::Result<EditSet>,
    }

    #[async_trait]
    impl RefactorProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            ""
        }
        fn is_applicable(&self, _ctx: &DocumentContext) -> anyhow::Result<bool> {
            Ok(self.applicable)
        }
        async fn compute_edits(
            &self,
            _ctx: &DocumentContext,
            _ui: &dyn RefactorUi,
        ) -> anyhow::Result<EditSet> {
            (self.result)()
        }
    }

    fn one_edit() -> anyhow::Result<EditSet> {
        Ok(EditSet::single(Range::new(1, 1, 1, 2), "y"))
    }

    fn suite(recorder: &Arc<Recorder>) -> CommandSuite {
        CommandSuite::builder()
            .context_provider(recorder.clone())
            .edit_processor(recorder.clone())
            .navigation(recorder.clone())
            .sink(Arc::new(MessageSink::new(std::io::sink())))
            .build()
            .unwrap()
    }

    fn ctx() -> DocumentContext {
        DocumentContext::new("x", Position::new(1, 1))
    }

    #[tokio::test]
    async fn test_empty_registry_skips_all_interaction() {
        let recorder = Arc::new(Recorder::default());
        let suite = suite(&recorder);
        let ui = MockUi::default();

        let outcome = suite.run_request(&ctx(), &ui).await.unwrap();

        assert_eq!(outcome, RefactorOutcome::NoRefactors);
        assert_eq!(ui.prompts.load(Ordering::SeqCst), 0);
        assert!(recorder.edits.lock().unwrap().is_empty());
        assert!(recorder.selections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_only_applicable_providers_are_offered() {
        let recorder = Arc::new(Recorder::default());
        let suite = suite(&recorder);
        for (name, applicable) in [("A", false), ("B", true), ("C", true)] {
            suite.register_provider(Arc::new(Fixed {
                name,
                applicable,
                result: one_edit,
            }));
        }
        let ui = MockUi {
            pick: Some(1),
            ..Default::default()
        };

        let outcome = suite.run_request(&ctx(), &ui).await.unwrap();

        assert_eq!(*ui.labels.lock().unwrap(), vec!["B", "C"]);
        assert_eq!(
            outcome,
            RefactorOutcome::Applied {
                provider: "C".to_string(),
                edits: 1
            }
        );
        // no selection in the context, so navigation is left alone
        assert!(recorder.selections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_choice_applies_nothing() {
        let recorder = Arc::new(Recorder::default());
        let suite = suite(&recorder);
        suite.register_provider(Arc::new(Fixed {
            name: "A",
            applicable: true,
            result: one_edit,
        }));
        let ui = MockUi::default();

        let outcome = suite.run_request(&ctx(), &ui).await.unwrap();

        assert_eq!(outcome, RefactorOutcome::Cancelled);
        assert!(recorder.edits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_conflict_is_reported_not_raised() {
        let recorder = Arc::new(Recorder {
            conflict: true,
            ..Default::default()
        });
        let suite = suite(&recorder);
        suite.register_provider(Arc::new(Fixed {
            name: "A",
            applicable: true,
            result: one_edit,
        }));
        let ui = MockUi {
            pick: Some(0),
            ..Default::default()
        };

        let outcome = suite
            .run_request(&ctx().with_selection(Some(Range::new(1, 1, 1, 1))), &ui)
            .await
            .unwrap();

        assert!(matches!(outcome, RefactorOutcome::Rejected { ref reason, .. } if reason == "ranges overlap"));
        assert_eq!(ui.errors.lock().unwrap().len(), 1);
        assert!(recorder.selections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let recorder = Arc::new(Recorder::default());
        let suite = suite(&recorder);
        suite.register_provider(Arc::new(Fixed {
            name: "A",
            applicable: true,
            result: || Err(anyhow!("cannot compute")),
        }));
        let ui = MockUi {
            pick: Some(0),
            ..Default::default()
        };

        let err = suite.run_request(&ctx(), &ui).await.unwrap_err();

        assert!(err.to_string().contains("cannot compute"));
        assert!(recorder.edits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = CommandSuite::builder().build();
        assert!(matches!(result, Err(SuiteError::Config(_))));
    }

    #[test]
    fn test_slot_initializes_once() {
        let slot = SuiteSlot::new();
        assert!(matches!(slot.instance(), Err(SuiteError::NotInitialized)));

        let recorder = Arc::new(Recorder::default());
        slot.initialize(suite(&recorder)).unwrap();
        assert!(slot.instance().is_ok());
        assert!(matches!(
            slot.initialize(suite(&recorder)),
            Err(SuiteError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_preview_covers_cursor_line_only() {
        let text = "$a = 1\nWrite-Host $a";
        let ctx = DocumentContext::new(text, Position::new(2, 3)).with_tokens(vec![
            Token::leaf(TokenClass::Variable, 0, "$a"),
            Token::leaf(TokenClass::Command, 7, "Write-Host"),
            Token::leaf(TokenClass::Variable, 18, "$a"),
        ]);

        let preview = preview_line(&ctx).unwrap();
        assert_eq!(crate::ui::strip_styles(&preview), "Write-Host $a");
    }

    /// Accepts writes but fails every flush
    struct UnflushableOutput;

    impl std::io::Write for UnflushableOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "terminal closed"))
        }
    }

    #[test]
    fn test_sink_flush_failure_keeps_outcome() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let suite = CommandSuite::builder()
            .context_provider(recorder.clone())
            .edit_processor(recorder.clone())
            .navigation(recorder.clone())
            .sink(Arc::new(MessageSink::new(UnflushableOutput)))
            .build()
            .unwrap();
        let mut ui = suite.ui_context(Box::new(crate::ui::ScriptedConsole::new(80, 24)));

        let outcome = suite
            .request_refactor(&mut ui, runtime.handle(), &CancellationToken::new())
            .unwrap();
        assert_eq!(outcome, RefactorOutcome::NoRefactors);
    }
}
