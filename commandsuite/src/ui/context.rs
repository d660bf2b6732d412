use super::console::Console;
use super::menu::{InputPrompt, MenuOptions, SelectItemMenu};
use super::messages::MessageSink;
use crate::error::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything that may only be touched from the UI-owning thread.
pub struct UiContext {
    console: Box<dyn Console>,
    sink: Arc<MessageSink>,
    options: MenuOptions,
    cancellation: CancellationToken,
}

impl UiContext {
    pub fn new(console: Box<dyn Console>, sink: Arc<MessageSink>) -> Self {
        Self {
            console,
            sink,
            options: MenuOptions::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    pub fn console(&mut self) -> &mut dyn Console {
        self.console.as_mut()
    }

    pub fn sink(&self) -> &Arc<MessageSink> {
        &self.sink
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    /// Token that closes open menus, returning the one it replaces
    pub fn replace_cancellation(&mut self, token: CancellationToken) -> CancellationToken {
        std::mem::replace(&mut self.cancellation, token)
    }

    pub fn select<T>(&mut self, menu: SelectItemMenu<T>) -> Result<Option<T>> {
        let menu = menu
            .with_options(self.options.clone())
            .with_cancellation(self.cancellation.clone());
        menu.bind(self.console.as_mut(), &self.sink)
    }

    pub fn input(&mut self, prompt: InputPrompt) -> Result<Option<String>> {
        let prompt = prompt
            .with_options(self.options.clone())
            .with_cancellation(self.cancellation.clone());
        prompt.bind(self.console.as_mut(), &self.sink)
    }
}
