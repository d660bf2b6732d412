use super::menu::{InputPrompt, SelectItemMenu};
use super::messages::MessageSink;
use crate::controller::ControlHandle;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// One entry of a choice prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub description: Option<String>,
}

impl Choice {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// User interaction available to refactor providers while they compute.
///
/// Prompts resolve to `None` when the user cancels.
#[async_trait]
pub trait RefactorUi: Send + Sync {
    async fn show_input_prompt(&self, caption: &str, message: &str) -> Result<Option<String>>;

    /// Index of the picked choice
    async fn choose(
        &self,
        caption: &str,
        message: &str,
        choices: Vec<Choice>,
    ) -> Result<Option<usize>>;

    async fn show_error_message(&self, message: &str) -> Result<()>;

    async fn show_warning_message(&self, message: &str) -> Result<()>;

    async fn show_information_message(&self, message: &str) -> Result<()>;
}

/// Lets the user pick one of `items`, labelled by `label` and described by
/// `help`.
pub async fn show_choice_prompt<T, L, H>(
    ui: &dyn RefactorUi,
    caption: &str,
    message: &str,
    mut items: Vec<T>,
    label: L,
    help: H,
) -> Result<Option<T>>
where
    T: Send,
    L: Fn(&T) -> String,
    H: Fn(&T) -> Option<String>,
{
    let choices = items
        .iter()
        .map(|item| Choice {
            label: label(item),
            description: help(item),
        })
        .collect();

    let picked = ui.choose(caption, message, choices).await?;
    Ok(picked
        .filter(|&i| i < items.len())
        .map(|i| items.swap_remove(i)))
}

/// [`RefactorUi`] backed by the terminal menus, reached through the
/// controller that owns the UI thread.
pub struct ConsoleUi {
    control: ControlHandle,
    sink: Arc<MessageSink>,
    preview: Option<String>,
}

impl ConsoleUi {
    pub fn new(control: ControlHandle, sink: Arc<MessageSink>) -> Self {
        Self {
            control,
            sink,
            preview: None,
        }
    }

    /// Highlighted source line shown above every menu
    pub fn with_preview(mut self, preview: Option<String>) -> Self {
        self.preview = preview;
        self
    }
}

#[async_trait]
impl RefactorUi for ConsoleUi {
    async fn show_input_prompt(&self, caption: &str, message: &str) -> Result<Option<String>> {
        let prompt = InputPrompt::new(caption, message);
        self.control.invoke(move |ui| ui.input(prompt)).await?
    }

    async fn choose(
        &self,
        caption: &str,
        message: &str,
        choices: Vec<Choice>,
    ) -> Result<Option<usize>> {
        let (labels, descriptions): (Vec<String>, Vec<Option<String>>) = choices
            .into_iter()
            .map(|choice| (choice.label, choice.description))
            .unzip();

        let indices: Vec<usize> = (0..labels.len()).collect();
        let mut menu = SelectItemMenu::new(caption, message, indices)
            .render_item(move |_, &i| labels[i].clone());
        if descriptions.iter().any(Option::is_some) {
            menu = menu.render_item_description(move |_, &i| {
                descriptions[i].clone().unwrap_or_default()
            });
        }
        if let Some(preview) = &self.preview {
            menu = menu.with_preview(preview.clone());
        }

        self.control.invoke(move |ui| ui.select(menu)).await?
    }

    async fn show_error_message(&self, message: &str) -> Result<()> {
        self.sink.error(message)
    }

    async fn show_warning_message(&self, message: &str) -> Result<()> {
        self.sink.warn(message)
    }

    async fn show_information_message(&self, message: &str) -> Result<()> {
        self.sink.info(message)
    }
}
