pub mod colors;
pub mod console;
pub mod context;
pub mod menu;
pub mod messages;
pub mod render;
pub mod service;

pub use console::{Console, CrosstermConsole, ScriptedConsole};
pub use context::UiContext;
pub use menu::{InputPrompt, MenuOptions, SelectItemMenu};
pub use messages::{MessageSink, Severity};
pub use render::{measure_height, render_tokens, strip_styles};
pub use service::{show_choice_prompt, Choice, ConsoleUi, RefactorUi};
