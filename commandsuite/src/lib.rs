//! Interactive refactor orchestration for console editors.
//!
//! A [`CommandSuite`] collects refactor providers, asks the user which one
//! applies at the cursor and hands the resulting edits to the host. Prompts
//! raised while a provider computes are run on the UI thread through a
//! [`controller::ThreadController`].

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod providers;
pub mod suite;
pub mod token;
pub mod types;
pub mod ui;

// Re-export key types
pub use config::SuiteConfig;
pub use error::{Result, SuiteError};
pub use providers::{FnProvider, RefactorProvider};
pub use suite::{CommandSuite, RefactorOutcome, SuiteSlot};
pub use token::{Token, TokenClass};
pub use types::{DocumentContext, EditSet, Position, Range, TextEdit};
