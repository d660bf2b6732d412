pub mod builtin;
pub mod edits;
mod preview;
mod transaction;

pub use builtin::{builtin_providers, BUILTIN_SCOPE};
pub use edits::{FileEditProcessor, PreviewLog};
