pub mod location;
pub mod output;
