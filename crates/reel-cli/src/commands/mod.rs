pub mod add;
pub mod common;
pub mod completions;
pub mod flags;
pub mod list;
pub mod refresh;
pub mod reset;
pub mod search;
pub mod show;
