pub mod config;
pub mod events;
#[cfg(feature = "gui")]
pub mod gui;
pub mod sys;
