pub mod app;
pub mod art;
pub mod stage;
pub mod theme;
