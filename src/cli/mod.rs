pub mod analyze;
pub mod fetch;
pub mod setup;
pub mod ui;
