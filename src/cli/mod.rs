pub mod dashboard;
pub mod data;
pub mod expenses;
pub mod rates;
pub mod settings;
pub mod setup;
pub mod ui;
