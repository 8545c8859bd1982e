pub mod config;
pub mod locale;
pub mod report;
