pub mod backends;
pub mod catalog;
pub mod detect;
pub mod driver;
pub mod store;
pub mod translator;
