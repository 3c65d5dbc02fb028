// Library for tests to access modules

pub mod config;
pub mod models;
pub mod probe;
pub mod recorder;
pub mod store;
pub mod ui;
