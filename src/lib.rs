pub mod app;
pub mod batch;
pub mod config;
pub mod domain;
pub mod elsevier;
pub mod error;
pub mod fetch;
pub mod output;
pub mod search;
pub mod store;
