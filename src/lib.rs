pub mod catalog;
pub mod config;
pub mod converter;
pub mod downloader;
pub mod error;
pub mod helpers;
pub mod link;
pub mod server;
