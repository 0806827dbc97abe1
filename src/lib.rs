//! Terminal browser for the TMDB movie and TV catalog.
//!
//! The data layer (`debounce`, `cache`, `loader`, `prefetch`, `pagination`,
//! `sentinel`) is independent of the terminal front-end in `app` and `ui`.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod event;
pub mod loader;
pub mod logging;
pub mod pagination;
pub mod prefetch;
pub mod sentinel;
pub mod session;
pub mod ui;
