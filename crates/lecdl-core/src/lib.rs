pub mod config;
pub mod logging;

pub mod dedup;
pub mod fetcher;
pub mod fs_util;
pub mod naming;
pub mod persist;
pub mod retry;
pub mod scheduler;
pub mod state_store;
pub mod task;
pub mod url_model;
