pub mod api;
pub mod config;
pub mod event;
pub mod filter;
pub mod mime;
pub mod observability;
pub mod pipeline;
pub mod storage;
pub mod webhook;
