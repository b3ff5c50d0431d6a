pub mod app;
pub mod backend;
pub mod components;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod interaction;
pub mod inventory;
pub mod logging;
pub mod notice;
pub mod response;
pub mod session;
pub mod upload;
pub mod util;
pub mod view;
