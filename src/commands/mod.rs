pub mod config;
pub mod export;
pub mod month;
pub mod timeline;
pub mod watch;
pub mod week;
