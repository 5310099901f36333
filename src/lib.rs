pub mod app;
pub mod config;
pub mod egress;
pub mod orchestration;
pub mod server;
pub mod shared;
pub mod tools;
pub mod webui;
