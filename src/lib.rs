pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod kanban_board;
pub mod logging;
pub mod notify;
pub mod paths;
pub mod router;
pub mod runtime;
pub mod screens;
pub mod session;
pub mod task;
pub mod terminal;
pub mod ui;
pub mod user;
