/*
 * Responsibility
 * - crate root: exposes the modules so the binary and the integration tests share them
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
