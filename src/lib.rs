/*
 * Responsibility
 * - module layout of the smart deals API
 * - exposed as a library so integration tests can build the router
 *   with a test-double store
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
