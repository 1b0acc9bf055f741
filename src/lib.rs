// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod classifier;
pub mod config;
pub mod display;
pub mod history;
pub mod letters;
pub mod practice;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod util;
