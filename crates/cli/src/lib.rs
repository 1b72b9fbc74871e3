pub mod app;
pub mod cli;
pub mod liveness;
pub mod logging;
pub mod webhook;
