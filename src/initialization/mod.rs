//! Application initialization.
//!
//! Sets up process-wide resources for the command-line front end. The library
//! itself never installs a logger.

mod logger;

pub use logger::init_logger_with;
