//! different utility modules used throughout the project
/// terminal logger set up from the log level string of the solver settings
pub mod logger;
