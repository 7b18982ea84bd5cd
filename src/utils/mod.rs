/// Constants
pub mod constants;
/// Logger
pub mod logger;
