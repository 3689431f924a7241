pub mod config;
pub mod errors;
pub mod registry;
pub mod webapi_utils;
