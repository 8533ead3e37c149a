pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod file_utils;
pub mod registry;

pub use error::{RegistryError, Severity};
pub use registry::{Registry, Remote, RemoteKey, Watch, WatchFilter, WatchKey};
