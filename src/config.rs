use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::registry::{Remote, Watch};

/// Initial contents of the registry.
///
/// The service behind the client is not implemented yet, so its state comes
/// from a seed file (or the built-in seed) and is never written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remotes: Vec<Remote>,
    #[serde(default)]
    pub watches: Vec<Watch>,
}

pub fn get_w2u_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "w2u").map(|dirs| dirs.config_dir().to_path_buf())
}

impl Config {
    pub fn builtin() -> Config {
        let watch = |directory: &str, url: &str, username: &str, remote_dir: &str| Watch {
            directory: PathBuf::from(directory),
            remote_url: url.to_string(),
            remote_username: username.to_string(),
            remote_dir: remote_dir.to_string(),
            enabled: true,
            delete_after_upload: false,
        };

        Config {
            remotes: vec![
                Remote::new("R1", "http://server.com/dav", "user", "password"),
                Remote::new("R2", "http://someserver.com/dav", "user1", "password"),
            ],
            watches: vec![
                watch("/local/dir", "http://server.com/dav", "user", "/remote/dir"),
                Watch {
                    delete_after_upload: true,
                    ..watch(
                        "/local/example",
                        "http://server.com/dav",
                        "user",
                        "/remote/example",
                    )
                },
                Watch {
                    enabled: false,
                    ..watch(
                        "/local/somedir",
                        "http://someserver.com/dav",
                        "user1",
                        "/remote/somedir",
                    )
                },
            ],
        }
    }

    /// `registry.yml` or `registry.yaml` in the user's config directory, if
    /// either exists.
    pub fn get_seed_path() -> Option<PathBuf> {
        let config_dir = get_w2u_config_dir()?;
        ["registry.yml", "registry.yaml"]
            .iter()
            .map(|name| config_dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Config> {
        let path = config_path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to load seed file '{}'", path.display()))
    }

    /// Loads `explicit` if given, then the user's seed file, then the
    /// built-in seed.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            anyhow::ensure!(
                path.is_file(),
                "Could not find seed file '{}'",
                path.display()
            );
            return Config::from_file(path);
        }

        match Config::get_seed_path() {
            Some(path) => {
                debug!("loading seed from {}", path.display());
                Config::from_file(path)
            }
            None => Ok(Config::builtin()),
        }
    }

    pub fn dump(&self) -> serde_yaml::Result<String> {
        let masked = Config {
            remotes: self.remotes.iter().map(Remote::masked).collect(),
            watches: self.watches.clone(),
        };
        serde_yaml::to_string(&masked)
    }
}
