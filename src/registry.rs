use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{config::Config, error::RegistryError, file_utils::absolute_path};

type Result<T> = std::result::Result<T, RegistryError>;

fn default_true() -> bool {
    true
}

/// A local directory bound to an upload target.
///
/// `remote_url` and `remote_username` are copied from the remote at creation
/// time and are not kept in sync with later edits to that remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    pub directory: PathBuf,
    pub remote_url: String,
    pub remote_username: String,
    pub remote_dir: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, rename = "delete")]
    pub delete_after_upload: bool,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub id: String,
    pub url: String,
    pub username: String,
    #[serde(default)]
    password: String,
}

impl Remote {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Remote {
        Remote {
            id: id.into(),
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn masked(&self) -> Remote {
        Remote {
            password: "********".to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remote")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchFilter {
    All,
    EnabledOnly,
}

/// Configuration options of a watch, as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKey {
    RemoteDir,
    RemoteUrl,
    RemoteUsername,
    /// Accepted by `set` but not stored yet, and never readable.
    RemotePassword,
    Delete,
}

impl WatchKey {
    pub const NAMES: &'static [&'static str] = &[
        "remote-dir",
        "remote-url",
        "remote-username",
        "remote-password",
        "delete",
    ];
    pub const READABLE: &'static [&'static str] =
        &["remote-dir", "remote-url", "remote-username", "delete"];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchKey::RemoteDir => "remote-dir",
            WatchKey::RemoteUrl => "remote-url",
            WatchKey::RemoteUsername => "remote-username",
            WatchKey::RemotePassword => "remote-password",
            WatchKey::Delete => "delete",
        }
    }
}

impl FromStr for WatchKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "remote-dir" => Ok(WatchKey::RemoteDir),
            "remote-url" => Ok(WatchKey::RemoteUrl),
            "remote-username" => Ok(WatchKey::RemoteUsername),
            "remote-password" => Ok(WatchKey::RemotePassword),
            "delete" => Ok(WatchKey::Delete),
            other => Err(RegistryError::UnknownConfigKey {
                key: other.to_string(),
                valid: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for WatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options of a remote. Only `url` and `username` can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    Url,
    Username,
    Password,
}

impl RemoteKey {
    pub const NAMES: &'static [&'static str] = &["url", "username", "password"];
    pub const READABLE: &'static [&'static str] = &["url", "username"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteKey::Url => "url",
            RemoteKey::Username => "username",
            RemoteKey::Password => "password",
        }
    }
}

impl FromStr for RemoteKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(RemoteKey::Url),
            "username" => Ok(RemoteKey::Username),
            "password" => Ok(RemoteKey::Password),
            other => Err(RegistryError::UnknownConfigKey {
                key: other.to_string(),
                valid: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that `url` is an http(s) URL with a host and a path below the root.
pub fn validate_remote_url(url: &str) -> Result<()> {
    let parsed =
        Url::parse(url).map_err(|e| RegistryError::invalid(format!("invalid url '{url}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RegistryError::invalid(format!(
            "invalid url '{url}': scheme must be http or https"
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(RegistryError::invalid(format!(
            "invalid url '{url}': missing host"
        )));
    }

    if parsed.path().trim_matches('/').is_empty() {
        return Err(RegistryError::invalid(format!(
            "invalid url '{url}': missing path"
        )));
    }

    Ok(())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(RegistryError::invalid(format!(
            "invalid value '{other}': expected 0 or 1"
        ))),
    }
}

fn flag_str(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn parse_remote_number(id: &str) -> Option<u64> {
    id.strip_prefix('R')?.parse().ok()
}

/// In-memory store of watches and remotes.
///
/// Collections are small (one user's watch list), so lookups are linear
/// scans and insertion order is preserved.
#[derive(Debug)]
pub struct Registry {
    watches: Vec<Watch>,
    remotes: Vec<Remote>,
    /// `None` once the counter has run past `u64::MAX`.
    next_remote_id: Option<u64>,
}

impl Registry {
    /// Builds a registry from seed data, holding it to the same invariants
    /// as entries added at runtime: watch directories are resolved to their
    /// absolute form and must be unique, remote ids and `(url, username)`
    /// pairs must be unique.
    pub fn new(watches: Vec<Watch>, remotes: Vec<Remote>) -> Result<Registry> {
        let mut registry = Registry::empty();

        for remote in remotes {
            if registry.remotes.iter().any(|r| r.id == remote.id) {
                return Err(RegistryError::invalid(format!(
                    "duplicate remote id '{}'",
                    remote.id
                )));
            }
            registry.ensure_unique_remote(&remote.url, &remote.username, None)?;
            registry.remotes.push(remote);
        }

        registry.next_remote_id = registry
            .remotes
            .iter()
            .filter_map(|r| parse_remote_number(&r.id))
            .max()
            .map_or(Some(1), |n| n.checked_add(1));

        for mut watch in watches {
            watch.directory = resolve(&watch.directory)?;
            if registry.watches.iter().any(|w| w.directory == watch.directory) {
                return Err(RegistryError::DirectoryExists(watch.directory));
            }
            registry.watches.push(watch);
        }

        Ok(registry)
    }

    pub fn empty() -> Registry {
        Registry {
            watches: Vec::new(),
            remotes: Vec::new(),
            next_remote_id: Some(1),
        }
    }

    pub fn from_config(config: Config) -> Result<Registry> {
        Registry::new(config.watches, config.remotes)
    }

    pub fn add_watch(
        &mut self,
        directory: &Path,
        remote_id: &str,
        remote_dir: &str,
        delete: bool,
        enable: bool,
    ) -> Result<&Watch> {
        if !directory.is_dir() {
            return Err(RegistryError::invalid(format!(
                "'{}' is not a directory",
                directory.display()
            )));
        }

        let remote = self.remote(remote_id)?;
        let remote_url = remote.url.clone();
        let remote_username = remote.username.clone();

        let directory = resolve(directory)?;
        if self.watches.iter().any(|w| w.directory == directory) {
            return Err(RegistryError::DirectoryExists(directory));
        }

        debug!(
            "adding watch {} -> {remote_id}:{remote_dir}",
            directory.display()
        );
        self.watches.push(Watch {
            directory,
            remote_url,
            remote_username,
            remote_dir: remote_dir.to_string(),
            enabled: enable,
            delete_after_upload: delete,
        });

        Ok(&self.watches[self.watches.len() - 1])
    }

    pub fn list_watches(&self, filter: WatchFilter) -> Vec<&Watch> {
        self.watches
            .iter()
            .filter(|w| filter == WatchFilter::All || w.enabled)
            .collect()
    }

    pub fn remove_watch(&mut self, directory: &Path) -> Result<Watch> {
        let directory = resolve(directory)?;
        let index = self
            .watches
            .iter()
            .position(|w| w.directory == directory)
            .ok_or(RegistryError::DirectoryNotFound(directory))?;

        let removed = self.watches.remove(index);
        debug!("removed watch {}", removed.directory.display());
        Ok(removed)
    }

    pub fn enable_watch(&mut self, directory: &Path) -> Result<()> {
        self.set_enabled(directory, true)
    }

    pub fn disable_watch(&mut self, directory: &Path) -> Result<()> {
        self.set_enabled(directory, false)
    }

    fn set_enabled(&mut self, directory: &Path, enabled: bool) -> Result<()> {
        let watch = self.watch_mut(directory)?;
        watch.enabled = enabled;
        debug!("watch {} enabled={enabled}", watch.directory.display());
        Ok(())
    }

    pub fn set_watch_config(&mut self, directory: &Path, key: WatchKey, value: &str) -> Result<()> {
        match key {
            WatchKey::RemoteUrl => validate_remote_url(value)?,
            WatchKey::Delete => {
                parse_flag(value)?;
            }
            _ => {}
        }

        let watch = self.watch_mut(directory)?;
        match key {
            WatchKey::RemoteDir => watch.remote_dir = value.to_string(),
            WatchKey::RemoteUrl => watch.remote_url = value.to_string(),
            WatchKey::RemoteUsername => watch.remote_username = value.to_string(),
            WatchKey::RemotePassword => {
                debug!("remote-password is not stored yet, ignoring");
                return Ok(());
            }
            WatchKey::Delete => watch.delete_after_upload = parse_flag(value)?,
        }

        debug!("watch {} {key}={value}", watch.directory.display());
        Ok(())
    }

    pub fn get_watch_config(&self, directory: &Path, key: WatchKey) -> Result<String> {
        let watch = self.watch(directory)?;
        let value = match key {
            WatchKey::RemoteDir => watch.remote_dir.clone(),
            WatchKey::RemoteUrl => watch.remote_url.clone(),
            WatchKey::RemoteUsername => watch.remote_username.clone(),
            WatchKey::RemotePassword => {
                return Err(RegistryError::UnknownConfigKey {
                    key: key.to_string(),
                    valid: WatchKey::READABLE,
                });
            }
            WatchKey::Delete => flag_str(watch.delete_after_upload).to_string(),
        };
        Ok(value)
    }

    pub fn add_remote(&mut self, url: &str, username: &str, password: &str) -> Result<&Remote> {
        validate_remote_url(url)?;
        self.ensure_unique_remote(url, username, None)?;

        let id = self.allocate_remote_id()?;

        debug!("adding remote {id} ({username}@{url})");
        self.remotes.push(Remote::new(id, url, username, password));
        Ok(&self.remotes[self.remotes.len() - 1])
    }

    pub fn list_remotes(&self) -> &[Remote] {
        &self.remotes
    }

    /// Watches that still reference the remote keep their copied url and
    /// username.
    pub fn remove_remote(&mut self, remote_id: &str) -> Result<Remote> {
        let index = self
            .remotes
            .iter()
            .position(|r| r.id == remote_id)
            .ok_or_else(|| RegistryError::RemoteNotFound(remote_id.to_string()))?;

        let removed = self.remotes.remove(index);
        debug!("removed remote {}", removed.id);
        Ok(removed)
    }

    pub fn get_remote_conf(&self, remote_id: &str, key: RemoteKey) -> Result<String> {
        let remote = self.remote(remote_id)?;
        let value = match key {
            RemoteKey::Url => remote.url.clone(),
            RemoteKey::Username => remote.username.clone(),
            RemoteKey::Password => {
                return Err(RegistryError::UnknownConfigKey {
                    key: key.to_string(),
                    valid: RemoteKey::READABLE,
                });
            }
        };
        Ok(value)
    }

    /// Edits a remote in place. Watches created from it are not updated.
    pub fn set_remote_conf(&mut self, remote_id: &str, key: RemoteKey, value: &str) -> Result<()> {
        let remote = self.remote(remote_id)?;
        match key {
            RemoteKey::Url => {
                validate_remote_url(value)?;
                let username = remote.username.clone();
                self.ensure_unique_remote(value, &username, Some(remote_id))?;
            }
            RemoteKey::Username => {
                let url = remote.url.clone();
                self.ensure_unique_remote(&url, value, Some(remote_id))?;
            }
            RemoteKey::Password => {}
        }

        let remote = self.remote_mut(remote_id)?;
        match key {
            RemoteKey::Url => remote.url = value.to_string(),
            RemoteKey::Username => remote.username = value.to_string(),
            RemoteKey::Password => remote.password = value.to_string(),
        }

        debug!("remote {remote_id} updated {key}");
        Ok(())
    }

    fn allocate_remote_id(&mut self) -> Result<String> {
        loop {
            let n = self
                .next_remote_id
                .ok_or_else(|| RegistryError::invalid("no remote ids left to assign"))?;
            self.next_remote_id = n.checked_add(1);

            let id = format!("R{n}");
            if !self.remotes.iter().any(|r| r.id == id) {
                return Ok(id);
            }
        }
    }

    fn ensure_unique_remote(&self, url: &str, username: &str, except: Option<&str>) -> Result<()> {
        let duplicate = self
            .remotes
            .iter()
            .filter(|r| Some(r.id.as_str()) != except)
            .any(|r| r.url == url && r.username == username);

        if duplicate {
            return Err(RegistryError::RemoteExists {
                url: url.to_string(),
                username: username.to_string(),
            });
        }
        Ok(())
    }

    fn remote(&self, remote_id: &str) -> Result<&Remote> {
        self.remotes
            .iter()
            .find(|r| r.id == remote_id)
            .ok_or_else(|| RegistryError::RemoteNotFound(remote_id.to_string()))
    }

    fn remote_mut(&mut self, remote_id: &str) -> Result<&mut Remote> {
        self.remotes
            .iter_mut()
            .find(|r| r.id == remote_id)
            .ok_or_else(|| RegistryError::RemoteNotFound(remote_id.to_string()))
    }

    fn watch(&self, directory: &Path) -> Result<&Watch> {
        let directory = resolve(directory)?;
        self.watches
            .iter()
            .find(|w| w.directory == directory)
            .ok_or(RegistryError::DirectoryNotFound(directory))
    }

    fn watch_mut(&mut self, directory: &Path) -> Result<&mut Watch> {
        let directory = resolve(directory)?;
        self.watches
            .iter_mut()
            .find(|w| w.directory == directory)
            .ok_or(RegistryError::DirectoryNotFound(directory))
    }
}

fn resolve(directory: &Path) -> Result<PathBuf> {
    absolute_path(directory).map_err(|e| {
        RegistryError::invalid(format!(
            "cannot resolve '{}': {e}",
            directory.display()
        ))
    })
}
