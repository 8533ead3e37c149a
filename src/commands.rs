use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{CellAlignment, Table};
use log::debug;

use crate::{
    cli::{Cli, Commands, RemoteCommands},
    config::Config,
    error::RegistryError,
    file_utils::expand_path,
    registry::{Registry, Remote, RemoteKey, Watch, WatchFilter, WatchKey},
};

/// Builds the registry for this invocation and runs one command against it.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.seed.as_deref())?;
    debug!(
        "Seed:\n{}",
        config.dump().unwrap_or("failed to render seed".to_string())
    );

    let mut registry =
        Registry::from_config(config).map_err(|e| anyhow::anyhow!("Invalid seed: {e}"))?;
    execute(cli.command, &mut registry, &mut io::stdout().lock())
}

pub fn execute(command: Commands, registry: &mut Registry, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Add {
            directory,
            remote_id,
            remote_dir,
            delete,
        } => {
            registry.add_watch(&expand_path(&directory), &remote_id, &remote_dir, delete, true)?;
        }
        Commands::List { all } => {
            let filter = if all {
                WatchFilter::All
            } else {
                WatchFilter::EnabledOnly
            };
            writeln!(out, "{}", watch_table(&registry.list_watches(filter)))?;
        }
        Commands::Remove { directory } => {
            registry.remove_watch(&expand_path(&directory))?;
        }
        Commands::Enable { directory } => registry.enable_watch(&expand_path(&directory))?,
        Commands::Disable { directory } => registry.disable_watch(&expand_path(&directory))?,
        Commands::Set {
            config,
            value,
            directory,
        } => {
            let key: WatchKey = config.parse()?;
            registry.set_watch_config(&expand_path(&directory), key, &value)?;
        }
        Commands::Get { config, directory } => {
            let key: WatchKey = config.parse()?;
            let value = registry.get_watch_config(&expand_path(&directory), key)?;
            writeln!(out, "{value}")?;
        }
        Commands::Remote { command } => execute_remote(command, registry, out)?,
    }

    Ok(())
}

fn execute_remote(command: RemoteCommands, registry: &mut Registry, out: &mut impl Write) -> Result<()> {
    match command {
        RemoteCommands::Add {
            url,
            username,
            password,
        } => {
            let remote = registry.add_remote(&url, &username, &password)?;
            writeln!(out, "{}", remote.id)?;
        }
        RemoteCommands::List {} => {
            writeln!(out, "{}", remote_table(registry.list_remotes()))?;
        }
        RemoteCommands::Remove { remote_id } => {
            registry.remove_remote(&remote_id)?;
        }
        RemoteCommands::Set {
            config,
            value,
            remote_id,
        } => {
            let key: RemoteKey = config.parse()?;
            registry.set_remote_conf(&remote_id, key, &value)?;
        }
        RemoteCommands::Get { config, remote_id } => {
            let key: RemoteKey = config.parse()?;
            let value = registry.get_remote_conf(&remote_id, key)?;
            writeln!(out, "{value}")?;
        }
    }

    Ok(())
}

fn check_mark(option: bool) -> &'static str {
    if option { "✔" } else { "x" }
}

pub fn watch_table(watches: &[&Watch]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Directory",
        "Enabled",
        "Remote Directory",
        "URL",
        "Username",
        "Delete Option",
    ]);

    for watch in watches {
        table.add_row(vec![
            watch.directory.display().to_string(),
            check_mark(watch.enabled).to_string(),
            watch.remote_dir.clone(),
            watch.remote_url.clone(),
            watch.remote_username.clone(),
            check_mark(watch.delete_after_upload).to_string(),
        ]);
    }

    for index in [1, 5] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Center);
        }
    }

    table
}

pub fn remote_table(remotes: &[Remote]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "URL", "Username"]);
    for remote in remotes {
        table.add_row(vec![&remote.id, &remote.url, &remote.username]);
    }
    table
}

/// Formats a failure as `error: ...` or `warning: ...`, followed by a hint
/// line when there is one.
pub fn render_error(err: &anyhow::Error) -> String {
    let Some(registry_err) = err.downcast_ref::<RegistryError>() else {
        return format!("error: {err:#}");
    };

    let mut message = format!("{}: {registry_err}", registry_err.severity());
    if let Some(hint) = registry_err.hint() {
        message.push_str(&format!("\n  {hint}"));
    }
    message
}
