//! Configuration CLI commands.
//!
//! `config show`, `config path` and `config init`.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use trackpoll::config::{config_file_path, TrackerConfig};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as INI
    Show {
        /// Config file to read instead of the default
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the configuration file path
    Path,

    /// Write a config file with default settings
    Init {
        /// Destination instead of the default path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { config } => run_show(config.as_deref()),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Init { config, force } => {
            let path = config.unwrap_or_else(config_file_path);
            init_config(&path, force)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

/// Load from `path` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig, CliError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            TrackerConfig::load_from(path)?
        }
        None => TrackerConfig::load()?,
    };
    Ok(config)
}

fn run_show(path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(path)?;
    let source = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    println!("# Source: {}", source.display());
    print!("{}", config.to_ini_string());
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }
    TrackerConfig::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        init_config(&path, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, TrackerConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[polling]\nmode = fixed\n").unwrap();

        assert!(matches!(init_config(&path, false), Err(CliError::Config(_))));
        init_config(&path, true).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), TrackerConfig::default());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_config(Some(&temp_dir.path().join("nope.ini")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
