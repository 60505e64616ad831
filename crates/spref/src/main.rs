// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! spref - typed, optionally encrypted settings from the command line.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use spref_config::SprefConfig;
use spref_core::{SprefError, ValueKind};
use spref_settings::{DefaultsSource, SettingsBuilder, SettingsStore};
use spref_storage::Database;
use spref_vault::{KeyMaterial, get_passphrase};
use tracing::debug;

/// Crates whose log output follows the configured level.
const LOG_TARGETS: &[&str] = &[
    "spref",
    "spref_config",
    "spref_settings",
    "spref_storage",
    "spref_vault",
];

/// spref - typed, optionally encrypted settings.
#[derive(Parser, Debug)]
#[command(name = "spref", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings namespace to operate on (overrides store.name).
    #[arg(long, global = true)]
    store: Option<String>,

    /// Prompt for the encryption passphrase (or read SPREF_PASSPHRASE).
    #[arg(long, global = true)]
    ask_passphrase: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one setting. Exits 1 if it is absent.
    Get {
        key: String,
        /// Fail unless the stored value has this kind.
        #[arg(long)]
        kind: Option<ValueKind>,
        /// Read through the encryption tag, decrypting if needed.
        #[arg(long)]
        decrypt: bool,
    },
    /// Store one setting.
    Set {
        key: String,
        value: String,
        #[arg(long, default_value = "string")]
        kind: ValueKind,
        /// Encrypt the value with the configured key.
        #[arg(long)]
        encrypt: bool,
    },
    /// Remove settings and their encryption tags.
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Remove every setting in the namespace.
    Clear,
    /// List every setting in the namespace.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Merge an XML defaults file into the namespace.
    Merge {
        file: PathBuf,
        /// Replace keys that already exist.
        #[arg(long = "override")]
        should_override: bool,
        /// Only merge when the namespace is empty.
        #[arg(long)]
        if_empty: bool,
    },
    /// Parse an XML defaults file and print its entries.
    Defaults {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => spref_config::load_and_validate_path(path),
        None => spref_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            spref_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Some(name) = cli.store {
        config.store.name = name;
    }

    let Some(command) = cli.command else {
        println!("spref: use --help for available commands");
        return;
    };

    let stdout = std::io::stdout();
    match run(command, &config, cli.ask_passphrase, &mut stdout.lock()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Dispatch one subcommand. `Ok(false)` means the command found nothing.
fn run(
    command: Commands,
    config: &SprefConfig,
    ask_passphrase: bool,
    out: &mut impl Write,
) -> Result<bool, SprefError> {
    if let Commands::Defaults { file, json } = &command {
        commands::show_defaults(&DefaultsSource::file(file), *json, out)?;
        return Ok(true);
    }

    let db = Arc::new(Database::open_from_config(&config.store)?);
    let store = open_store(config, ask_passphrase, Arc::clone(&db))?;
    let outcome = dispatch(command, &store, out);
    drop(store);
    let closed = close_database(db);
    let found = outcome?;
    closed?;
    Ok(found)
}

fn dispatch(
    command: Commands,
    store: &SettingsStore,
    out: &mut impl Write,
) -> Result<bool, SprefError> {
    match command {
        Commands::Get { key, kind, decrypt } => commands::get(store, &key, kind, decrypt, out),
        Commands::Set {
            key,
            value,
            kind,
            encrypt,
        } => commands::set(store, &key, &value, kind, encrypt).map(|()| true),
        Commands::Remove { keys } => store.remove_bulk_setting(&keys).map(|()| true),
        Commands::Clear => store.remove_all_settings().map(|()| true),
        Commands::List { json } => commands::list(store, json, out).map(|()| true),
        Commands::Merge {
            file,
            should_override,
            if_empty,
        } => commands::merge(
            store,
            &DefaultsSource::file(file),
            should_override,
            if_empty,
            out,
        )
        .map(|_| true),
        Commands::Defaults { .. } => Ok(true),
    }
}

/// Open the configured namespace, running the configured defaults merge.
fn open_store(
    config: &SprefConfig,
    ask_passphrase: bool,
    db: Arc<Database>,
) -> Result<SettingsStore, SprefError> {
    let mut builder = SettingsBuilder::from_config(config)?;
    if ask_passphrase {
        builder = builder.with_key(KeyMaterial::Passphrase(get_passphrase()?));
    }
    let options = builder.build()?;
    debug!(
        namespace = %options.name(),
        encrypted = options.has_cipher_key(),
        "opening settings store"
    );
    Ok(options.open(db))
}

/// Checkpoint and close `db` once nothing else holds it.
///
/// Returns `Ok(false)` if another handle is still alive and the close was skipped.
fn close_database(db: Arc<Database>) -> Result<bool, SprefError> {
    match Arc::try_unwrap(db) {
        Ok(db) => db.close().map(|()| true),
        Err(shared) => {
            debug!(path = %shared.path(), "database still shared -- leaving it open");
            Ok(false)
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={log_level}"))
            .collect();
        EnvFilter::new(format!("{},warn", directives.join(",")))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn config_in(dir: &std::path::Path) -> SprefConfig {
        let mut config = spref_config::load_and_validate_str("").unwrap();
        config.store.database_path = dir.join("spref.db").display().to_string();
        config
    }

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report nonzero allocated bytes");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_kind() {
        let cli = Cli::try_parse_from(["spref", "--store", "app", "set", "n", "7", "--kind", "long"])
            .unwrap();
        assert_eq!(cli.store.as_deref(), Some("app"));
        match cli.command {
            Some(Commands::Set { kind, encrypt, .. }) => {
                assert_eq!(kind, ValueKind::Long);
                assert!(!encrypt);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn remove_requires_a_key() {
        assert!(Cli::try_parse_from(["spref", "remove"]).is_err());
    }

    #[test]
    fn default_config_is_valid() {
        let config = spref_config::load_and_validate_str("").unwrap();
        assert_eq!(config.store.name, "default");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn values_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let set = Commands::Set {
            key: "greeting".into(),
            value: "bonjour".into(),
            kind: ValueKind::String,
            encrypt: false,
        };
        assert!(run(set, &config, false, &mut Vec::new()).unwrap());

        let mut out = Vec::new();
        let get = Commands::Get {
            key: "greeting".into(),
            kind: None,
            decrypt: false,
        };
        assert!(run(get, &config, false, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "bonjour\n");
    }

    #[test]
    fn database_is_closed_only_when_unshared() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let db = Arc::new(Database::open_from_config(&config.store).unwrap());

        let held = Arc::clone(&db);
        assert!(!close_database(db).unwrap());
        assert!(close_database(held).unwrap());
    }

    #[test]
    fn run_checkpoints_the_wal_on_exit() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let set = Commands::Set {
            key: "k".into(),
            value: "v".into(),
            kind: ValueKind::String,
            encrypt: false,
        };
        run(set, &config, false, &mut Vec::new()).unwrap();

        let wal = dir.path().join("spref.db-wal");
        let wal_len = std::fs::metadata(&wal).map(|m| m.len()).unwrap_or(0);
        assert_eq!(wal_len, 0);
    }

    #[test]
    fn missing_key_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let get = Commands::Get {
            key: "absent".into(),
            kind: None,
            decrypt: false,
        };
        assert!(!run(get, &config, false, &mut Vec::new()).unwrap());
    }

    #[test]
    fn configured_passphrase_encrypts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.encryption.passphrase = Some("correct horse".into());

        let set = Commands::Set {
            key: "token".into(),
            value: "s3cret".into(),
            kind: ValueKind::String,
            encrypt: true,
        };
        run(set, &config, false, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        let get = Commands::Get {
            key: "token".into(),
            kind: None,
            decrypt: true,
        };
        run(get, &config, false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "s3cret\n");
    }

    #[test]
    fn configured_defaults_seed_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = dir.path().join("defaults.xml");
        std::fs::write(
            &defaults,
            r#"<defaults><integer name="retries">5</integer></defaults>"#,
        )
        .unwrap();
        let mut config = config_in(dir.path());
        config.defaults.path = Some(defaults.display().to_string());

        let mut out = Vec::new();
        let get = Commands::Get {
            key: "retries".into(),
            kind: Some(ValueKind::Int),
            decrypt: false,
        };
        assert!(run(get, &config, false, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "5\n");
    }
}
