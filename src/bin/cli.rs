//! shimstore CLI
//!
//! Runs one storage operation against a fallback engine whose slot is a
//! file, so state carries over between invocations the way it carries over
//! a page navigation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crossbeam::channel::unbounded;
use shimstore::channel::{FileSlot, PersistenceChannel};
use shimstore::{Config, RemoveNotification, StorageEngine, StorageEvent, StorageKind};
use tracing_subscriber::{fmt, EnvFilter};

/// shimstore CLI
#[derive(Parser, Debug)]
#[command(name = "shimstore-cli")]
#[command(about = "Fallback key/value storage backed by a file slot")]
#[command(version)]
struct Args {
    /// Storage kind (session or local)
    #[arg(short, long, default_value = "session")]
    kind: StorageKind,

    /// Directory holding the slot files
    #[arg(short, long, default_value = "./shimstore_data")]
    slot_dir: PathBuf,

    /// URL reported in change notifications
    #[arg(short, long, default_value = "about:blank")]
    url: String,

    /// Notify even when removing a key that does not exist
    #[arg(long)]
    always_notify_remove: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Remove a key
    Remove {
        /// The key to remove
        key: String,
    },

    /// Remove every key
    Clear,

    /// Print the key at a position
    Key {
        /// Position in enumeration order
        index: usize,
    },

    /// Print the number of keys
    Len,

    /// Print every entry in enumeration order
    List,

    /// Print the raw slot content
    Dump,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,shimstore=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let policy = if args.always_notify_remove {
        RemoveNotification::Always
    } else {
        RemoveNotification::IfPresent
    };

    let config = Config::builder()
        .url(&args.url)
        .remove_notification(policy)
        .build();

    let slot = FileSlot::in_dir(&args.slot_dir, config.slot_name(args.kind));
    tracing::debug!("Slot file: {}", slot.path().display());

    let raw_slot = slot.clone();

    let (tx, rx) = unbounded::<StorageEvent>();
    let engine = StorageEngine::builder(args.kind)
        .config(config)
        .channel(slot)
        .sink(tx)
        .build();

    let found = match args.command {
        Commands::Get { key } => print_optional(engine.get_item(&key)),
        Commands::Set { key, value } => {
            engine.set_item(key, value);
            true
        }
        Commands::Remove { key } => {
            engine.remove_item(&key);
            true
        }
        Commands::Clear => {
            engine.clear();
            true
        }
        Commands::Key { index } => print_optional(engine.key(index)),
        Commands::Len => {
            println!("{}", engine.length());
            true
        }
        Commands::List => {
            for (key, value) in engine.entries() {
                println!("{}\t{}", key, value);
            }
            true
        }
        Commands::Dump => dump(&raw_slot),
    };

    for event in rx.try_iter() {
        match serde_json::to_string(&event) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => tracing::warn!("Failed to encode event: {}", e),
        }
    }

    if !found {
        std::process::exit(1);
    }
}

fn dump(slot: &FileSlot) -> bool {
    match slot.read() {
        Ok(Some(contents)) => {
            println!("{}", contents);
            true
        }
        Ok(None) => {
            println!("(empty)");
            true
        }
        Err(e) => {
            tracing::error!("Failed to read slot: {}", e);
            false
        }
    }
}

fn print_optional(value: Option<String>) -> bool {
    match value {
        Some(value) => {
            println!("{}", value);
            true
        }
        None => {
            println!("(nil)");
            false
        }
    }
}
