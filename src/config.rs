//! Runtime settings shared by the CLI commands.

use crate::notify::{ConsoleNotifier, Notifier, OutboxNotifier};
use crate::store::GroupStore;
use clap::ValueEnum;
use std::io;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";

/// How notifications leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NotifyMode {
    /// Print messages to stdout instead of delivering them.
    #[default]
    DryRun,

    /// Queue messages in the group's outbox for an external gateway.
    Outbox,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Group directory holding the CSV files.
    pub data_dir: PathBuf,
    pub notify_mode: NotifyMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            notify_mode: NotifyMode::default(),
        }
    }
}

impl Settings {
    pub fn open_store(&self) -> crate::Result<GroupStore> {
        GroupStore::open(&self.data_dir)
    }

    /// Builds the notifier selected by `notify_mode`.
    pub fn notifier<'a>(&self, store: &'a GroupStore) -> Box<dyn Notifier + 'a> {
        match self.notify_mode {
            NotifyMode::DryRun => Box::new(ConsoleNotifier::new(io::stdout())),
            NotifyMode::Outbox => Box::new(OutboxNotifier::new(store)),
        }
    }
}
