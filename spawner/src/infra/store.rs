//! Infrastructure implementation of the `AccountStore` port.
//!
//! `FileAccountStore` keeps the identity → record map in memory and rewrites
//! the whole map on every mutation with an atomic write (temp file + rename).
//! Mutations run on the blocking pool via `tokio::task::spawn_blocking`.
//!
//! Writers take `writer` for the whole mutation and build the next map on a
//! copy; the state lock is held only to copy and to commit, never across file
//! I/O. Lookups and port allocation therefore never wait on a disk write, and
//! they only ever see committed records.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::ports::AccountStore;
use crate::domain::{AccountRecord, SERVICE_PORT_RANGE, StoreError};

/// File-backed account store shared by every request task.
#[derive(Clone)]
pub struct FileAccountStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    ports: Range<u16>,
    writer: Mutex<()>,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    accounts: BTreeMap<String, AccountRecord>,
    /// Ports of live records.
    used: BTreeSet<u16>,
    /// Ports handed out by `allocate_port` and not yet recorded or released.
    reserved: BTreeSet<u16>,
}

impl FileAccountStore {
    /// Load the store from `path`, allocating from the standard service range.
    ///
    /// A missing, unreadable, or corrupt file yields an empty store.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_ports(path, SERVICE_PORT_RANGE)
    }

    /// Load the store from `path` with an explicit port range.
    #[must_use]
    pub fn open_with_ports(path: impl Into<PathBuf>, ports: Range<u16>) -> Self {
        let path = path.into();
        let accounts = load(&path);
        let used = accounts.values().map(|r| r.service_port).collect();
        Self {
            inner: Arc::new(Inner {
                path,
                ports,
                writer: Mutex::new(()),
                state: Mutex::new(StoreState {
                    accounts,
                    used,
                    reserved: BTreeSet::new(),
                }),
            }),
        }
    }

    /// Copy of every live record, keyed by identity.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, AccountRecord> {
        self.inner.state().accounts.clone()
    }

    /// Ports currently held by live records.
    #[must_use]
    pub fn used_ports(&self) -> BTreeSet<u16> {
        self.inner.state().used.clone()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find_sync(&self, identity: &str) -> Option<AccountRecord> {
        self.state().accounts.get(identity).cloned()
    }

    fn record_sync(&self, identity: &str, record: AccountRecord) -> Result<(), StoreError> {
        let _writer = self.writer();
        let port = record.service_port;
        let mut accounts = self.state().accounts.clone();
        let previous = accounts.insert(identity.to_owned(), record);
        let written = persist(&self.path, &accounts);

        let mut state = self.state();
        state.reserved.remove(&port);
        if let Err(err) = written {
            tracing::error!(identity, error = %err, "unable to persist account data");
            return Err(err.into());
        }

        if let Some(prev) = previous.filter(|prev| prev.service_port != port) {
            state.used.remove(&prev.service_port);
        }
        state.used.insert(port);
        state.accounts = accounts;
        Ok(())
    }

    fn remove_sync(&self, identity: &str) -> Result<(), StoreError> {
        let _writer = self.writer();
        let mut accounts = self.state().accounts.clone();
        let Some(previous) = accounts.remove(identity) else {
            return Ok(());
        };

        if let Err(err) = persist(&self.path, &accounts) {
            tracing::error!(identity, error = %err, "unable to persist account data");
            return Err(err.into());
        }

        let mut state = self.state();
        state.used.remove(&previous.service_port);
        state.accounts = accounts;
        Ok(())
    }

    fn allocate_port_sync(&self) -> Result<u16, StoreError> {
        let mut state = self.state();
        let port = self
            .ports
            .clone()
            .find(|p| !state.used.contains(p) && !state.reserved.contains(p))
            .ok_or(StoreError::PoolExhausted {
                start: self.ports.start,
                end: self.ports.end,
            })?;
        state.reserved.insert(port);
        Ok(port)
    }

    fn release_port_sync(&self, port: u16) {
        self.state().reserved.remove(&port);
    }
}

impl AccountStore for FileAccountStore {
    async fn find(&self, identity: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.inner.find_sync(identity))
    }

    async fn record(&self, identity: &str, record: AccountRecord) -> Result<(), StoreError> {
        let inner = Arc::clone(&self.inner);
        let identity = identity.to_owned();
        tokio::task::spawn_blocking(move || inner.record_sync(&identity, record))
            .await
            .map_err(|e| StoreError::Persist(io::Error::other(e)))?
    }

    async fn remove(&self, identity: &str) -> Result<(), StoreError> {
        let inner = Arc::clone(&self.inner);
        let identity = identity.to_owned();
        tokio::task::spawn_blocking(move || inner.remove_sync(&identity))
            .await
            .map_err(|e| StoreError::Persist(io::Error::other(e)))?
    }

    async fn allocate_port(&self) -> Result<u16, StoreError> {
        self.inner.allocate_port_sync()
    }

    fn release_port(&self, port: u16) {
        self.inner.release_port_sync(port);
    }
}

fn load(path: &Path) -> BTreeMap<String, AccountRecord> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no account data yet; starting empty");
            return BTreeMap::new();
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "account data unreadable; starting empty"
            );
            return BTreeMap::new();
        }
    };
    match serde_json::from_slice::<BTreeMap<String, AccountRecord>>(&bytes) {
        Ok(accounts) => {
            tracing::info!(
                path = %path.display(),
                accounts = accounts.len(),
                "account data loaded"
            );
            accounts
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "account data corrupt; starting empty"
            );
            BTreeMap::new()
        }
    }
}

/// Write `accounts` to a sibling temp file, then rename it over `path`.
fn persist(path: &Path, accounts: &BTreeMap<String, AccountRecord>) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_vec_pretty(accounts)?;

    let temp_path = temp_path(path);
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&temp_path)?;
    file.write_all(&content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("accounts"));
    name.push(".tmp");
    path.with_file_name(name)
}
