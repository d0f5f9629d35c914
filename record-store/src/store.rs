//! Record store backed by a single remote JSON document.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{error, info};

use crate::config::{DEFAULT_COMMIT_MESSAGE, StoreConfig};
use crate::document;
use crate::error::Error;
use crate::record::{AdditionalInfo, IdClock, Record};
use crate::records::Records;
use crate::remote::{ContentStore, FileLocation};

/// Where a store keeps its document and how it labels its commits.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub location: FileLocation,
    pub commit_message: String,
}

impl StoreOptions {
    pub fn new(location: FileLocation) -> Self {
        Self {
            location,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }
}

/// Result of the save that follows a mutation.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The document was written; `sha` is its new revision.
    Saved { sha: String },
    /// The write did not happen. The in-memory list keeps the mutation.
    Failed(Error),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    pub fn sha(&self) -> Option<&str> {
        match self {
            Self::Saved { sha } => Some(sha),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Saved { .. } => None,
            Self::Failed(e) => Some(e),
        }
    }
}

/// A mutation's value together with the outcome of persisting it.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub outcome: SaveOutcome,
}

impl<T> Persisted<T> {
    pub fn is_saved(&self) -> bool {
        self.outcome.is_saved()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Turns a failed save into an error, dropping the value.
    pub fn into_result(self) -> Result<T, Error> {
        match self.outcome {
            SaveOutcome::Saved { .. } => Ok(self.value),
            SaveOutcome::Failed(e) => Err(e),
        }
    }
}

/// An ordered list of contact records mirrored to a remote JSON document.
///
/// Construction spawns a load of the document; until it finishes the list is
/// empty and [`is_ready`](Self::is_ready) is `false`. Mutations wait for the
/// load, change the list, then write the whole list back using the file's
/// current revision as a precondition. Reads never touch the remote store.
///
/// # Failure model
///
/// A failed save never undoes the mutation. The failure is logged and
/// returned in the [`Persisted`] result, so the list and the document may
/// diverge until the next successful save.
///
/// Nothing is written until a load has succeeded (a missing document counts
/// as loaded). Until then saves fail with [`Error::NotLoaded`], so a store
/// whose initial load failed cannot replace a document it never read. Call
/// [`load`](Self::load) again to recover.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use record_store::{FileLocation, GitHubContents, RecordStore, StoreOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let remote = Arc::new(GitHubContents::new("ghp_example")?);
///     let location = FileLocation::new("octo", "book", "phone_numbers.json");
///     let store = RecordStore::open(remote, StoreOptions::new(location)).await;
///
///     let added = store.add("+6281234567890", "John Doe", None).await?;
///     assert_eq!(store.find("john").len(), 1);
///
///     store.remove(&added.value.id).await;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<RecordStoreInner>,
}

struct RecordStoreInner {
    records: Records,
    remote: Arc<dyn ContentStore>,
    location: FileLocation,
    commit_message: String,
    ids: IdClock,
    write_lock: Mutex<()>,
    loaded: AtomicBool,
    ready: watch::Sender<bool>,
}

impl RecordStore {
    /// Creates the store and starts loading the document in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(remote: Arc<dyn ContentStore>, options: StoreOptions) -> Self {
        let (ready, _) = watch::channel(false);

        let inner = Arc::new(RecordStoreInner {
            records: Records::new(),
            remote,
            location: options.location,
            commit_message: options.commit_message,
            ids: IdClock::default(),
            write_lock: Mutex::new(()),
            loaded: AtomicBool::new(false),
            ready,
        });

        let loader = Arc::clone(&inner);
        tokio::spawn(async move {
            // failures are logged inside load
            let _ = loader.load().await;
        });

        Self { inner }
    }

    /// Creates the store and waits for the initial load to finish.
    pub async fn open(remote: Arc<dyn ContentStore>, options: StoreOptions) -> Self {
        let store = Self::spawn(remote, options);
        store.ready().await;
        store
    }

    /// Opens a store on the GitHub contents API described by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, Error> {
        let remote = Arc::new(config.client()?);
        Ok(Self::open(remote, config.options()).await)
    }

    /// Resolves once the initial load has finished, successfully or not.
    pub async fn ready(&self) {
        let mut ready = self.inner.ready.subscribe();
        // the sender lives as long as the store, so the channel cannot close
        let _ = ready.wait_for(|ready| *ready).await;
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }

    /// Reloads the document, replacing the in-memory list.
    ///
    /// A missing document loads as an empty list. On any other failure the
    /// list is left as it was and the error is returned after being logged.
    /// A successful load also enables saving if earlier loads failed.
    pub async fn load(&self) -> Result<usize, Error> {
        self.inner.load().await
    }

    /// Appends a new record and saves.
    ///
    /// Fails only when `additional_info` names a reserved field, in which
    /// case nothing is changed. A failed save is reported in the outcome and
    /// the record stays in the list.
    pub async fn add(
        &self,
        phone_number: impl Into<String>,
        name: impl Into<String>,
        additional_info: Option<AdditionalInfo>,
    ) -> Result<Persisted<Record>, Error> {
        self.ready().await;

        let record = Record::new(
            self.inner.ids.next_id(),
            phone_number,
            name,
            additional_info.unwrap_or_default(),
            chrono::Utc::now(),
        )?;

        self.inner.records.push(record.clone());
        let outcome = self.inner.save().await;

        Ok(Persisted {
            value: record,
            outcome,
        })
    }

    /// Removes every record with `id` and saves. The value is the number of
    /// records removed.
    pub async fn remove(&self, id: &str) -> Persisted<usize> {
        self.ready().await;

        let removed = self.inner.records.remove(id);
        let outcome = self.inner.save().await;

        Persisted {
            value: removed,
            outcome,
        }
    }

    /// Records whose phone number contains `query` or whose name contains it
    /// ignoring case, in insertion order.
    pub fn find(&self, query: &str) -> Vec<Record> {
        self.inner.records.find(query)
    }

    pub fn get(&self, id: &str) -> Option<Record> {
        self.inner.records.get(id)
    }

    /// A copy of the whole list in insertion order.
    pub fn records(&self) -> Vec<Record> {
        self.inner.records.snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }

    pub fn location(&self) -> &FileLocation {
        &self.inner.location
    }
}

impl RecordStoreInner {
    async fn load(&self) -> Result<usize, Error> {
        let _guard = self.write_lock.lock().await;

        let outcome = match self.fetch().await {
            Ok(records) => {
                let count = records.len();
                self.records.replace(records);
                self.loaded.store(true, Ordering::Release);
                info!(location = %self.location, count, "loaded records");
                Ok(count)
            }
            Err(e) if e.is_not_found() => {
                self.records.replace(Vec::new());
                self.loaded.store(true, Ordering::Release);
                info!(location = %self.location, "document not found, starting empty");
                Ok(0)
            }
            Err(e) => {
                error!(location = %self.location, error = %e, "failed to load records");
                Err(e)
            }
        };

        self.ready.send_replace(true);
        outcome
    }

    async fn fetch(&self) -> Result<Vec<Record>, Error> {
        let file = self.remote.get_content(&self.location).await?;
        document::decode(&file.content)
    }

    async fn save(&self) -> SaveOutcome {
        let _guard = self.write_lock.lock().await;

        match self.write().await {
            Ok(sha) => {
                info!(location = %self.location, %sha, "saved records");
                SaveOutcome::Saved { sha }
            }
            Err(e) => {
                error!(location = %self.location, error = %e, "failed to save records");
                SaveOutcome::Failed(e)
            }
        }
    }

    /// Writes the current list, conditioned on the revision seen just before.
    async fn write(&self) -> Result<String, Error> {
        if !self.loaded.load(Ordering::Acquire) {
            return Err(Error::NotLoaded {
                path: self.location.to_string(),
            });
        }

        let sha = match self.remote.get_content(&self.location).await {
            Ok(file) => Some(file.sha),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let content = document::encode(&self.records.snapshot())?;
        self.remote
            .put_content(&self.location, &self.commit_message, content, sha)
            .await
    }
}
