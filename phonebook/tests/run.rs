use std::sync::Arc;

use phonebook::{Command, Error, run};
use pretty_assertions::assert_eq;
use record_store::{
    ContentStore, FileLocation, MemoryContents, Record, RecordStore, RemoteFile, StoreOptions,
};

fn location() -> FileLocation {
    FileLocation::new("octo", "book", "phone_numbers.json")
}

async fn open(remote: Arc<dyn ContentStore>) -> RecordStore {
    RecordStore::open(remote, StoreOptions::new(location())).await
}

async fn run_to_string(store: &RecordStore, command: Command) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = run(store, command, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn demo_adds_samples_and_searches() {
    let remote = Arc::new(MemoryContents::new());
    let store = open(remote.clone()).await;

    let (result, output) = run_to_string(&store, Command::Demo).await;
    result.unwrap();

    assert_eq!(store.len(), 2);
    let (_, results) = output.split_once("Search results:\n").unwrap();
    let found: Vec<Record> = serde_json::from_str(results).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "John Doe");
    assert_eq!(found[0].info("type"), Some(&serde_json::json!("mobile")));

    let stored = remote.file(&location()).unwrap();
    let persisted: Vec<Record> = serde_json::from_slice(&stored.content).unwrap();
    assert_eq!(persisted, store.records());
}

#[tokio::test]
async fn add_remove_and_list() {
    let store = open(Arc::new(MemoryContents::new())).await;

    let args = ["add", "+622187654321", "Jane Smith", "type=office"].map(String::from);
    let command = Command::parse(&args).unwrap();
    run_to_string(&store, command).await.0.unwrap();
    let id = store.find("jane")[0].id.clone();

    let (result, output) = run_to_string(&store, Command::List).await;
    result.unwrap();
    let listed: Vec<Record> = serde_json::from_str(&output).unwrap();
    assert_eq!(listed, store.records());

    let (result, output) = run_to_string(&store, Command::Remove { id }).await;
    result.unwrap();
    assert_eq!(output, "removed 1 record(s)\n");
    assert!(store.is_empty());
}

/// Accepts reads of a missing file but refuses every write.
struct ReadOnly;

#[async_trait::async_trait]
impl ContentStore for ReadOnly {
    async fn get_content(
        &self,
        location: &FileLocation,
    ) -> Result<RemoteFile, record_store::Error> {
        Err(record_store::Error::NotFound {
            path: location.to_string(),
        })
    }

    async fn put_content(
        &self,
        _location: &FileLocation,
        _message: &str,
        _content: Vec<u8>,
        _sha: Option<String>,
    ) -> Result<String, record_store::Error> {
        Err(record_store::Error::Unauthorized("Resource not accessible".to_string()))
    }
}

#[tokio::test]
async fn failed_save_is_reported_after_output() {
    let store = open(Arc::new(ReadOnly)).await;

    let command = Command::Add {
        phone_number: "+1".to_string(),
        name: "A".to_string(),
        info: Default::default(),
    };
    let (result, output) = run_to_string(&store, command).await;

    assert!(matches!(
        result,
        Err(Error::Store(record_store::Error::Unauthorized(_)))
    ));
    assert!(output.contains("\"phoneNumber\": \"+1\""));
    assert!(output.contains("warning: not saved: unauthorized: Resource not accessible"));
    assert_eq!(store.len(), 1);
}
