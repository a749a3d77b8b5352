use async_trait::async_trait;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::ConversationRecord;
use log::{ debug, info, warn };
use serde::Serialize;
use serde_json::ser::{ PrettyFormatter, Serializer };
use serde_json::Value;
use std::fs;
use std::io::{ ErrorKind, Write };
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tokio::task;

/// Conversation log kept as one pretty-printed JSON array on disk.
///
/// The `lock` guard is moved into the blocking task that touches the file,
/// so it is only released once the file work is finished, even if the
/// calling future is dropped first. Writers inside this process are
/// serialized; other processes touching the same file are not.
pub struct FileHistoryStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileHistoryStore {
    /// Opens the log at `path`, creating it as `[]` if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if !path.exists() {
            write_entries(&path, &[])?;
            info!("Created empty conversation log at '{}'", path.display());
        }

        Ok(Self { path, lock: Arc::new(Mutex::new(())) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn append(&self, text: &str) -> Result<ConversationRecord, HistoryError> {
        if text.is_empty() {
            return Err(HistoryError::InvalidInput);
        }

        let record = ConversationRecord::new(text);
        let entry = serde_json::to_value(&record)?;
        let path = self.path.clone();

        let guard = Arc::clone(&self.lock).lock_owned().await;
        let len = task::spawn_blocking(move || {
            let _guard = guard;
            let mut entries = load_entries(&path)?;
            entries.push(entry);
            write_entries(&path, &entries)?;
            Ok::<_, HistoryError>(entries.len())
        }).await??;

        debug!("Conversation log now holds {} entries", len);
        Ok(record)
    }

    async fn read_all(&self) -> Result<Vec<ConversationRecord>, HistoryError> {
        let path = self.path.clone();
        let guard = Arc::clone(&self.lock).lock_owned().await;
        let entries = task::spawn_blocking(move || {
            let _guard = guard;
            load_entries(&path)
        }).await??;
        Ok(to_records(&self.path, entries))
    }
}

/// Reads the raw array. A missing file is an empty log; so is content that
/// is not JSON or is JSON but not an array, which is logged and then dropped
/// on the next write. Elements are kept as they are.
fn load_entries(path: &Path) -> Result<Vec<Value>, HistoryError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e.into());
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(other) => {
            warn!(
                "Conversation log '{}' holds a JSON {} instead of a list; falling back to an empty log",
                path.display(),
                json_kind(&other)
            );
            Ok(Vec::new())
        }
        Err(e) => {
            warn!(
                "Conversation log '{}' is corrupt ({}); falling back to an empty log",
                path.display(),
                e
            );
            Ok(Vec::new())
        }
    }
}

/// Entries not shaped like `{"user": "<text>"}` stay on disk but are left
/// out of the returned records.
fn to_records(path: &Path, entries: Vec<Value>) -> Vec<ConversationRecord> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<ConversationRecord>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping entry {} of conversation log '{}': {}", i, path.display(), e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Replaces the file in one rename: the new content goes to a temp file in
/// the same directory, is synced, then persisted over `path`.
fn write_entries(path: &Path, entries: &[Value]) -> Result<(), HistoryError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut ser = Serializer::with_formatter(Vec::new(), PrettyFormatter::with_indent(b"    "));
    entries.serialize(&mut ser)?;
    let buf = ser.into_inner();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&buf)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileHistoryStore {
        FileHistoryStore::open(dir.path().join("chat_history.json")).unwrap()
    }

    #[test]
    fn open_creates_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("log.json");
        FileHistoryStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn open_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        fs::write(&path, r#"[{"user": "kept"}]"#).unwrap();
        FileHistoryStore::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"[{"user": "kept"}]"#);
    }

    #[tokio::test]
    async fn appends_in_arrival_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for text in ["a", "b", "c"] {
            store.append(text).await.unwrap();
        }
        let log = store.read_all().await.unwrap();
        assert_eq!(
            log,
            vec![
                ConversationRecord::new("a"),
                ConversationRecord::new("b"),
                ConversationRecord::new("c")
            ]
        );
    }

    #[tokio::test]
    async fn writes_four_space_indented_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("hello").await.unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "[\n    {\n        \"user\": \"hello\"\n    }\n]");
    }

    #[tokio::test]
    async fn rejects_empty_text_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("first").await.unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.append("").await.unwrap_err();
        assert!(matches!(err, HistoryError::InvalidInput));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_file_is_replaced_on_next_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        // Longer than what gets written back, so stale trailing bytes would show.
        fs::write(store.path(), "{ this is not json at all, and it is fairly long ]]]").unwrap();

        store.append("fresh").await.unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<ConversationRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec![ConversationRecord::new("fresh")]);
    }

    #[tokio::test]
    async fn non_list_json_counts_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"user": "not a list"}"#).unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
        store.append("x").await.unwrap();
        assert_eq!(store.read_all().await.unwrap(), vec![ConversationRecord::new("x")]);
    }

    #[tokio::test]
    async fn reading_corrupt_file_leaves_it_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "garbage").unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "garbage");
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::remove_file(store.path()).unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.append(&format!("msg-{}", i)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let log = store.read_all().await.unwrap();
        assert_eq!(log.len(), 32);
        for i in 0..32 {
            assert!(log.contains(&ConversationRecord::new(format!("msg-{}", i))));
        }
    }

    #[tokio::test]
    async fn off_schema_entries_survive_an_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"user": "kept"}, {"user": 5}, {"user": "extra", "mood": "happy"}]"#
        ).unwrap();

        store.append("new").await.unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([
                { "user": "kept" },
                { "user": 5 },
                { "user": "extra", "mood": "happy" },
                { "user": "new" }
            ])
        );
        assert_eq!(
            store.read_all().await.unwrap(),
            vec![
                ConversationRecord::new("kept"),
                ConversationRecord::new("extra"),
                ConversationRecord::new("new")
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn aborted_append_does_not_clobber_a_later_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));
        // Large enough that one read-modify-write outlives the abort below.
        let seed: Vec<Value> = (0..50_000)
            .map(|i| serde_json::json!({ "user": format!("seed-{}", i) }))
            .collect();

        for (round, delay_ms) in [1u64, 5, 10, 20].into_iter().enumerate() {
            write_entries(store.path(), &seed).unwrap();

            let in_flight = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append("dropped").await })
            };
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            in_flight.abort();
            let _ = in_flight.await;

            let kept = format!("kept-{}", round);
            store.append(&kept).await.unwrap();

            let log = store.read_all().await.unwrap();
            assert!(
                log.contains(&ConversationRecord::new(kept.as_str())),
                "acknowledged append lost after abort at {} ms",
                delay_ms
            );
            assert!(log.len() >= seed.len() + 1);
        }
    }
}
