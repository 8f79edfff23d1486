//! services/api/src/adapters/snapshot_files.rs
//!
//! The file-system implementation of the `SnapshotWriter` port. Each export
//! replaces two JSON documents: the verbatim category list and the
//! name-keyed question mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, warn};
use trivia_core::domain::{Category, QuestionProjection, Snapshot};
use trivia_core::ports::{PortError, PortResult, SnapshotWriter};
use uuid::Uuid;

//=========================================================================================
// On-disk Document Shapes
//=========================================================================================

/// A category exactly as the store holds it.
#[derive(Serialize)]
struct CategoryDocument<'a> {
    id: Uuid,
    name: &'a str,
    color: &'a str,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Category> for CategoryDocument<'a> {
    fn from(c: &'a Category) -> Self {
        Self {
            id: c.id,
            name: &c.name,
            color: &c.color,
            created_at: c.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDocument<'a> {
    question: &'a str,
    answers: &'a [String],
    correct_answer: &'a str,
}

impl<'a> From<&'a QuestionProjection> for QuestionDocument<'a> {
    fn from(q: &'a QuestionProjection) -> Self {
        Self {
            question: &q.question,
            answers: &q.answers,
            correct_answer: &q.correct_answer,
        }
    }
}

fn render(snapshot: &Snapshot) -> Result<(Vec<u8>, Vec<u8>), serde_json::Error> {
    let categories: Vec<CategoryDocument> =
        snapshot.categories.iter().map(CategoryDocument::from).collect();
    let questions: BTreeMap<&str, Vec<QuestionDocument>> = snapshot
        .questions_by_category
        .iter()
        .map(|(name, bucket)| {
            let docs = bucket.iter().map(QuestionDocument::from).collect::<Vec<_>>();
            (name.as_str(), docs)
        })
        .collect();

    Ok((
        serde_json::to_vec_pretty(&categories)?,
        serde_json::to_vec_pretty(&questions)?,
    ))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Writes snapshots to two fixed paths.
///
/// Both documents are first written and flushed to temporary siblings, then
/// renamed over the targets. A failure before the renames leaves the previous
/// snapshot intact. Writes from this process are serialized.
pub struct JsonFileSnapshotWriter {
    categories_path: PathBuf,
    questions_path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSnapshotWriter {
    pub fn new(categories_path: impl Into<PathBuf>, questions_path: impl Into<PathBuf>) -> Self {
        Self {
            categories_path: categories_path.into(),
            questions_path: questions_path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn questions_path(&self) -> &Path {
        &self.questions_path
    }
}

fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    target.with_file_name(name)
}

async fn write_flushed(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary snapshot file {}: {}", path.display(), e);
            }
        }
    }
}

//=========================================================================================
// `SnapshotWriter` Trait Implementation
//=========================================================================================

#[async_trait]
impl SnapshotWriter for JsonFileSnapshotWriter {
    async fn write_snapshot(&self, snapshot: &Snapshot) -> PortResult<()> {
        let (categories_json, questions_json) =
            render(snapshot).map_err(|e| PortError::Unexpected(e.to_string()))?;

        let _guard = self.lock.lock().await;

        let categories_tmp = temp_sibling(&self.categories_path);
        let questions_tmp = temp_sibling(&self.questions_path);

        let staged = async {
            write_flushed(&categories_tmp, &categories_json).await?;
            write_flushed(&questions_tmp, &questions_json).await
        }
        .await;
        if let Err(e) = staged {
            discard(&[categories_tmp.as_path(), questions_tmp.as_path()]).await;
            return Err(PortError::Unexpected(e.to_string()));
        }

        if let Err(e) = fs::rename(&categories_tmp, &self.categories_path).await {
            discard(&[categories_tmp.as_path(), questions_tmp.as_path()]).await;
            return Err(PortError::Unexpected(e.to_string()));
        }
        // The category document is already replaced at this point; a failure
        // here leaves a mixed-version snapshot.
        if let Err(e) = fs::rename(&questions_tmp, &self.questions_path).await {
            discard(&[questions_tmp.as_path()]).await;
            return Err(PortError::Unexpected(e.to_string()));
        }

        debug!(
            "Snapshot written to {} and {}",
            self.categories_path.display(),
            self.questions_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use trivia_core::domain::QuestionsByCategory;

    fn sample_snapshot() -> Snapshot {
        let created_at = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let category = Category {
            id: Uuid::nil(),
            name: "Science".to_string(),
            color: "#00ff00".to_string(),
            created_at,
        };
        let mut questions_by_category = QuestionsByCategory::new();
        questions_by_category.insert(
            "Science".to_string(),
            vec![QuestionProjection {
                question: "H2O is?".to_string(),
                answers: vec![
                    "Water".to_string(),
                    "Salt".to_string(),
                    "Gold".to_string(),
                    "Air".to_string(),
                ],
                correct_answer: "Water".to_string(),
            }],
        );
        Snapshot {
            categories: vec![category],
            questions_by_category,
        }
    }

    async fn read_json(path: &Path) -> Value {
        let raw = fs::read(path).await.expect("file should exist");
        serde_json::from_slice(&raw).expect("file should hold JSON")
    }

    #[tokio::test]
    async fn writes_both_documents() {
        let dir = tempdir().unwrap();
        let writer = JsonFileSnapshotWriter::new(
            dir.path().join("assets/categories.json"),
            dir.path().join("assets/questions.json"),
        );

        writer.write_snapshot(&sample_snapshot()).await.unwrap();

        assert_eq!(
            read_json(writer.categories_path()).await,
            json!([{
                "id": "00000000-0000-0000-0000-000000000000",
                "name": "Science",
                "color": "#00ff00",
                "created_at": "2024-05-01T12:00:00Z"
            }])
        );
        assert_eq!(
            read_json(writer.questions_path()).await,
            json!({
                "Science": [{
                    "question": "H2O is?",
                    "answers": ["Water", "Salt", "Gold", "Air"],
                    "correctAnswer": "Water"
                }]
            })
        );
    }

    #[tokio::test]
    async fn output_is_indented_with_two_spaces() {
        let dir = tempdir().unwrap();
        let writer = JsonFileSnapshotWriter::new(
            dir.path().join("categories.json"),
            dir.path().join("questions.json"),
        );

        writer.write_snapshot(&sample_snapshot()).await.unwrap();

        let text = fs::read_to_string(writer.questions_path()).await.unwrap();
        assert!(text.starts_with("{\n  \"Science\": [\n    {"));
    }

    #[tokio::test]
    async fn a_new_snapshot_replaces_the_old_one_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let writer = JsonFileSnapshotWriter::new(
            dir.path().join("categories.json"),
            dir.path().join("questions.json"),
        );

        writer.write_snapshot(&sample_snapshot()).await.unwrap();
        writer.write_snapshot(&Snapshot::default()).await.unwrap();

        assert_eq!(read_json(writer.categories_path()).await, json!([]));
        assert_eq!(read_json(writer.questions_path()).await, json!({}));

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn staging_failure_keeps_the_previous_snapshot() {
        let dir = tempdir().unwrap();
        let questions_path = dir.path().join("questions.json");
        std::fs::write(&questions_path, "{\"old\": []}").unwrap();
        // A regular file where a directory is expected makes staging fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let writer = JsonFileSnapshotWriter::new(blocker.join("categories.json"), &questions_path);

        let err = writer.write_snapshot(&sample_snapshot()).await.unwrap_err();

        assert!(matches!(err, PortError::Unexpected(_)));
        assert_eq!(
            std::fs::read_to_string(&questions_path).unwrap(),
            "{\"old\": []}"
        );
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    fn snapshot_named(name: &str) -> Snapshot {
        let mut snapshot = sample_snapshot();
        snapshot.categories[0].name = name.to_string();
        let bucket = snapshot
            .questions_by_category
            .remove("Science")
            .unwrap_or_default();
        snapshot.questions_by_category.insert(name.to_string(), bucket);
        snapshot
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_never_mix_two_snapshots() {
        let dir = tempdir().unwrap();
        let writer = std::sync::Arc::new(JsonFileSnapshotWriter::new(
            dir.path().join("categories.json"),
            dir.path().join("questions.json"),
        ));

        for _round in 0..10 {
            let mut tasks = Vec::new();
            for i in 0..8 {
                let writer = writer.clone();
                let name = if i % 2 == 0 { "Alpha" } else { "Beta" };
                tasks.push(tokio::spawn(async move {
                    writer.write_snapshot(&snapshot_named(name)).await
                }));
            }
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let categories = read_json(writer.categories_path()).await;
            let questions = read_json(writer.questions_path()).await;
            let category_name = categories[0]["name"].as_str().unwrap().to_string();
            let bucket_names: Vec<&String> = questions.as_object().unwrap().keys().collect();
            assert_eq!(bucket_names, vec![&category_name]);

            let entries = std::fs::read_dir(dir.path()).unwrap().count();
            assert_eq!(entries, 2);
        }
    }
}
