//! services/api/src/adapters/file_store.rs
//!
//! The flat-file content store: a JSON subject map plus one append-only HTML
//! file per subject under `content/{code}/lectures.html`.
//!
//! All state sits behind a single `RwLock`; every mutation holds the write
//! lock across its load-modify-persist sequence, so concurrent admin
//! operations serialize instead of losing updates. Lecture appends are one
//! `write_all` of a self-contained fragment, and duplicate ids are rejected
//! by parsing the existing log before appending. Subject deletion removes
//! the subject's whole content directory — the cascade is explicit.

use async_trait::async_trait;
use lectern_core::domain::{
    default_units, normalize_code, Lecture, LectureSummary, NewLecture, Subject, Unit,
};
use lectern_core::ports::{ContentStore, StoreError, StoreResult};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::info;

use crate::adapters::fragments::{parse_fragments, Fragment};

/// A content store backed by `subjects.json` and per-subject lecture files.
pub struct FileStore {
    root: PathBuf,
    subjects: RwLock<BTreeMap<String, Subject>>,
}

impl FileStore {
    /// Opens (or initializes) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(io_to_store)?;

        let subjects_file = root.join("subjects.json");
        let map = match tokio::fs::read_to_string(&subjects_file).await {
            Ok(data) if data.trim().is_empty() => BTreeMap::new(),
            Ok(data) => serde_json::from_str(&data)
                .map_err(|e| StoreError::Storage(format!("subjects.json is corrupt: {e}")))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&subjects_file, "{}")
                    .await
                    .map_err(io_to_store)?;
                BTreeMap::new()
            }
            Err(e) => return Err(io_to_store(e)),
        };

        info!(root = %root.display(), subjects = map.len(), "flat-file store loaded");
        Ok(Self {
            root,
            subjects: RwLock::new(map),
        })
    }

    fn subjects_file(&self) -> PathBuf {
        self.root.join("subjects.json")
    }

    fn subject_dir(&self, code: &str) -> PathBuf {
        self.root.join("content").join(code)
    }

    fn lectures_file(&self, code: &str) -> PathBuf {
        self.subject_dir(code).join("lectures.html")
    }

    /// Writes the whole subject map back out. Callers hold the write lock.
    async fn persist(&self, map: &BTreeMap<String, Subject>) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        tokio::fs::write(self.subjects_file(), data)
            .await
            .map_err(io_to_store)
    }

    /// Reads and parses a subject's lecture log; a missing file is an empty log.
    async fn load_fragments(&self, code: &str) -> StoreResult<Vec<Fragment>> {
        match tokio::fs::read_to_string(self.lectures_file(code)).await {
            Ok(html) => Ok(parse_fragments(&html)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_to_store(e)),
        }
    }
}

fn io_to_store(e: std::io::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

#[async_trait]
impl ContentStore for FileStore {
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        Ok(self.subjects.read().await.values().cloned().collect())
    }

    async fn get_subject(&self, code: &str) -> StoreResult<Subject> {
        let code = normalize_code(code);
        self.subjects
            .read()
            .await
            .get(&code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Subject {code}")))
    }

    async fn create_subject(&self, name: &str, code: &str) -> StoreResult<Subject> {
        let code = normalize_code(code);
        let mut map = self.subjects.write().await;
        if map.contains_key(&code) {
            return Err(StoreError::DuplicateCode(code));
        }
        let subject = Subject {
            code: code.clone(),
            name: name.trim().to_string(),
            units: default_units(),
        };
        map.insert(code, subject.clone());
        self.persist(&map).await?;
        Ok(subject)
    }

    async fn update_subject(
        &self,
        code: &str,
        name: &str,
        new_code: &str,
        units: Vec<Unit>,
    ) -> StoreResult<Subject> {
        let code = normalize_code(code);
        let new_code = normalize_code(new_code);
        let mut map = self.subjects.write().await;

        if !map.contains_key(&code) {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }
        if new_code != code && map.contains_key(&new_code) {
            return Err(StoreError::DuplicateCode(new_code));
        }

        map.remove(&code);
        let subject = Subject {
            code: new_code.clone(),
            name: name.trim().to_string(),
            units,
        };
        map.insert(new_code.clone(), subject.clone());
        self.persist(&map).await?;

        // Re-key the lecture log so existing lectures follow the new code.
        if new_code != code {
            let old_dir = self.subject_dir(&code);
            if tokio::fs::try_exists(&old_dir).await.map_err(io_to_store)? {
                tokio::fs::create_dir_all(self.root.join("content"))
                    .await
                    .map_err(io_to_store)?;
                tokio::fs::rename(&old_dir, self.subject_dir(&new_code))
                    .await
                    .map_err(io_to_store)?;
            }
        }
        Ok(subject)
    }

    async fn delete_subject(&self, code: &str) -> StoreResult<()> {
        let code = normalize_code(code);
        let mut map = self.subjects.write().await;
        if map.remove(&code).is_none() {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }
        self.persist(&map).await?;

        // Cascade: the subject's lecture log goes with it.
        match tokio::fs::remove_dir_all(self.subject_dir(&code)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_to_store(e)),
        }
    }

    async fn list_lectures(&self, subject_code: &str) -> StoreResult<Vec<LectureSummary>> {
        let code = normalize_code(subject_code);
        let guard = self.subjects.read().await;
        if !guard.contains_key(&code) {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }
        drop(guard);
        let frags = self.load_fragments(&code).await?;
        Ok(frags.iter().map(Fragment::summary).collect())
    }

    async fn first_lecture(&self, subject_code: &str) -> StoreResult<Option<LectureSummary>> {
        Ok(self.list_lectures(subject_code).await?.into_iter().next())
    }

    async fn get_lecture(&self, subject_code: &str, lecture_id: &str) -> StoreResult<Lecture> {
        let code = normalize_code(subject_code);
        let frags = self.load_fragments(&code).await?;
        frags
            .into_iter()
            .find(|f| f.lecture_id == lecture_id)
            .map(|f| Lecture {
                lecture_id: f.lecture_id,
                subject_code: code.clone(),
                unit_id: f.unit_id,
                title: f.title,
                html_content: f.html,
            })
            .ok_or_else(|| StoreError::NotFound(format!("Lecture {lecture_id}")))
    }

    async fn append_lecture(&self, lecture: NewLecture) -> StoreResult<Lecture> {
        let code = normalize_code(&lecture.subject_code);

        // Hold the write lock across the duplicate check and the append so
        // concurrent uploads to one subject serialize.
        let map = self.subjects.write().await;
        if !map.contains_key(&code) {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }

        let existing = self.load_fragments(&code).await?;
        if existing.iter().any(|f| f.lecture_id == lecture.lecture_id) {
            return Err(StoreError::DuplicateLecture(lecture.lecture_id));
        }

        tokio::fs::create_dir_all(self.subject_dir(&code))
            .await
            .map_err(io_to_store)?;
        let entry = format!(
            "\n\n<!-- {} -->\n{}",
            lecture.title.replace("--", "- -"),
            lecture.html_content
        );
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.lectures_file(&code))
            .await
            .map_err(io_to_store)?;
        // One write of one self-contained fragment.
        file.write_all(entry.as_bytes()).await.map_err(io_to_store)?;
        file.flush().await.map_err(io_to_store)?;

        Ok(Lecture {
            lecture_id: lecture.lecture_id,
            subject_code: code,
            unit_id: lecture.unit_id,
            title: lecture.title,
            html_content: lecture.html_content,
        })
    }

    async fn count_lectures(&self, subject_code: &str) -> StoreResult<usize> {
        Ok(self.list_lectures(subject_code).await?.len())
    }
}
