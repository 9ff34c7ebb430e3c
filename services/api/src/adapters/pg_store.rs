//! services/api/src/adapters/pg_store.rs
//!
//! The Postgres content store. Subjects keep their unit list as a jsonb
//! column; lectures are rows with a per-subject unique lecture id. Cascade
//! deletion and code re-keying run inside one transaction so the two tables
//! cannot drift apart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_core::domain::{
    default_units, normalize_code, Lecture, LectureSummary, NewLecture, Subject, Unit,
};
use lectern_core::ports::{ContentStore, StoreError, StoreResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// A content store backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a bounded pool to the given database.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Runs database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SubjectRecord {
    code: String,
    name: String,
    units: serde_json::Value,
}

impl SubjectRecord {
    fn to_domain(self) -> StoreResult<Subject> {
        let units: Vec<Unit> = serde_json::from_value(self.units)
            .map_err(|e| StoreError::Storage(format!("corrupt units column: {e}")))?;
        Ok(Subject {
            code: self.code,
            name: self.name,
            units,
        })
    }
}

#[derive(FromRow)]
struct LectureRecord {
    lecture_id: String,
    subject_code: String,
    unit_id: String,
    title: String,
    html_content: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl LectureRecord {
    fn to_domain(self) -> Lecture {
        Lecture {
            lecture_id: self.lecture_id,
            subject_code: self.subject_code,
            unit_id: self.unit_id,
            title: self.title,
            html_content: self.html_content,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    lecture_id: String,
    title: String,
    unit_id: String,
}

impl SummaryRecord {
    fn to_domain(self) -> LectureSummary {
        LectureSummary {
            lecture_id: self.lecture_id,
            title: self.title,
            unit_id: self.unit_id,
        }
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

//=========================================================================================
// `ContentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentStore for PgStore {
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        let records = sqlx::query_as::<_, SubjectRecord>(
            "SELECT code, name, units FROM subjects ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        records.into_iter().map(SubjectRecord::to_domain).collect()
    }

    async fn get_subject(&self, code: &str) -> StoreResult<Subject> {
        let code = normalize_code(code);
        let record = sqlx::query_as::<_, SubjectRecord>(
            "SELECT code, name, units FROM subjects WHERE code = $1",
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| StoreError::NotFound(format!("Subject {code}")))?;
        record.to_domain()
    }

    async fn create_subject(&self, name: &str, code: &str) -> StoreResult<Subject> {
        let code = normalize_code(code);
        let units = default_units();
        let units_json = serde_json::to_value(&units)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query("INSERT INTO subjects (code, name, units) VALUES ($1, $2, $3)")
            .bind(&code)
            .bind(name.trim())
            .bind(&units_json)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateCode(code.clone())
                } else {
                    db_error(e)
                }
            })?;

        Ok(Subject {
            code,
            name: name.trim().to_string(),
            units,
        })
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
        let units_json = serde_json::to_value(&units)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let updated =
            sqlx::query("UPDATE subjects SET code = $1, name = $2, units = $3 WHERE code = $4")
                .bind(&new_code)
                .bind(name.trim())
                .bind(&units_json)
                .bind(&code)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StoreError::DuplicateCode(new_code.clone())
                    } else {
                        db_error(e)
                    }
                })?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }

        if new_code != code {
            sqlx::query("UPDATE lectures SET subject_code = $1 WHERE subject_code = $2")
                .bind(&new_code)
                .bind(&code)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(Subject {
            code: new_code,
            name: name.trim().to_string(),
            units,
        })
    }

    async fn delete_subject(&self, code: &str) -> StoreResult<()> {
        let code = normalize_code(code);
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM lectures WHERE subject_code = $1")
            .bind(&code)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let deleted = sqlx::query("DELETE FROM subjects WHERE code = $1")
            .bind(&code)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Subject {code}")));
        }

        tx.commit().await.map_err(db_error)
    }

    async fn list_lectures(&self, subject_code: &str) -> StoreResult<Vec<LectureSummary>> {
        let code = normalize_code(subject_code);
        let records = sqlx::query_as::<_, SummaryRecord>(
            "SELECT lecture_id, title, unit_id FROM lectures \
             WHERE subject_code = $1 ORDER BY created_at ASC",
        )
        .bind(&code)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(SummaryRecord::to_domain).collect())
    }

    async fn first_lecture(&self, subject_code: &str) -> StoreResult<Option<LectureSummary>> {
        let code = normalize_code(subject_code);
        let record = sqlx::query_as::<_, SummaryRecord>(
            "SELECT lecture_id, title, unit_id FROM lectures \
             WHERE subject_code = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(&code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.map(SummaryRecord::to_domain))
    }

    async fn get_lecture(&self, subject_code: &str, lecture_id: &str) -> StoreResult<Lecture> {
        let code = normalize_code(subject_code);
        let record = sqlx::query_as::<_, LectureRecord>(
            "SELECT lecture_id, subject_code, unit_id, title, html_content, created_at \
             FROM lectures WHERE subject_code = $1 AND lecture_id = $2",
        )
        .bind(&code)
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| StoreError::NotFound(format!("Lecture {lecture_id}")))?;
        Ok(record.to_domain())
    }

    async fn append_lecture(&self, lecture: NewLecture) -> StoreResult<Lecture> {
        let code = normalize_code(&lecture.subject_code);
        sqlx::query(
            "INSERT INTO lectures (id, lecture_id, subject_code, unit_id, title, html_content) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(&lecture.lecture_id)
        .bind(&code)
        .bind(&lecture.unit_id)
        .bind(&lecture.title)
        .bind(&lecture.html_content)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateLecture(lecture.lecture_id.clone())
            } else {
                db_error(e)
            }
        })?;

        Ok(Lecture {
            lecture_id: lecture.lecture_id,
            subject_code: code,
            unit_id: lecture.unit_id,
            title: lecture.title,
            html_content: lecture.html_content,
        })
    }

    async fn count_lectures(&self, subject_code: &str) -> StoreResult<usize> {
        let code = normalize_code(subject_code);
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lectures WHERE subject_code = $1")
                .bind(&code)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(count as usize)
    }
}
