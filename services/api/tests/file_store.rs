//! Integration tests for the flat-file content store.

use api_lib::adapters::file_store::FileStore;
use lectern_core::domain::{NewLecture, Unit};
use lectern_core::ports::{ContentStore, StoreError};

fn fragment(lecture_id: &str, unit_id: &str, title: &str) -> String {
    format!(
        r#"<div class="lecture-content" id="{lecture_id}" data-unit="{unit_id}"><h1>{title}</h1><p>Body of {title}.</p></div>"#
    )
}

fn new_lecture(code: &str, lecture_id: &str, unit_id: &str, title: &str) -> NewLecture {
    NewLecture {
        lecture_id: lecture_id.to_string(),
        subject_code: code.to_string(),
        unit_id: unit_id.to_string(),
        title: title.to_string(),
        html_content: fragment(lecture_id, unit_id, title),
    }
}

#[tokio::test]
async fn lectures_round_trip_through_the_append_log() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();

    store.create_subject("Mathematics", "ma101").await.unwrap();
    store
        .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
        .await
        .unwrap();

    let lecture = store.get_lecture("MA101", "limits").await.unwrap();
    assert_eq!(lecture.title, "Limits");
    assert_eq!(lecture.unit_id, "unit1");
    assert!(lecture.html_content.contains("Body of Limits."));

    let summaries = store.list_lectures("MA101").await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(store.count_lectures("MA101").await.unwrap(), 1);
}

#[tokio::test]
async fn subject_codes_are_normalized_and_unique() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();

    let subject = store.create_subject("Maths", " ma101 ").await.unwrap();
    assert_eq!(subject.code, "MA101");
    assert_eq!(subject.units.len(), 6);

    let err = store.create_subject("Other", "MA101").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateCode(_)));
}

#[tokio::test]
async fn duplicate_lecture_ids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    store.create_subject("Maths", "MA101").await.unwrap();

    store
        .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
        .await
        .unwrap();
    let err = store
        .append_lecture(new_lecture("MA101", "limits", "unit2", "Limits again"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateLecture(_)));

    // The log still holds exactly one fragment.
    assert_eq!(store.count_lectures("MA101").await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_a_subject_cascades_to_its_lectures() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    store.create_subject("Maths", "MA101").await.unwrap();
    store
        .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
        .await
        .unwrap();

    store.delete_subject("MA101").await.unwrap();

    assert!(matches!(
        store.get_subject("MA101").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(!dir.path().join("content").join("MA101").exists());

    // A recreated subject starts from an empty log.
    store.create_subject("Maths", "MA101").await.unwrap();
    assert_eq!(store.count_lectures("MA101").await.unwrap(), 0);
}

#[tokio::test]
async fn changing_a_subject_code_re_keys_its_lecture_log() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    store.create_subject("Maths", "MA101").await.unwrap();
    store
        .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
        .await
        .unwrap();

    let mut units = store.get_subject("MA101").await.unwrap().units;
    units[0] = Unit {
        id: "unit1".to_string(),
        title: "Foundations".to_string(),
    };
    let updated = store
        .update_subject("MA101", "Mathematics I", "MA102", units)
        .await
        .unwrap();
    assert_eq!(updated.code, "MA102");
    assert_eq!(updated.units[0].title, "Foundations");

    assert!(matches!(
        store.get_subject("MA101").await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    let lecture = store.get_lecture("MA102", "limits").await.unwrap();
    assert_eq!(lecture.subject_code, "MA102");
}

#[tokio::test]
async fn first_lecture_follows_append_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();
    store.create_subject("Maths", "MA101").await.unwrap();

    store
        .append_lecture(new_lecture("MA101", "vectors", "unit2", "Vectors"))
        .await
        .unwrap();
    store
        .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
        .await
        .unwrap();

    let first = store.first_lecture("MA101").await.unwrap().unwrap();
    assert_eq!(first.lecture_id, "vectors");
}

#[tokio::test]
async fn the_store_reloads_its_state_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).await.unwrap();
        store.create_subject("Maths", "MA101").await.unwrap();
        store
            .append_lecture(new_lecture("MA101", "limits", "unit1", "Limits"))
            .await
            .unwrap();
    }

    let reopened = FileStore::open(dir.path()).await.unwrap();
    let subject = reopened.get_subject("MA101").await.unwrap();
    assert_eq!(subject.name, "Maths");
    assert_eq!(reopened.count_lectures("MA101").await.unwrap(), 1);
}
