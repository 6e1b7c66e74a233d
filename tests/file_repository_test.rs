use filebox_rs::models::{CreateFileInput, UpdateFileInput, UpsertFileInput};
use filebox_rs::repositories::FileStore;
use filebox_rs::test_utils::create_test_database;
use std::sync::Arc;

fn input(name: &str, version: i32) -> CreateFileInput {
    CreateFileInput {
        name: name.to_string(),
        url: format!("https://cdn.filestackcontent.com/{}", name),
        file_type: "text/plain".to_string(),
        version,
    }
}

async fn store() -> Arc<dyn FileStore> {
    create_test_database().await.unwrap().file_store()
}

#[tokio::test]
async fn test_list_returns_records_in_creation_order() {
    let store = store().await;
    for name in ["c.txt", "a.txt", "b.txt"] {
        store.create_file(&input(name, 1)).await.unwrap();
    }

    let names: Vec<String> = store.list_files().await.unwrap().into_iter().map(|file| file.name).collect();
    assert_eq!(names, vec!["c.txt", "a.txt", "b.txt"]);
}

#[tokio::test]
async fn test_search_matches_exact_name_oldest_first() {
    let store = store().await;
    store.create_file(&input("old-report.txt", 1)).await.unwrap();
    store.create_file(&input("Report.txt", 1)).await.unwrap();
    let first = store.create_file(&input("report.txt", 4)).await.unwrap();
    let second = store.create_file(&input("report.txt", 1)).await.unwrap();

    let results = store.search_files("report.txt").await.unwrap();

    assert_eq!(results, vec![first, second]);
    assert!(store.search_files("report").await.unwrap().is_empty());
    assert!(store.search_files("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_is_partial_and_missing_id_is_none() {
    let store = store().await;
    let created = store.create_file(&input("notes.txt", 1)).await.unwrap();

    let updated = store
        .update_file(&created.id, &UpdateFileInput { version: Some(2), ..Default::default() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.url, created.url);
    assert_eq!(updated.name, created.name);

    let missing = store
        .update_file("missing", &UpdateFileInput { version: Some(2), ..Default::default() })
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_returns_removed_record() {
    let store = store().await;
    let created = store.create_file(&input("gone.txt", 1)).await.unwrap();

    assert_eq!(store.delete_file(&created.id).await.unwrap(), Some(created.clone()));
    assert_eq!(store.get_file(&created.id).await.unwrap(), None);
    assert_eq!(store.delete_file(&created.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_upsert_updates_oldest_exact_match() {
    let store = store().await;
    let older = store.create_file(&input("dup.txt", 2)).await.unwrap();
    store.create_file(&input("dup.txt", 7)).await.unwrap();

    let upserted = store
        .upsert_file(&UpsertFileInput {
            name: "dup.txt".to_string(),
            url: "https://cdn.filestackcontent.com/new".to_string(),
            file_type: "text/markdown".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(upserted.id, older.id);
    assert_eq!(upserted.version, 3);
    assert_eq!(upserted.file_type, "text/markdown");
    assert_eq!(store.count_files().await.unwrap(), 2);
}
