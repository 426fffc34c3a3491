//! Integration tests for the SQLite store
//!
//! These run against an on-disk database in a temporary directory, covering
//! persistence across reopen and the trigger-maintained `updated_at` column.

use std::time::Duration;

use tempfile::TempDir;

use lowdown::models::{ArticleCreate, ArticleStatus, ArticleUpdate, SnapshotCreate, ThreatCreate};
use lowdown::store::Store;

fn article(url: &str) -> ArticleCreate {
    ArticleCreate {
        url: url.to_string(),
        title: Some("Test Article".to_string()),
        summary: None,
        source: Some("Manual".to_string()),
    }
}

#[test]
fn test_open_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("lowdown.db");

    let _store = Store::open(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lowdown.db");

    {
        let store = Store::open(&path).unwrap();
        store.create_article(article("http://example.com/persisted")).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let articles = store.list_articles().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].url, "http://example.com/persisted");
}

#[test]
fn test_timestamps_match_on_insert() {
    let store = Store::in_memory().unwrap();

    let created = store.create_article(article("http://example.com/a")).unwrap();
    assert_eq!(created.created_at, created.updated_at);
}

#[test]
fn test_update_refreshes_updated_at() {
    let store = Store::in_memory().unwrap();
    let created = store.create_article(article("http://example.com/a")).unwrap();

    // Timestamps carry millisecond precision, so a short pause is enough
    // for the trigger to produce a strictly later value.
    std::thread::sleep(Duration::from_millis(10));

    let updated = store
        .update_article(
            created.id,
            ArticleUpdate {
                title: Some("New Title".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn test_summary_application_refreshes_updated_at() {
    let store = Store::in_memory().unwrap();
    let created = store.create_article(article("http://example.com/a")).unwrap();

    std::thread::sleep(Duration::from_millis(10));

    let updated = store
        .apply_article_summary(created.id, "🎯 **Test**\n\nBody ([more](u))", "Body")
        .unwrap();

    assert_eq!(updated.status, ArticleStatus::Summarized);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn test_positions_assigned_and_reindexed_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("lowdown.db")).unwrap();

    let first = store.create_article(article("http://example.com/1")).unwrap();
    let second = store.create_article(article("http://example.com/2")).unwrap();
    let third = store.create_article(article("http://example.com/3")).unwrap();

    assert_eq!(first.position, Some(1));
    assert_eq!(second.position, Some(2));
    assert_eq!(third.position, Some(3));

    store.delete_article(second.id).unwrap();

    let remaining = store.list_articles().unwrap();
    let positions: Vec<_> = remaining.iter().map(|a| a.position).collect();
    assert_eq!(positions, vec![Some(1), Some(2)]);
    assert_eq!(remaining[1].id, third.id);
}

#[test]
fn test_entities_are_independent() {
    let store = Store::in_memory().unwrap();

    store.create_article(article("http://example.com/shared")).unwrap();
    store
        .create_snapshot(SnapshotCreate {
            url: "http://example.com/shared".to_string(),
            title: None,
            highlight: None,
            source: None,
        })
        .unwrap();
    store
        .create_threat(ThreatCreate {
            name: "Iskander-M".to_string(),
            threat_type: Some("SRBM".to_string()),
            country_of_origin: None,
            description: None,
            specifications: None,
            ioc_year: None,
            operators: None,
            image_url: None,
        })
        .unwrap();

    // Same URL in articles and snapshots is fine, uniqueness is per table.
    assert_eq!(store.list_articles().unwrap().len(), 1);
    assert_eq!(store.list_snapshots().unwrap().len(), 1);
    assert_eq!(store.list_threats().unwrap().len(), 1);
}
