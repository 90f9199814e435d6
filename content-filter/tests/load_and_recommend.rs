use std::collections::BTreeMap;
use std::io::Write;

use content_filter::{Category, ContentBasedFilter, ContentFilterError};

fn write_book_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("book.json");
    let ids: Vec<u64> = (1..=10).collect();
    let doc = serde_json::json!({
        "product_id": ids,
        "vector_name": ids.iter().map(|i| vec![*i as f32, 0.0]).collect::<Vec<_>>(),
        "vector_category": ids.iter().map(|_| vec![1.0_f32, 0.0]).collect::<Vec<_>>(),
        "vector_author": ids.iter().map(|i| vec![(*i % 2) as f32]).collect::<Vec<_>>(),
        "vector_publisher": ids.iter().map(|_| vec![0.0_f32]).collect::<Vec<_>>(),
    });
    let mut f = std::fs::File::create(&path).unwrap();
    write!(f, "{doc}").unwrap();
    path
}

#[tokio::test]
async fn book_scenario_never_returns_seen_products() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = BTreeMap::new();
    files.insert(Category::Book, write_book_file(&dir));

    let filter = ContentBasedFilter::load(&files).await.unwrap();
    assert_eq!(filter.categories(), vec![Category::Book]);

    let out = filter.recommend_for_label(1, "book", 5, true, Some(&[1, 2]));
    assert!(!out.is_empty());
    assert!(out.len() <= 5);
    assert!(!out.contains(&1));
    assert!(!out.contains(&2));

    let scored = filter.recommend_scored(1, Category::Book, 5, true, Some(&[1, 2]));
    assert!(scored.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn missing_configured_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = BTreeMap::new();
    files.insert(Category::Book, write_book_file(&dir));
    files.insert(Category::Fashion, dir.path().join("fashion.json"));

    let err = ContentBasedFilter::load(&files).await.unwrap_err();
    assert!(matches!(err, ContentFilterError::VectorFileMissing { .. }));
}
