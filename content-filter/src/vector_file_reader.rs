//! Async reader for offline-computed embedding files.
//!
//! Each category has one JSON document of parallel columns (see
//! [`VectorColumns`]). The file is read once at startup and turned into an
//! immutable [`VectorStore`].

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::errors::content_filter_error::ContentFilterError;
use crate::structs::category::Category;
use crate::structs::vector_columns::VectorColumns;
use crate::vector_store::VectorStore;

/// Read and parse the vector file for `category`.
///
/// # Errors
/// - `VectorFileMissing` if `path` does not exist.
/// - `Io` / `Json` on read or parse failures.
/// - Any shape error from [`VectorStore::from_columns`].
pub async fn read_vector_file<P: AsRef<Path>>(
    path: P,
    category: Category,
) -> Result<VectorStore, ContentFilterError> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ContentFilterError::VectorFileMissing {
            category: category.label().to_string(),
            path: path.to_path_buf(),
        });
    }

    let started = Instant::now();
    let bytes = tokio::fs::read(path).await?;
    let raw: VectorColumns = serde_json::from_slice(&bytes)?;
    let store = VectorStore::from_columns(category, raw)?;

    info!(
        target: "content_filter::load",
        category = %category,
        path = %path.display(),
        records = store.len(),
        dim = store.dim(),
        duration_ms = started.elapsed().as_millis() as u64,
        "vector store loaded"
    );

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_is_reported_with_category() {
        let err = read_vector_file("/definitely/not/here.json", Category::Book)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentFilterError::VectorFileMissing { .. }));
    }

    #[tokio::test]
    async fn reads_book_columns() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"product_id":[10,11],
                "vector_name":[[0.0,1.0],[1.0,1.0]],
                "vector_category":[[1.0],[1.0]],
                "vector_author":[[0.0],[2.0]],
                "vector_publisher":[[0.5],[0.5]]}}"#
        )
        .unwrap();

        let store = read_vector_file(f.path(), Category::Book).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dim(), 2);
        assert_eq!(store.position_of(11), Some(1));
    }

    #[tokio::test]
    async fn fashion_file_without_image_column_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"product_id":[1],"vector_category":[[1.0]],"vector_brand":[[1.0]]}}"#)
            .unwrap();

        let err = read_vector_file(f.path(), Category::Fashion).await.unwrap_err();
        assert!(matches!(
            err,
            ContentFilterError::MissingColumn {
                column: "vector_image",
                ..
            }
        ));
    }
}
