//! Closed category schema: which attribute vectors apply to which bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse product taxonomy bucket.
///
/// The schema is fixed at two variants; anything else is "unknown" and
/// cannot be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Image embedding + category + brand.
    Fashion,
    /// Name embedding + category + author + publisher.
    Book,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Fashion, Category::Book];

    /// Parse a label (case-insensitive). Returns `None` for labels outside the schema.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fashion" => Some(Category::Fashion),
            "book" => Some(Category::Book),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Fashion => "fashion",
            Category::Book => "book",
        }
    }

    /// Column holding the vector the nearest-neighbour index is built over.
    pub fn primary_column(self) -> &'static str {
        match self {
            Category::Fashion => "vector_image",
            Category::Book => "vector_name",
        }
    }

    /// Columns whose Euclidean distance is added on top of the primary distance.
    /// The category vector is always first.
    pub fn secondary_columns(self) -> &'static [&'static str] {
        match self {
            Category::Fashion => &["vector_category", "vector_brand"],
            Category::Book => &["vector_category", "vector_author", "vector_publisher"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
