//! Model entity - a shoe product family

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shoe model: the product family that owns one base specification
/// and any number of variant specifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Database id (None until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Factory article number (unique across models)
    pub article: String,

    /// Human-readable model name
    pub name: String,

    /// Last (shoe form) code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_code: Option<String>,

    /// Last type description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_type: Option<String>,

    /// Smallest producible size
    pub size_min: u32,

    /// Largest producible size
    pub size_max: u32,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last update timestamp
    pub updated: DateTime<Utc>,
}

impl Model {
    /// Create a new unsaved model
    pub fn new(article: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            article: article.into(),
            name: name.into(),
            last_code: None,
            last_type: None,
            size_min: 36,
            size_max: 46,
            created: now,
            updated: now,
        }
    }

    /// Set the producible size range
    pub fn with_size_range(mut self, min: u32, max: u32) -> Self {
        self.size_min = min;
        self.size_max = max;
        self
    }

    /// Format the size range for display ("36-46")
    pub fn size_range(&self) -> String {
        format!("{}-{}", self.size_min, self.size_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let model = Model::new("A-1027", "Oxford Classic");
        assert_eq!(model.article, "A-1027");
        assert_eq!(model.name, "Oxford Classic");
        assert!(model.id.is_none());
        assert_eq!(model.size_range(), "36-46");
    }

    #[test]
    fn test_model_size_range() {
        let model = Model::new("A-2001", "Derby Work Boot").with_size_range(39, 47);
        assert_eq!(model.size_min, 39);
        assert_eq!(model.size_max, 47);
        assert_eq!(model.size_range(), "39-47");
    }
}
