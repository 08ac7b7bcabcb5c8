use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub owner: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Returns a copy of this note with `content` replaced and `updated_at` bumped.
    #[must_use]
    pub fn with_content(&self, content: impl Into<String>, updated_at: i64) -> Self {
        Self {
            content: content.into(),
            updated_at,
            ..self.clone()
        }
    }
}
