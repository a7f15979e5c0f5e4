//! Major domain entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Academic major. `code` prefixes every student identifier in the major.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Major {
    pub id: Uuid,
    #[schema(example = "CS")]
    pub code: String,
    #[schema(example = "Computer Science")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
