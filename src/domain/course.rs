//! Course domain entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Course offered for selection. Credits use a fixed-point decimal so
/// aggregation over enrollments stays exact.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    #[schema(example = "CS101")]
    pub code: String,
    #[schema(example = "Introduction to Programming")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = f64, example = 3.5)]
    pub credits: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
