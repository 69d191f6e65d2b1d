use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Exercise catalog entry. Seeded reference data; users never create these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub muscle_group: String,
    pub description: String,
}
