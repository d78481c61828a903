use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "chat_role", rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Worker,
}

/// Profile snapshot handed over by the external identity service. This
/// service only reads it; profile data entry lives upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub phone_number: String,
    pub nationality: String,
    #[serde(default)]
    pub owned_orchards: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub credit_score: f64,
}
