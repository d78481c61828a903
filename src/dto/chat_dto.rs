use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::job_dto::JobResponse;
use crate::models::message::ChatMessage;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessagePayload {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoomListResponse {
    pub items: Vec<JobResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub items: Vec<ChatMessage>,
}
