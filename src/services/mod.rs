pub mod assist_service;
pub mod chat_service;
pub mod matching_service;
