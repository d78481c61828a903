pub mod application;
pub mod assist;
pub mod catalog;
pub mod chat;
pub mod health;
pub mod job;
