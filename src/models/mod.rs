pub mod application;
pub mod catalog;
pub mod job;
pub mod message;
pub mod profile;
