pub mod activity;
pub mod attachment;
pub mod board;
pub mod card;
pub mod comment;
pub mod label;
pub mod list;
pub mod subtask;
pub mod user;
