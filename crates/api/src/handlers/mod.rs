pub mod auth;
pub mod boards;
pub mod cards;
pub mod export;
pub mod import;
pub mod lists;
