pub mod auth;
pub mod error;
pub mod pages;
pub mod posts;
pub mod session;
pub mod state;
