pub mod backend;
pub mod chat;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod vote;
pub mod vote_policy;
