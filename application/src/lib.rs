pub mod browse_service;
pub mod chat_service;
pub mod vote_service;
