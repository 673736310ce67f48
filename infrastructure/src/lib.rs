pub mod api_client;
pub mod chat_stream;
pub mod chatbot_client;
pub mod config;
pub mod memory_store;
pub mod sqlite_store;
pub mod sse_decoder;
pub mod vote_storage;
