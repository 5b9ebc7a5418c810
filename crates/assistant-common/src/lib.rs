pub mod completion;
pub mod embedding;
pub mod error;
pub mod redis;
pub mod secrets;
pub mod vectordb;
