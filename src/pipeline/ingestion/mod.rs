// Pipeline ingestion: paged retrieval from a review source

pub mod retriever;

pub use retriever::{Retrieval, Retriever, RetrieverSettings, StopReason};
