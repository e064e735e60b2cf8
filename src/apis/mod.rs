pub mod play_store;

pub use play_store::PlayStoreClient;
