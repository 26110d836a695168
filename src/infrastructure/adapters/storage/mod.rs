//! Storage Adapter - 对象存储实现

mod file_store;
mod s3_store;

pub use file_store::FileObjectStore;
pub use s3_store::{S3ObjectStore, S3StoreConfig};
