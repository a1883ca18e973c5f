pub mod storage_service;
pub mod user_service;

pub use storage_service::{SignedUpload, StorageService};
pub use user_service::UserService;
