pub mod blob_storage;
pub mod document_store;
pub mod format;
pub mod session_store;
