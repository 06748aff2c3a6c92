//! Attachment classification and object storage.

mod fs_store;
mod kind;
mod store;
mod supabase_store;

pub use fs_store::FsObjectStore;
pub use kind::{
    classify_file, file_extension, is_image, FileCategory, FileClassifier,
    DEFAULT_IMAGE_EXTENSIONS,
};
pub use store::{
    delete_attachments, generate_object_key, upload_all, CleanupReport, CleanupWarning,
    ObjectStore, StorageError, UploadBatchError, UploadFile,
};
pub use supabase_store::SupabaseObjectStore;
