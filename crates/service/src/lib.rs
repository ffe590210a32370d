//! Service layer holding the record domain.
//! - `Record` is the wire and storage shape.
//! - `RecordStore` owns the lock-guarded map and its atomic create/replace.

pub mod errors;
pub mod record;
pub mod record_store;
pub mod storage;

pub use errors::ServiceError;
pub use record::Record;
pub use record_store::RecordStore;
