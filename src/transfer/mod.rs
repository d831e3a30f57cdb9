//! Bulk export and import of the whole store.
//!
//! An export drains every entry into a single JSON object and writes it to a
//! scoped temporary file. An import walks the fields of a JSON object and
//! upserts each one in document order.
//!
//! Neither direction is transactional. An export may observe writes that
//! race with it, and an import that fails partway leaves the entries it
//! already applied in place.

mod error;
mod export;
mod import;

pub use error::TransferError;
pub use export::{EXPORT_FILE_NAME, ExportFile, export_to_temp, snapshot, write_export};
pub use import::{ImportReport, import_document, import_file, import_reader, import_upload};
