//! Shared-reference tables.
//!
//! Parameter lists of every record are stored as ranges into three file-wide
//! arenas (`CVParam`, `UserParam`, `RefParam`), and references between
//! records are integer handles into the shared tables of the `MetaData`
//! group. [`ReferenceWriter`] builds the arenas while records are written;
//! [`ReferenceTables`] loads them back and resolves handles.

mod read;
mod write;

#[cfg(test)]
mod tests;

pub use read::ReferenceTables;
pub use write::ReferenceWriter;
