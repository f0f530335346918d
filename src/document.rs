//! Documents under evaluation.
//!
//! An [`InputDocument`] is analyzed once into a read-only [`MemoryIndex`]
//! holding exactly one document. Every candidate query of a matching run is
//! verified against that index, possibly from several worker threads at the
//! same time.

pub mod input;
pub mod memory_index;

pub use input::{InputDocument, InputDocumentBuilder};
pub use memory_index::{FieldIndex, MemoryIndex, TermHit, TermPosting};
