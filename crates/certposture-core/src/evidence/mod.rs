//! Declared certification evidence.
//!
//! The evidence database maps OS keys to analyst-maintained records. This
//! module reads those records and normalizes them into a single canonical
//! view, whichever of the two historical shapes they were written in.

mod normalize;
mod record;

pub use normalize::{normalize, DeclaredStatus, NormalizedEvidence, STATUS_ABSENT};
pub use record::{EvidenceDatabase, EvidenceRecord};
