//! Persistence adapter.
//!
//! The engine persists six named collections, each an ordered JSON list.
//! A [`Store`] only moves raw JSON text in and out; the typed
//! [`Repository`] on top of it decodes the lists, treats absent or corrupt
//! collections as empty, and serializes read-modify-write cycles.

mod file;
mod memory;
mod repository;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::Repository;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// The collections the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Recorded punches, in their current (projected) state.
    Punches,
    /// Append-only correction entries.
    CorrectionLedger,
    /// One live computed result per punch.
    ComputedResults,
    /// Append-only computation audit trail.
    ComputationLog,
    /// Configured department caps.
    DepartmentCaps,
    /// Append-only cap change audit trail.
    CapChangeLog,
}

impl Collection {
    /// Every collection, in a stable order.
    pub const ALL: [Collection; 6] = [
        Collection::Punches,
        Collection::CorrectionLedger,
        Collection::ComputedResults,
        Collection::ComputationLog,
        Collection::DepartmentCaps,
        Collection::CapChangeLog,
    ];

    /// The persisted name of the collection.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Punches => "punches",
            Collection::CorrectionLedger => "correctionLedger",
            Collection::ComputedResults => "computedResults",
            Collection::ComputationLog => "computationLog",
            Collection::DepartmentCaps => "departmentCaps",
            Collection::CapChangeLog => "capChangeLog",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw get/set access to persisted collections.
///
/// `get` returns `Ok(None)` for a collection that was never written.
pub trait Store: Send + Sync {
    /// Reads the JSON text of a collection.
    fn get(&self, collection: Collection) -> EngineResult<Option<String>>;

    /// Replaces the JSON text of a collection.
    fn set(&self, collection: Collection, contents: String) -> EngineResult<()>;
}
