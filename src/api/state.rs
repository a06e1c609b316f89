//! Application state for the time-bank engine API.

use std::sync::Arc;

use crate::engine::{CorrectionLedger, HoursEngine};

/// Shared application state.
///
/// Holds the engine and the correction ledger that recomputes through it.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<HoursEngine>,
    ledger: Arc<CorrectionLedger>,
}

impl AppState {
    /// Creates the state around a shared engine.
    pub fn new(engine: Arc<HoursEngine>) -> Self {
        let ledger = Arc::new(CorrectionLedger::new(engine.clone()));
        Self { engine, ledger }
    }

    /// Returns the hours engine.
    pub fn engine(&self) -> &HoursEngine {
        &self.engine
    }

    /// Returns the correction ledger.
    pub fn ledger(&self) -> &CorrectionLedger {
        &self.ledger
    }

    /// A shared handle on the engine, for work moved off the async runtime.
    pub fn shared_engine(&self) -> Arc<HoursEngine> {
        Arc::clone(&self.engine)
    }

    /// A shared handle on the ledger, for work moved off the async runtime.
    pub fn shared_ledger(&self) -> Arc<CorrectionLedger> {
        Arc::clone(&self.ledger)
    }
}
