//! Session domain: model, history ledger, result state machine and the
//! persistence trait.

pub mod ledger;
pub mod model;
pub mod repository;
pub mod workbench;

pub use ledger::HistoryLedger;
pub use model::{BatchSize, Session};
pub use repository::SessionStore;
pub use workbench::{EditContext, EditRequest, GenerationRequest, Phase, Workbench};
