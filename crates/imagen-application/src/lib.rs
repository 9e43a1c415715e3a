pub mod bootstrap;
pub mod controller;
pub mod status;

pub use bootstrap::controller_from_env;
pub use controller::Controller;
pub use status::{OperationKind, OperationStatus, StatusBoard};
