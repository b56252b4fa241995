pub mod classify;
pub mod cli;
pub mod convert;
pub mod error;
pub mod types;

pub use classify::infer_measurement;
pub use convert::Conversion;
pub use error::{Result, ScansortError};
pub use types::*;
