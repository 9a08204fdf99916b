pub mod error;
pub mod export;
pub mod logging;
pub mod map;
pub mod style;
pub mod xml;

pub use error::{Error, Result};
