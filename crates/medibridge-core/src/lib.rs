pub mod config;
pub mod logging;

pub mod audit;
pub mod error;
pub mod his;
pub mod medihelp;
pub mod normalize;
pub mod records;
pub mod share_path;
pub mod staging;

pub use error::{BridgeError, BridgeResult};
