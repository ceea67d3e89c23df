pub mod config;
pub mod error;
pub mod naming;

pub use error::{CvaultError, CvaultResult};
