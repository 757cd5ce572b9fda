pub mod config;
pub mod error;
pub mod grid;
pub mod optimizer;
pub mod scorer;
pub mod tree;

pub use error::{PfResult, PictoForgeError};
// cmd and reports are binary modules (see main.rs).
