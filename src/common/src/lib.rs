pub mod cli;
pub mod config;
pub mod stderr;
pub mod verbosity;

pub use config::{Configuration, ParquetCodec};
pub use verbosity::Verbosity;
