pub mod error;
pub mod path_template;
pub mod manifest;
pub mod platform;
pub mod extract;
pub mod cli;

pub use error::{ExitCode, ExtractError};
pub use extract::{ExtractOptions, ExtractionReport, Extractor};
pub use manifest::BuildManifest;
