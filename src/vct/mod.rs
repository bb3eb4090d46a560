mod attribute;
mod decode;
mod feature;
mod file;
mod header;
mod lexer;
mod metadata;
mod reader;
mod store;
mod writer;

pub use feature::VctFeature;
pub use file::VctFile;
pub use metadata::VctMetadata;
pub use store::{EditOutcome, FeatureStore};
