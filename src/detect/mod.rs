mod registry;
mod result;
mod source;
pub mod sources;

pub use registry::SourceRegistry;
pub use result::{DetectionEvent, DetectionSet, Provenance};
pub use source::DetectionSource;
pub use sources::{synthesize, VendorMetaSource};
