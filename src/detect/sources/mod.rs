pub mod synthetic;
pub mod vendor;

pub use synthetic::{synthesize, SYNTHETIC_CYCLE};
pub use vendor::VendorMetaSource;
