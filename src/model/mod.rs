//! Data model: boxes, the shared collection, class labels, inbound state.

mod bbox;
mod collection;
mod import;
mod labels;

pub use bbox::{BBox, Corner, Side};
pub use collection::BoxCollection;
pub use import::InboundState;
pub use labels::ClassLabels;
