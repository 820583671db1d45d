//! bboxed - interactive bounding-box editing engine
//!
//! The core of a detection-review tool: a shared collection of scored,
//! labeled boxes edited through two cooperating front-ends (inline and
//! modal), with pointer gestures for drawing, dragging and corner
//! resizing, a stateless raster overlay, and remote persistence with
//! out-of-order completion handling.

mod constants;
mod editor;
mod error;
mod geometry;
mod interaction;
mod model;
mod persist;
mod render;

pub use constants::{palette, score, size, tolerance};
pub use editor::{EditorFacade, FacadeKind, SharedCollection};
pub use error::{EditorError, Result};
pub use geometry::{hit_test, near_border, near_corner, Hit, HitTarget, ViewTransform};
pub use interaction::{DefaultClass, InteractionController, PointerEvent};
pub use model::{BBox, BoxCollection, ClassLabels, Corner, InboundState, Side};
pub use persist::{
    HttpTransport, SaveAck, SaveError, SavePayload, SaveTracker, SaveTransport, SavedBox,
};
pub use render::RenderSurface;
