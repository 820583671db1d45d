//! Editor constants shared across modules.
//!
//! This module centralizes the hardcoded values for hit-test tolerances,
//! size limits, and the box palette.

/// Hit-test tolerance constants (screen pixels).
pub mod tolerance {
    /// Distance within which a pointer grabs a box corner.
    pub const CORNER: f32 = 10.0;
    /// Distance within which a pointer grabs a box border.
    pub const BORDER: f32 = 10.0;
    /// Border width used when picking a box for selection.
    pub const SELECT: f32 = 8.0;
    /// Extra margin excluded from border spans so corner and border
    /// hit-tests never overlap.
    pub const CORNER_EXCLUSION: f32 = 2.0;
}

/// Box size limits (image pixels).
pub mod size {
    /// Minimum edge length enforced while resizing.
    pub const MIN_EDGE: f32 = 1.0;
    /// Minimum width and height a drawn box must exceed to be committed.
    pub const MIN_DRAW: f32 = 5.0;
}

/// Score constants. Scores are stored on a 0-100 scale.
pub mod score {
    /// Confidence assigned to user-drawn boxes (always visible).
    pub const USER_DRAWN: f32 = 100.0;
    /// Upper bound of the stored scale.
    pub const MAX: f32 = 100.0;
}

/// Box rendering palette (RGBA).
pub mod palette {
    /// Unselected box outline (#e74c3c).
    pub const BOX: [u8; 4] = [231, 76, 60, 255];
    /// Selected box outline (#2196F3).
    pub const SELECTED: [u8; 4] = [33, 150, 243, 255];
    /// Crowd-flagged box outline (#9C27B0).
    pub const CROWD: [u8; 4] = [156, 39, 176, 255];
    /// In-progress temporary box outline (#4CAF50).
    pub const TEMP: [u8; 4] = [76, 175, 80, 255];
    /// Outline stroke width in pixels.
    pub const STROKE: u32 = 3;
}
