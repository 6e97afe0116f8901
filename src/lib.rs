//! ImageWithText: put a line of styled, draggable text on a picture and
//! export the result.
//!
//! The view geometry ([`geometry`]) is pure; everything around it (decoding,
//! fonts, rasterizing, encoding) lives in the other modules.
#![allow(clippy::too_many_arguments)]

#[macro_use]
pub mod logger;
pub mod compose;
pub mod config;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod io;
pub mod session;
pub mod style;
pub mod text;

pub use error::{IwtError, Result};
pub use geometry::{
    AvailableArea, Bounds, ClampedPosition, FitMode, ViewportFit, compute_clamped_position, compute_fit,
};
pub use session::EditorSession;
pub use style::{FontWeight, TextStyle};
