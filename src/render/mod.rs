mod icons;
mod layout;
pub mod plane;

pub use icons::draw_icon;
pub use layout::{render_frame, truncate, BOTTOM_GUTTER, DATE_PANEL_WIDTH};
pub use plane::{Plane, Scaled, INK, PAPER};

use crate::error::{other_error, InkResult};
use std::path::Path;

/// Default panel size, the Waveshare 7.5" HD (B)
pub const DEFAULT_WIDTH: u32 = 880;
pub const DEFAULT_HEIGHT: u32 = 528;

/// The black and red planes of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSurface {
    pub black: Plane,
    pub red: Plane,
}

impl RenderSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            black: Plane::new(width, height),
            red: Plane::new(width, height),
        }
    }

    /// Load a pre-rendered frame from two image files
    pub fn open(black: &Path, red: &Path) -> InkResult<Self> {
        let black = Plane::open(black)?;
        let red = Plane::open(red)?;
        if (black.width(), black.height()) != (red.width(), red.height()) {
            return Err(other_error(&format!(
                "Black image is {}x{} but red image is {}x{}",
                black.width(),
                black.height(),
                red.width(),
                red.height()
            )));
        }
        Ok(Self { black, red })
    }

    pub fn width(&self) -> u32 {
        self.black.width()
    }

    pub fn height(&self) -> u32 {
        self.black.height()
    }
}
