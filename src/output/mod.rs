#[cfg(feature = "epd")]
pub mod epd;

use crate::error::{display_error, InkResult};
use crate::render::RenderSurface;
use std::path::PathBuf;
use tracing::{debug, info};

/// Two-colour e-ink panel driver.
///
/// Frame buffers are packed one bit per pixel, MSB first, rows padded to whole bytes,
/// with 1 meaning paper in both planes.
pub trait Panel {
    /// Native resolution as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Wake the panel and load its configuration
    fn init(&mut self) -> InkResult<()>;

    /// Blank the panel to white
    fn clear(&mut self) -> InkResult<()>;

    /// Upload both planes and refresh
    fn display(&mut self, black: &[u8], red: &[u8]) -> InkResult<()>;

    /// Put the panel into its low-power state
    fn sleep(&mut self) -> InkResult<()>;
}

/// Where a rendered frame ends up
pub trait OutputSink {
    /// Hardware sinks are skipped when the cache reports no change
    fn is_hardware(&self) -> bool;

    /// Size the frame must be rendered at
    fn dimensions(&self) -> (u32, u32);

    fn present(&mut self, surface: &RenderSurface) -> InkResult<()>;
}

/// Writes `<prefix>-b.png` and `<prefix>-r.png`
#[derive(Debug, Clone)]
pub struct FileSink {
    prefix: String,
    width: u32,
    height: u32,
}

impl FileSink {
    pub fn new(prefix: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            height,
        }
    }

    pub fn black_path(&self) -> PathBuf {
        PathBuf::from(format!("{}-b.png", self.prefix))
    }

    pub fn red_path(&self) -> PathBuf {
        PathBuf::from(format!("{}-r.png", self.prefix))
    }
}

impl OutputSink for FileSink {
    fn is_hardware(&self) -> bool {
        false
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, surface: &RenderSurface) -> InkResult<()> {
        let (black, red) = (self.black_path(), self.red_path());
        surface.black.save_png(&black)?;
        surface.red.save_png(&red)?;
        info!(
            "Rendered frame saved to {} and {}",
            black.display(),
            red.display()
        );
        Ok(())
    }
}

/// Pushes frames to an e-ink panel
pub struct PanelSink<P: Panel> {
    panel: P,
    clear_first: bool,
}

impl<P: Panel> PanelSink<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            clear_first: true,
        }
    }

    /// Skip blanking the panel before drawing
    pub fn without_clear(mut self) -> Self {
        self.clear_first = false;
        self
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

impl<P: Panel> OutputSink for PanelSink<P> {
    fn is_hardware(&self) -> bool {
        true
    }

    fn dimensions(&self) -> (u32, u32) {
        self.panel.dimensions()
    }

    fn present(&mut self, surface: &RenderSurface) -> InkResult<()> {
        let (width, height) = self.panel.dimensions();
        if (surface.width(), surface.height()) != (width, height) {
            return Err(display_error(&format!(
                "Frame is {}x{} but the panel is {}x{}",
                surface.width(),
                surface.height(),
                width,
                height
            )));
        }

        self.panel.init()?;
        if self.clear_first {
            debug!("Clearing e-ink");
            self.panel.clear()?;
        }

        info!("Sending frame to e-ink");
        self.panel
            .display(&surface.black.to_packed(), &surface.red.to_packed())?;
        self.panel.sleep()?;
        info!("E-ink done");
        Ok(())
    }
}
