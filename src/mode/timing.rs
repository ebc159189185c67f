//! Video timing descriptors.
//!
//! The rasterizing core never looks inside a `Timing`; it only carries one
//! from mode construction to the timing generator.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Horizontal and vertical structure of one frame.
///
/// Horizontal counts are in pixel clocks from the start of hsync. Vertical
/// counts are in lines from the start of the frame, with the active video
/// at the end of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub pixel_clock_hz: u32,

    pub line_pixels: u16,
    pub sync_pixels: u16,
    pub back_porch_pixels: u16,
    pub video_pixels: u16,
    pub hsync_polarity: Polarity,

    pub vsync_start_line: u16,
    pub vsync_end_line: u16,
    pub video_start_line: u16,
    pub video_end_line: u16,
    pub vsync_polarity: Polarity,
}

impl Timing {
    /// VESA 800x600 @ 60 Hz, 40 MHz pixel clock.
    pub const SVGA_800X600_60HZ: Timing = Timing {
        pixel_clock_hz: 40_000_000,

        line_pixels: 1056,
        sync_pixels: 128,
        back_porch_pixels: 88,
        video_pixels: 800,
        hsync_polarity: Polarity::Positive,

        vsync_start_line: 1,
        vsync_end_line: 1 + 4,
        video_start_line: 1 + 4 + 23,
        video_end_line: 1 + 4 + 23 + 600,
        vsync_polarity: Polarity::Positive,
    };

    /// Industry-standard 640x480 @ 60 Hz, 25.175 MHz pixel clock.
    pub const VGA_640X480_60HZ: Timing = Timing {
        pixel_clock_hz: 25_175_000,

        line_pixels: 800,
        sync_pixels: 96,
        back_porch_pixels: 48,
        video_pixels: 640,
        hsync_polarity: Polarity::Negative,

        vsync_start_line: 10,
        vsync_end_line: 10 + 2,
        video_start_line: 10 + 2 + 33,
        video_end_line: 10 + 2 + 33 + 480,
        vsync_polarity: Polarity::Negative,
    };

    pub const fn frame_lines(&self) -> usize {
        self.video_end_line as usize
    }

    pub const fn active_lines(&self) -> usize {
        (self.video_end_line - self.video_start_line) as usize
    }

    pub const fn front_porch_pixels(&self) -> u16 {
        self.line_pixels - self.sync_pixels - self.back_porch_pixels - self.video_pixels
    }

    pub const fn line_rate_hz(&self) -> u32 {
        self.pixel_clock_hz / self.line_pixels as u32
    }

    /// Zero-based active line for a frame line, or `None` during blanking.
    pub fn active_line(&self, frame_line: usize) -> Option<usize> {
        let start = self.video_start_line as usize;
        if frame_line >= start && frame_line < self.frame_lines() {
            Some(frame_line - start)
        } else {
            None
        }
    }
}
