//! RGB timing panel and frame buffer wrapper
//!
//! An RGB panel is driven by continuous pixel-clock/hsync/vsync timing rather
//! than command transactions, scanned out of a DMA-resident frame buffer that
//! the vendor driver owns for the process lifetime. [`RgbFrameBuffer`] wraps
//! such a panel together with a host-visible byte view of that buffer.

use heapless::Vec;

use crate::error::{Error, RGB_BLUE_PINS, RGB_GREEN_PINS, RGB_RED_PINS};
use crate::io::RgbPanel;

/// Bytes per pixel of the scan-out format (RGB565).
pub const BYTES_PER_PIXEL: usize = 2;

/// RGB panel configuration
pub type RgbConfig = config::Config;

/// RGB configuration types
pub mod config {
    use super::*;

    /// Sync and clock polarity flags.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Flags {
        /// HSYNC idles low
        pub hsync_idle_low: bool,
        /// VSYNC idles low
        pub vsync_idle_low: bool,
        /// Data-enable idles high
        pub de_idle_high: bool,
        /// Pixel clock latches on the rising edge
        pub pclk_active_high: bool,
        /// Pixel clock idles high
        pub pclk_idle_high: bool,
    }

    /// Horizontal and vertical sync timing, in pixel clocks / lines.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Timings {
        pub hsync_pulse_width: u32,
        pub hsync_front_porch: u32,
        pub hsync_back_porch: u32,
        pub vsync_pulse_width: u32,
        pub vsync_front_porch: u32,
        pub vsync_back_porch: u32,
    }

    /// Configuration of an RGB timing panel.
    ///
    /// The three data pin groups carry RGB565 over 16 lines and must have
    /// fixed lengths: 5 red, 6 green, 5 blue.
    #[derive(Debug, Clone)]
    pub struct Config {
        /// GPIO driving data-enable
        pub de: i32,
        /// GPIO driving VSYNC
        pub vsync: i32,
        /// GPIO driving HSYNC
        pub hsync: i32,
        /// GPIO driving the pixel clock
        pub dclk: i32,
        /// Red data line GPIOs (5)
        pub red: Vec<i32, RGB_GREEN_PINS>,
        /// Green data line GPIOs (6)
        pub green: Vec<i32, RGB_GREEN_PINS>,
        /// Blue data line GPIOs (5)
        pub blue: Vec<i32, RGB_GREEN_PINS>,
        /// Pixel clock frequency in Hz
        pub pclk_hz: u32,
        /// Horizontal resolution in pixels
        pub width: u32,
        /// Vertical resolution in pixels
        pub height: u32,
        /// Sync timing parameters
        pub timings: Timings,
        /// Polarity flags
        pub flags: Flags,
    }

    impl Config {
        /// Configuration for a `width × height` panel with all pins supplied
        /// up front and zeroed timings.
        pub fn new(
            width: u32,
            height: u32,
            de: i32,
            vsync: i32,
            hsync: i32,
            dclk: i32,
            red: &[i32],
            green: &[i32],
            blue: &[i32],
        ) -> Self {
            Self {
                de,
                vsync,
                hsync,
                dclk,
                red: clamp_group(red),
                green: clamp_group(green),
                blue: clamp_group(blue),
                pclk_hz: 16_000_000,
                width,
                height,
                timings: Timings::default(),
                flags: Flags::default(),
            }
        }

        #[must_use]
        pub fn pclk_hz(mut self, pclk_hz: u32) -> Self {
            self.pclk_hz = pclk_hz;
            self
        }

        #[must_use]
        pub fn timings(mut self, timings: Timings) -> Self {
            self.timings = timings;
            self
        }

        #[must_use]
        pub fn flags(mut self, flags: Flags) -> Self {
            self.flags = flags;
            self
        }

        /// Length of the frame buffer this panel scans out, in bytes.
        pub fn frame_len(&self) -> usize {
            BYTES_PER_PIXEL * self.width as usize * self.height as usize
        }

        /// Structural checks performed before any vendor call.
        pub fn validate(&self) -> Result<(), Error> {
            check_group("red", &self.red, RGB_RED_PINS)?;
            check_group("green", &self.green, RGB_GREEN_PINS)?;
            check_group("blue", &self.blue, RGB_BLUE_PINS)?;
            if self.width == 0 || self.height == 0 {
                return Err(Error::InvalidResolution {
                    width: self.width,
                    height: self.height,
                });
            }
            Ok(())
        }

        /// The 16 data line GPIOs in vendor order: blue group first, then
        /// green, then red.
        pub fn data_pins(&self) -> [i32; RGB_RED_PINS + RGB_GREEN_PINS + RGB_BLUE_PINS] {
            let mut pins = [-1; RGB_RED_PINS + RGB_GREEN_PINS + RGB_BLUE_PINS];
            for (slot, pin) in pins
                .iter_mut()
                .zip(self.blue.iter().chain(&self.green).chain(&self.red))
            {
                *slot = *pin;
            }
            pins
        }
    }

    fn clamp_group(pins: &[i32]) -> Vec<i32, RGB_GREEN_PINS> {
        Vec::from_slice(&pins[..pins.len().min(RGB_GREEN_PINS)]).unwrap_or_default()
    }

    fn check_group(group: &'static str, pins: &[i32], expected: usize) -> Result<(), Error> {
        if pins.len() != expected {
            return Err(Error::InvalidPinCount {
                group,
                expected,
                found: pins.len(),
            });
        }
        Ok(())
    }
}

/// An RGB panel together with the host-visible view of its DMA frame buffer.
///
/// The byte view is exactly `2 * width * height` bytes of RGB565. The vendor
/// driver owns the memory; the wrapper holds a non-owning, process-lifetime
/// reference.
pub struct RgbFrameBuffer<P> {
    panel: P,
    frame: &'static mut [u8],
    width: u32,
    height: u32,
}

impl<P: RgbPanel> RgbFrameBuffer<P> {
    /// Wraps a panel and its frame buffer view.
    ///
    /// Fails if `frame` is not exactly `2 * width * height` bytes.
    pub fn new(panel: P, frame: &'static mut [u8], width: u32, height: u32) -> Result<Self, Error> {
        let expected = BYTES_PER_PIXEL * width as usize * height as usize;
        if frame.len() != expected {
            return Err(Error::BufferLength {
                expected,
                found: frame.len(),
            });
        }
        Ok(Self {
            panel,
            frame,
            width,
            height,
        })
    }

    /// Horizontal resolution in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Vertical resolution in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The frame buffer bytes.
    pub fn frame(&self) -> &[u8] {
        self.frame
    }

    /// The frame buffer bytes, mutably.
    pub fn frame_mut(&mut self) -> &mut [u8] {
        self.frame
    }

    /// Blits an externally supplied buffer onto the whole panel.
    ///
    /// The buffer must be exactly `2 * width * height` bytes; the blit covers
    /// exactly `width × height` pixels (half-open interval end coordinates).
    pub fn refresh(&mut self, buffer: &[u8]) -> Result<(), Error> {
        let expected = BYTES_PER_PIXEL * self.width as usize * self.height as usize;
        if buffer.len() != expected {
            return Err(Error::BufferLength {
                expected,
                found: buffer.len(),
            });
        }
        self.panel
            .draw_bitmap(0, 0, self.width as i32, self.height as i32, buffer)
    }

    /// Blits the wrapper's own frame view onto the panel.
    pub fn present(&mut self) -> Result<(), Error> {
        self.panel
            .draw_bitmap(0, 0, self.width as i32, self.height as i32, self.frame)
    }

    /// The wrapped panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The wrapped panel, mutably.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::vec;

    struct MockPanel {
        blits: alloc::vec::Vec<(i32, i32, i32, i32, usize)>,
    }

    impl MockPanel {
        fn new() -> Self {
            Self {
                blits: alloc::vec::Vec::new(),
            }
        }
    }

    impl RgbPanel for MockPanel {
        fn draw_bitmap(
            &mut self,
            x_start: i32,
            y_start: i32,
            x_end: i32,
            y_end: i32,
            data: &[u8],
        ) -> Result<(), Error> {
            self.blits.push((x_start, y_start, x_end, y_end, data.len()));
            Ok(())
        }
    }

    fn leak(len: usize) -> &'static mut [u8] {
        vec![0u8; len].leak()
    }

    #[test]
    fn short_blue_group_fails_before_any_vendor_call() {
        let config = RgbConfig::new(
            720,
            720,
            17,
            3,
            46,
            9,
            &[1, 2, 42, 41, 40],
            &[21, 47, 48, 45, 38, 39],
            &[10, 11, 12, 13],
        );
        assert_eq!(
            config.validate(),
            Err(Error::InvalidPinCount {
                group: "blue",
                expected: 5,
                found: 4,
            })
        );
    }

    #[test]
    fn data_pins_are_flattened_blue_green_red() {
        let config = RgbConfig::new(
            720,
            720,
            17,
            3,
            46,
            9,
            &[1, 2, 42, 41, 40],
            &[21, 47, 48, 45, 38, 39],
            &[10, 11, 12, 13, 14],
        );
        assert!(config.validate().is_ok());
        assert_eq!(
            config.data_pins(),
            [10, 11, 12, 13, 14, 21, 47, 48, 45, 38, 39, 1, 2, 42, 41, 40]
        );
    }

    #[test]
    fn refresh_blits_exactly_width_by_height() {
        let mut fb = RgbFrameBuffer::new(MockPanel::new(), leak(2 * 8 * 4), 8, 4).unwrap();
        let pixels = vec![0u8; 2 * 8 * 4];
        fb.refresh(&pixels).unwrap();
        assert_eq!(fb.panel().blits, vec![(0, 0, 8, 4, 2 * 8 * 4)]);
    }

    #[test]
    fn refresh_rejects_mismatched_buffer() {
        let mut fb = RgbFrameBuffer::new(MockPanel::new(), leak(2 * 8 * 4), 8, 4).unwrap();
        let pixels = vec![0u8; 2 * 8 * 4 - 1];
        assert_eq!(
            fb.refresh(&pixels),
            Err(Error::BufferLength {
                expected: 64,
                found: 63,
            })
        );
        assert!(fb.panel().blits.is_empty());
    }

    #[test]
    fn frame_view_length_is_validated() {
        let result = RgbFrameBuffer::new(MockPanel::new(), leak(10), 8, 4);
        assert!(matches!(result, Err(Error::BufferLength { expected: 64, found: 10 })));
    }

    #[test]
    fn present_blits_the_frame_view() {
        let mut fb = RgbFrameBuffer::new(MockPanel::new(), leak(2 * 8 * 4), 8, 4).unwrap();
        fb.frame_mut()[0] = 0xE0;
        fb.frame_mut()[1] = 0x07;
        fb.present().unwrap();
        assert_eq!(fb.panel().blits, vec![(0, 0, 8, 4, 64)]);
    }
}
