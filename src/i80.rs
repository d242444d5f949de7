//! Intel 8080 parallel display bus configuration
//!
//! The i80 interface clocks pixel data out over 8 or 16 parallel lines with a
//! write strobe, instead of serializing over SPI. Configuration mirrors the
//! vendor `esp_lcd_i80_bus_config_t` / `esp_lcd_panel_io_i80_config_t` pair;
//! the `espidf` constructor lives in [`crate::esp`].

use heapless::Vec;

use crate::error::Error;

/// Most data lines an i80 bus can carry.
pub const MAX_DATA_PINS: usize = 24;

/// i80 bus configuration
pub type I80Config = config::Config;

/// i80 configuration types
pub mod config {
    use super::*;

    /// D/C line levels for the four transaction phases.
    #[derive(Debug, Clone, Copy)]
    pub struct DcLevels {
        /// Level while the bus is idle
        pub idle: bool,
        /// Level while a command is on the bus
        pub cmd: bool,
        /// Level while dummy bytes are on the bus
        pub dummy: bool,
        /// Level while data is on the bus
        pub data: bool,
    }

    impl Default for DcLevels {
        fn default() -> Self {
            Self {
                idle: false,
                cmd: false,
                dummy: false,
                data: true,
            }
        }
    }

    /// Signal polarity and color layout tweaks.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Flags {
        /// CS line is active high
        pub cs_active_high: bool,
        /// Reverse the order of color bits
        pub reverse_color_bits: bool,
        /// Swap adjacent color bytes
        pub swap_color_bytes: bool,
        /// Pixel clock is active on the falling edge
        pub pclk_active_neg: bool,
        /// Pixel clock idles low
        pub pclk_idle_low: bool,
    }

    /// Configuration of an i80 parallel display bus.
    ///
    /// Pin fields are raw GPIO numbers; `-1` marks an unused pin.
    #[derive(Debug, Clone)]
    pub struct Config {
        /// Data line GPIOs, least-significant first
        pub data: Vec<i32, MAX_DATA_PINS>,
        /// GPIO driving the D/C line
        pub dc: i32,
        /// GPIO driving the write strobe
        pub wr: i32,
        /// GPIO driving the read strobe; `-1` if unused
        pub rd: i32,
        /// GPIO used for CS; `-1` if unused
        pub cs: i32,
        /// Pixel clock frequency in Hz
        pub pclk_hz: u32,
        /// Number of data lines, 8 or 16
        pub bus_width: usize,
        /// Bit width of LCD commands
        pub cmd_bits: i32,
        /// Bit width of LCD parameters
        pub param_bits: i32,
        /// D/C levels per transaction phase
        pub dc_levels: DcLevels,
        /// Polarity and color layout flags
        pub flags: Flags,
        /// Depth of the vendor transfer queue
        pub trans_queue_depth: usize,
    }

    impl Config {
        /// Configuration with the vendor defaults: 10 MHz pixel clock, 8-bit
        /// bus, 8-bit commands and parameters.
        pub fn new(data: &[i32], dc: i32, wr: i32) -> Self {
            Self {
                data: Vec::from_slice(&data[..data.len().min(MAX_DATA_PINS)])
                    .unwrap_or_default(),
                dc,
                wr,
                rd: -1,
                cs: -1,
                pclk_hz: 10_000_000,
                bus_width: 8,
                cmd_bits: 8,
                param_bits: 8,
                dc_levels: DcLevels::default(),
                flags: Flags::default(),
                trans_queue_depth: 10,
            }
        }

        #[must_use]
        pub fn rd(mut self, rd: i32) -> Self {
            self.rd = rd;
            self
        }

        #[must_use]
        pub fn cs(mut self, cs: i32) -> Self {
            self.cs = cs;
            self
        }

        #[must_use]
        pub fn pclk_hz(mut self, pclk_hz: u32) -> Self {
            self.pclk_hz = pclk_hz;
            self
        }

        #[must_use]
        pub fn bus_width(mut self, bus_width: usize) -> Self {
            self.bus_width = bus_width;
            self
        }

        /// Sets the bit width of both commands and parameters.
        #[must_use]
        pub fn bits(mut self, bits: i32) -> Self {
            self.cmd_bits = bits;
            self.param_bits = bits;
            self
        }

        #[must_use]
        pub fn dc_levels(mut self, dc_levels: DcLevels) -> Self {
            self.dc_levels = dc_levels;
            self
        }

        #[must_use]
        pub fn flags(mut self, flags: Flags) -> Self {
            self.flags = flags;
            self
        }

        #[must_use]
        pub fn trans_queue_depth(mut self, depth: usize) -> Self {
            self.trans_queue_depth = depth;
            self
        }

        /// Structural checks performed before any vendor call.
        ///
        /// The bus width must be 8 or 16, and the data pin list must supply
        /// exactly one GPIO per line.
        pub fn validate(&self) -> Result<(), Error> {
            if self.bus_width != 8 && self.bus_width != 16 {
                return Err(Error::InvalidBusWidth(self.bus_width));
            }
            if self.data.len() != self.bus_width {
                return Err(Error::InvalidBusWidth(self.data.len()));
            }
            if self.dc < 0 {
                return Err(Error::MissingPin("dc"));
            }
            if self.wr < 0 {
                return Err(Error::MissingPin("wr"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA8: [i32; 8] = [9, 46, 3, 8, 18, 17, 16, 15];

    #[test]
    fn eight_bit_bus_with_matching_pins_is_valid() {
        let config = I80Config::new(&DATA8, 0, 47);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unsupported_bus_width_is_rejected() {
        let config = I80Config::new(&DATA8, 0, 47).bus_width(12);
        assert_eq!(config.validate(), Err(Error::InvalidBusWidth(12)));
    }

    #[test]
    fn pin_list_must_match_bus_width() {
        let config = I80Config::new(&DATA8, 0, 47).bus_width(16);
        assert_eq!(config.validate(), Err(Error::InvalidBusWidth(8)));
    }

    #[test]
    fn control_pins_are_required() {
        let config = I80Config::new(&DATA8, -1, 47);
        assert_eq!(config.validate(), Err(Error::MissingPin("dc")));

        let config = I80Config::new(&DATA8, 0, -1);
        assert_eq!(config.validate(), Err(Error::MissingPin("wr")));
    }
}
