//! SPI display bus configuration
//!
//! Covers the classic serial hookup: SCLK/MOSI plus a D/C line toggled by the
//! vendor driver between command and data phases. On the `espidf` target the
//! matching constructor lives in [`crate::esp`]; it claims the SPI host and
//! creates the panel IO endpoint in one step.

use crate::error::Error;

pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

/// SPI bus configuration
pub type SpiConfig = config::Config;

/// SPI configuration types
pub mod config {
    use super::*;

    /// Configuration of a SPI display bus.
    ///
    /// Pin fields are raw GPIO numbers; `-1` marks an unused pin, the vendor
    /// driver convention.
    #[derive(Debug, Clone)]
    pub struct Config {
        /// SPI host to claim
        pub host: i32,
        /// Pixel clock frequency in Hz
        pub baudrate_hz: u32,
        /// SPI mode (clock polarity and phase)
        pub data_mode: Mode,
        /// Bit width of LCD commands
        pub cmd_bits: i32,
        /// Bit width of LCD parameters
        pub param_bits: i32,
        /// Transmit least-significant bit first
        pub lsb_first: bool,
        /// GPIO used for SCLK
        pub sck: i32,
        /// GPIO used for MOSI
        pub mosi: i32,
        /// GPIO used for MISO
        pub miso: i32,
        /// GPIO driving the D/C line; `-1` if not controlled via GPIO
        pub dc: i32,
        /// GPIO used for CS
        pub cs: i32,
        /// Depth of the vendor transfer queue
        pub trans_queue_depth: usize,
    }

    impl Config {
        /// Configuration with the vendor defaults: host 2, 24 MHz, mode 0,
        /// 8-bit commands and parameters, all pins unassigned.
        pub const fn new() -> Self {
            Self {
                host: 2,
                baudrate_hz: 24_000_000,
                data_mode: MODE_0,
                cmd_bits: 8,
                param_bits: 8,
                lsb_first: false,
                sck: -1,
                mosi: -1,
                miso: -1,
                dc: -1,
                cs: -1,
                trans_queue_depth: 10,
            }
        }

        #[must_use]
        pub fn host(mut self, host: i32) -> Self {
            self.host = host;
            self
        }

        #[must_use]
        pub fn baudrate_hz(mut self, baudrate_hz: u32) -> Self {
            self.baudrate_hz = baudrate_hz;
            self
        }

        #[must_use]
        pub fn data_mode(mut self, data_mode: Mode) -> Self {
            self.data_mode = data_mode;
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
        pub fn lsb_first(mut self, lsb_first: bool) -> Self {
            self.lsb_first = lsb_first;
            self
        }

        #[must_use]
        pub fn pins(mut self, sck: i32, mosi: i32, miso: i32) -> Self {
            self.sck = sck;
            self.mosi = mosi;
            self.miso = miso;
            self
        }

        #[must_use]
        pub fn dc(mut self, dc: i32) -> Self {
            self.dc = dc;
            self
        }

        #[must_use]
        pub fn cs(mut self, cs: i32) -> Self {
            self.cs = cs;
            self
        }

        #[must_use]
        pub fn trans_queue_depth(mut self, depth: usize) -> Self {
            self.trans_queue_depth = depth;
            self
        }

        /// The vendor encoding of [`Mode`]: `polarity | phase << 1`.
        pub fn mode_bits(&self) -> u32 {
            let cpol = match self.data_mode.polarity {
                Polarity::IdleLow => 0,
                Polarity::IdleHigh => 1,
            };
            let cpha = match self.data_mode.phase {
                Phase::CaptureOnFirstTransition => 0,
                Phase::CaptureOnSecondTransition => 1,
            };
            cpol | (cpha << 1)
        }

        /// Structural checks performed before any vendor call.
        pub fn validate(&self) -> Result<(), Error> {
            if self.sck < 0 {
                return Err(Error::MissingPin("sck"));
            }
            if self.mosi < 0 {
                return Err(Error::MissingPin("mosi"));
            }
            Ok(())
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vendor_defaults() {
        let config = SpiConfig::new();
        assert_eq!(config.host, 2);
        assert_eq!(config.baudrate_hz, 24_000_000);
        assert_eq!(config.cmd_bits, 8);
        assert_eq!(config.trans_queue_depth, 10);
        assert_eq!(config.mode_bits(), 0);
    }

    #[test]
    fn mode_bits_encode_polarity_then_phase() {
        assert_eq!(SpiConfig::new().data_mode(MODE_0).mode_bits(), 0);
        assert_eq!(SpiConfig::new().data_mode(MODE_2).mode_bits(), 1);
        assert_eq!(SpiConfig::new().data_mode(MODE_1).mode_bits(), 2);
        assert_eq!(SpiConfig::new().data_mode(MODE_3).mode_bits(), 3);
    }

    #[test]
    fn unassigned_clock_or_data_pin_is_rejected() {
        let config = SpiConfig::new().pins(-1, 11, -1);
        assert_eq!(config.validate(), Err(Error::MissingPin("sck")));

        let config = SpiConfig::new().pins(12, -1, -1);
        assert_eq!(config.validate(), Err(Error::MissingPin("mosi")));

        let config = SpiConfig::new().pins(12, 11, -1).dc(4).cs(5);
        assert!(config.validate().is_ok());
    }
}
