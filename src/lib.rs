//! Display bus drivers over the `esp_lcd` panel IO driver family
//!
//! Wraps the ESP-IDF LCD drivers for the three common panel hookups:
//!
//! - **SPI**: serial command/parameter and pixel transfers ([`spi`])
//! - **i80**: Intel 8080 parallel bus with a write strobe ([`i80`])
//! - **RGB**: continuous-timing panel scanned out of a DMA frame buffer
//!   ([`rgb`])
//!
//! The SPI and i80 hookups share one dispatch surface, [`Bus`]: `send` for
//! commands and parameters, `send_color` for queued pixel payloads, and a
//! completion callback serviced on the foreground task. The RGB hookup is
//! instead a frame buffer: [`rgb::RgbFrameBuffer`] exposes the vendor's
//! DMA-resident RGB565 buffer as a mutable byte view and blits on demand.
//!
//! The vendor boundary is the [`PanelIo`] / [`RgbPanel`] trait pair, so the
//! dispatch and validation layers build and test on the host; the ESP-IDF
//! implementations in [`esp`] compile only for the `espidf` target.
//!
//! # Example
//!
//! ```ignore
//! use esp_lcd_bus::{Bus, SpiConfig};
//!
//! let config = SpiConfig::new().pins(12, 11, -1).dc(4).cs(5);
//! let mut bus = Bus::spi(&config)?;
//!
//! bus.send(Some(0x29), &[])?; // display on
//! let mut line = [0u8; 240 * 2];
//! esp_lcd_bus::swap_bytes(&mut line)?;
//! bus.send_color(Some(0x2C), &line)?;
//! bus.wait_idle();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bus;
pub mod byteswap;
pub mod error;
pub mod i80;
pub mod io;
pub mod notify;
pub mod rgb;
pub mod spi;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use bus::{Bus, CompletionCallback};
pub use byteswap::swap_bytes;
pub use error::Error;
pub use i80::I80Config;
pub use io::{PanelIo, RgbPanel};
pub use notify::TransferState;
pub use rgb::{RgbConfig, RgbFrameBuffer};
pub use spi::SpiConfig;
