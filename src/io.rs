//! Vendor panel IO boundary
//!
//! The `esp_lcd` driver family exposes two transmit paths per panel IO
//! endpoint: a polling parameter path for commands and their arguments, and a
//! queued color path for pixel payloads that completes asynchronously through
//! a transfer-done callback. [`PanelIo`] is the Rust seam over that endpoint;
//! the on-target implementation forwards to `esp_lcd_panel_io_tx_param` /
//! `esp_lcd_panel_io_tx_color`, while tests substitute a recording mock.

use crate::error::Error;

/// A panel IO endpoint for issuing command/parameter/pixel transactions
/// over a physical bus.
///
/// A `None` command maps to the vendor's `-1` "no command" sentinel: the
/// transaction carries only the payload.
pub trait PanelIo {
    /// Transmit a command and its parameters through the polling path.
    ///
    /// The call returns once the transaction is on the wire; any queued color
    /// transfers are flushed by the vendor driver first.
    fn tx_param(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error>;

    /// Queue a pixel payload on the color path.
    ///
    /// Returns as soon as the transfer is queued; completion is signalled
    /// later through the transfer-done callback installed at construction.
    fn tx_color(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error>;
}

/// An RGB timing panel capable of blitting pixel data.
///
/// Coordinates follow the vendor convention of half-open intervals:
/// `[x_start, x_end) × [y_start, y_end)`. To cover a full `w × h` panel pass
/// `x_end = w`, `y_end = h`.
pub trait RgbPanel {
    /// Blit `data` into the panel region `[x_start, x_end) × [y_start, y_end)`.
    fn draw_bitmap(
        &mut self,
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
        data: &[u8],
    ) -> Result<(), Error>;
}
