//! ESP-IDF backend
//!
//! Binds the portable bus types to the `esp_lcd` driver family. Construction
//! follows the vendor flow: claim the physical bus, create the panel IO (or
//! RGB panel) with the transfer-done callback installed, and hand the raw
//! handle to the portable wrapper.
//!
//! The completion callback runs in ISR or DMA-completion context; it only
//! touches the shared [`TransferState`] atomics and never calls back into
//! user code from there.

extern crate alloc;

use alloc::sync::Arc;
use core::ffi::c_void;

use esp_idf_sys::*;

use crate::bus::Bus;
use crate::error::Error;
use crate::i80::I80Config;
use crate::io::{PanelIo, RgbPanel};
use crate::notify::TransferState;
use crate::rgb::{RgbConfig, RgbFrameBuffer};
use crate::spi::SpiConfig;

/// Vendor-invoked transfer-done callback.
///
/// `user_ctx` is the `TransferState` shared with the issuing bus wrapper,
/// kept alive by the wrapper for as long as the panel IO handle exists.
unsafe extern "C" fn color_trans_done(
    _panel_io: esp_lcd_panel_io_handle_t,
    _edata: *mut esp_lcd_panel_io_event_data_t,
    user_ctx: *mut c_void,
) -> bool {
    let state = &*(user_ctx as *const TransferState);
    state.complete_from_isr()
}

/// Which physical bus resource a panel IO endpoint claimed, for teardown.
enum BusClaim {
    Spi(spi_host_device_t),
    I80(esp_lcd_i80_bus_handle_t),
}

/// A panel IO endpoint backed by an `esp_lcd_panel_io_handle_t`.
///
/// Owns the underlying bus claim; dropping the endpoint deletes the panel IO
/// and releases the bus.
pub struct EspPanelIo {
    handle: esp_lcd_panel_io_handle_t,
    claim: BusClaim,
    _state: Arc<TransferState>,
}

impl EspPanelIo {
    /// The raw panel IO handle, for vendor calls not covered here.
    pub fn handle(&self) -> esp_lcd_panel_io_handle_t {
        self.handle
    }
}

impl PanelIo for EspPanelIo {
    fn tx_param(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
        let data_ptr = if data.is_empty() {
            core::ptr::null()
        } else {
            data.as_ptr() as *const c_void
        };
        esp!(unsafe {
            esp_lcd_panel_io_tx_param(self.handle, cmd.unwrap_or(-1), data_ptr, data.len())
        })
        .map_err(|e| Error::Io(e.code()))
    }

    fn tx_color(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
        esp!(unsafe {
            esp_lcd_panel_io_tx_color(
                self.handle,
                cmd.unwrap_or(-1),
                data.as_ptr() as *const c_void,
                data.len(),
            )
        })
        .map_err(|e| Error::Io(e.code()))
    }
}

impl Drop for EspPanelIo {
    fn drop(&mut self) {
        unsafe {
            let _ = esp_lcd_panel_io_del(self.handle);
            match self.claim {
                BusClaim::Spi(host) => {
                    let _ = spi_bus_free(host);
                }
                BusClaim::I80(bus) => {
                    let _ = esp_lcd_del_i80_bus(bus);
                }
            }
        }
    }
}

unsafe impl Send for EspPanelIo {}

impl Bus<EspPanelIo> {
    /// Claims a SPI host and creates a display bus on it.
    ///
    /// On vendor failure the SPI host may stay claimed until the board is
    /// power-cycled; the error says so.
    pub fn spi(config: &SpiConfig) -> Result<Self, Error> {
        config.validate()?;

        let host = config.host as spi_host_device_t;
        let state = Arc::new(TransferState::new());

        #[allow(clippy::needless_update)]
        let bus_config = spi_bus_config_t {
            flags: SPICOMMON_BUSFLAG_MASTER,
            sclk_io_num: config.sck,
            __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 {
                mosi_io_num: config.mosi,
            },
            __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 {
                miso_io_num: config.miso,
            },
            __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 {
                quadwp_io_num: -1,
            },
            __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 {
                quadhd_io_num: -1,
            },
            max_transfer_sz: 0,
            ..Default::default()
        };

        esp!(unsafe { spi_bus_initialize(host, &bus_config, spi_common_dma_t_SPI_DMA_CH_AUTO) })
            .map_err(|e| Error::BusInit(e.code()))?;

        let mut io_config: esp_lcd_panel_io_spi_config_t = unsafe { core::mem::zeroed() };
        io_config.dc_gpio_num = config.dc;
        io_config.cs_gpio_num = config.cs;
        io_config.pclk_hz = config.baudrate_hz as _;
        io_config.spi_mode = config.mode_bits() as _;
        io_config.lcd_cmd_bits = config.cmd_bits as _;
        io_config.lcd_param_bits = config.param_bits as _;
        io_config.trans_queue_depth = config.trans_queue_depth as _;
        io_config.on_color_trans_done = Some(color_trans_done);
        io_config.user_ctx = Arc::as_ptr(&state) as *mut c_void;
        io_config.flags.set_lsb_first(config.lsb_first as _);

        let mut handle: esp_lcd_panel_io_handle_t = core::ptr::null_mut();
        if let Err(e) = esp!(unsafe {
            esp_lcd_new_panel_io_spi(
                config.host as usize as esp_lcd_spi_bus_handle_t,
                &io_config,
                &mut handle,
            )
        }) {
            unsafe {
                let _ = spi_bus_free(host);
            }
            return Err(Error::BusInit(e.code()));
        }

        log::debug!("spi display bus up on host {}", config.host);

        Ok(Bus::new(
            EspPanelIo {
                handle,
                claim: BusClaim::Spi(host),
                _state: state.clone(),
            },
            state,
        ))
    }

    /// Creates an i80 parallel bus and a display bus on it.
    pub fn i80(config: &I80Config) -> Result<Self, Error> {
        config.validate()?;

        let state = Arc::new(TransferState::new());

        // clk_src stays zeroed, the vendor default clock source.
        let mut bus_config: esp_lcd_i80_bus_config_t = unsafe { core::mem::zeroed() };
        bus_config.dc_gpio_num = config.dc;
        bus_config.wr_gpio_num = config.wr;
        for (slot, pin) in bus_config.data_gpio_nums.iter_mut().zip(&config.data) {
            *slot = *pin;
        }
        bus_config.bus_width = config.bus_width as _;
        bus_config.max_transfer_bytes = 0;

        let mut bus_handle: esp_lcd_i80_bus_handle_t = core::ptr::null_mut();
        esp!(unsafe { esp_lcd_new_i80_bus(&bus_config, &mut bus_handle) })
            .map_err(|e| Error::BusInit(e.code()))?;

        let mut io_config: esp_lcd_panel_io_i80_config_t = unsafe { core::mem::zeroed() };
        io_config.cs_gpio_num = config.cs;
        io_config.pclk_hz = config.pclk_hz as _;
        io_config.trans_queue_depth = config.trans_queue_depth as _;
        io_config.lcd_cmd_bits = config.cmd_bits as _;
        io_config.lcd_param_bits = config.param_bits as _;
        io_config.on_color_trans_done = Some(color_trans_done);
        io_config.user_ctx = Arc::as_ptr(&state) as *mut c_void;
        io_config
            .dc_levels
            .set_dc_idle_level(config.dc_levels.idle as _);
        io_config
            .dc_levels
            .set_dc_cmd_level(config.dc_levels.cmd as _);
        io_config
            .dc_levels
            .set_dc_dummy_level(config.dc_levels.dummy as _);
        io_config
            .dc_levels
            .set_dc_data_level(config.dc_levels.data as _);
        io_config
            .flags
            .set_cs_active_high(config.flags.cs_active_high as _);
        io_config
            .flags
            .set_reverse_color_bits(config.flags.reverse_color_bits as _);
        io_config
            .flags
            .set_swap_color_bytes(config.flags.swap_color_bytes as _);
        io_config
            .flags
            .set_pclk_active_neg(config.flags.pclk_active_neg as _);
        io_config
            .flags
            .set_pclk_idle_low(config.flags.pclk_idle_low as _);

        let mut handle: esp_lcd_panel_io_handle_t = core::ptr::null_mut();
        if let Err(e) = esp!(unsafe { esp_lcd_new_panel_io_i80(bus_handle, &io_config, &mut handle) })
        {
            unsafe {
                let _ = esp_lcd_del_i80_bus(bus_handle);
            }
            return Err(Error::BusInit(e.code()));
        }

        log::debug!(
            "i80 display bus up, width {}, pclk {} Hz",
            config.bus_width,
            config.pclk_hz
        );

        Ok(Bus::new(
            EspPanelIo {
                handle,
                claim: BusClaim::I80(bus_handle),
                _state: state.clone(),
            },
            state,
        ))
    }
}

/// An RGB timing panel backed by an `esp_lcd_panel_handle_t`.
///
/// No teardown: the vendor driver owns the panel and its DMA frame buffer for
/// the process lifetime, since the frame buffer is exposed to the host as a
/// `'static` byte view.
pub struct EspRgbPanel {
    handle: esp_lcd_panel_handle_t,
}

impl EspRgbPanel {
    /// The raw panel handle, for vendor calls not covered here.
    pub fn handle(&self) -> esp_lcd_panel_handle_t {
        self.handle
    }
}

impl RgbPanel for EspRgbPanel {
    fn draw_bitmap(
        &mut self,
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
        data: &[u8],
    ) -> Result<(), Error> {
        esp!(unsafe {
            esp_lcd_panel_draw_bitmap(
                self.handle,
                x_start,
                y_start,
                x_end,
                y_end,
                data.as_ptr() as *const c_void,
            )
        })
        .map_err(|e| Error::Io(e.code()))
    }
}

unsafe impl Send for EspRgbPanel {}

impl RgbFrameBuffer<EspRgbPanel> {
    /// Creates an RGB timing panel, initializes it and maps its DMA frame
    /// buffer into a host-visible byte view.
    pub fn rgb(config: &RgbConfig) -> Result<Self, Error> {
        config.validate()?;

        // clk_src stays zeroed, the vendor default clock source.
        let mut panel_config: esp_lcd_rgb_panel_config_t = unsafe { core::mem::zeroed() };
        panel_config.timings.pclk_hz = config.pclk_hz as _;
        panel_config.timings.h_res = config.width as _;
        panel_config.timings.v_res = config.height as _;
        panel_config.timings.hsync_pulse_width = config.timings.hsync_pulse_width as _;
        panel_config.timings.hsync_front_porch = config.timings.hsync_front_porch as _;
        panel_config.timings.hsync_back_porch = config.timings.hsync_back_porch as _;
        panel_config.timings.vsync_pulse_width = config.timings.vsync_pulse_width as _;
        panel_config.timings.vsync_front_porch = config.timings.vsync_front_porch as _;
        panel_config.timings.vsync_back_porch = config.timings.vsync_back_porch as _;
        panel_config
            .timings
            .flags
            .set_hsync_idle_low(config.flags.hsync_idle_low as _);
        panel_config
            .timings
            .flags
            .set_vsync_idle_low(config.flags.vsync_idle_low as _);
        panel_config
            .timings
            .flags
            .set_de_idle_high(config.flags.de_idle_high as _);
        panel_config
            .timings
            .flags
            .set_pclk_active_neg(!config.flags.pclk_active_high as _);
        panel_config
            .timings
            .flags
            .set_pclk_idle_high(config.flags.pclk_idle_high as _);

        // RGB565 over 16 parallel lines, one vendor-allocated frame buffer.
        panel_config.data_width = 16;
        panel_config.bits_per_pixel = 16;
        panel_config.num_fbs = 1;
        panel_config.sram_trans_align = 64;
        panel_config.psram_trans_align = 64;
        panel_config.hsync_gpio_num = config.hsync;
        panel_config.vsync_gpio_num = config.vsync;
        panel_config.de_gpio_num = config.de;
        panel_config.pclk_gpio_num = config.dclk;
        panel_config.disp_gpio_num = -1;
        for (slot, pin) in panel_config
            .data_gpio_nums
            .iter_mut()
            .zip(config.data_pins())
        {
            *slot = pin;
        }

        let mut handle: esp_lcd_panel_handle_t = core::ptr::null_mut();
        esp!(unsafe { esp_lcd_new_rgb_panel(&panel_config, &mut handle) })
            .map_err(|e| Error::BusInit(e.code()))?;

        esp!(unsafe { esp_lcd_panel_reset(handle) }).map_err(|e| Error::BusInit(e.code()))?;
        esp!(unsafe { esp_lcd_panel_init(handle) }).map_err(|e| Error::BusInit(e.code()))?;

        let mut raw: *mut c_void = core::ptr::null_mut();
        esp!(unsafe { esp_lcd_rgb_panel_get_frame_buffer(handle, 1, &mut raw as *mut *mut c_void) })
            .map_err(|e| Error::BusInit(e.code()))?;
        if raw.is_null() {
            return Err(Error::BusInit(ESP_ERR_INVALID_STATE));
        }

        // Vendor-owned, process-lifetime DMA memory.
        let frame = unsafe {
            core::slice::from_raw_parts_mut(raw as *mut u8, config.frame_len())
        };

        log::debug!(
            "rgb panel up, {}x{}, pclk {} Hz",
            config.width,
            config.height,
            config.pclk_hz
        );

        RgbFrameBuffer::new(EspRgbPanel { handle }, frame, config.width, config.height)
    }
}
