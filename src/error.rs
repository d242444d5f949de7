//! Error types shared by all bus drivers

/// Number of GPIOs expected in the red pin group of an RGB panel (RGB565)
pub const RGB_RED_PINS: usize = 5;

/// Number of GPIOs expected in the green pin group of an RGB panel (RGB565)
pub const RGB_GREEN_PINS: usize = 6;

/// Number of GPIOs expected in the blue pin group of an RGB panel (RGB565)
pub const RGB_BLUE_PINS: usize = 5;

/// Errors reported by bus construction, configuration validation and
/// transfer dispatch.
///
/// Vendor driver status codes are carried verbatim in [`Error::BusInit`] and
/// [`Error::Io`]; they are never discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An RGB pin group does not have its fixed length (5 red, 6 green, 5 blue)
    InvalidPinCount {
        /// Pin group name (`"red"`, `"green"` or `"blue"`)
        group: &'static str,
        /// Required group length
        expected: usize,
        /// Length actually supplied
        found: usize,
    },
    /// i80 bus width is not 8 or 16, or the data pin list does not match it
    InvalidBusWidth(usize),
    /// A required pin was left unassigned (`-1`)
    MissingPin(&'static str),
    /// Byte-swap buffer does not hold a whole number of 16-bit elements
    OddBufferLength(usize),
    /// Panel resolution has a zero dimension
    InvalidResolution {
        /// Horizontal resolution in pixels
        width: u32,
        /// Vertical resolution in pixels
        height: u32,
    },
    /// Pixel buffer length does not match the panel dimensions
    BufferLength {
        /// Required buffer length in bytes
        expected: usize,
        /// Length actually supplied
        found: usize,
    },
    /// Vendor driver returned non-success while claiming the bus or panel.
    ///
    /// The hardware peripheral may remain claimed; a power cycle can be
    /// required before the bus is usable again.
    BusInit(i32),
    /// Vendor driver rejected a parameter or color transfer
    Io(i32),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPinCount {
                group,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{group} pin group must have {expected} pins, found {found}"
                )
            }
            Self::InvalidBusWidth(width) => {
                write!(f, "i80 bus width must be 8 or 16 with a matching data pin list, found {width}")
            }
            Self::MissingPin(name) => write!(f, "{name} pin must be assigned"),
            Self::InvalidResolution { width, height } => {
                write!(f, "panel resolution must be non-zero, found {width}x{height}")
            }
            Self::OddBufferLength(len) => {
                write!(f, "buffer length must be even (16-bit aligned), found {len}")
            }
            Self::BufferLength { expected, found } => {
                write!(
                    f,
                    "pixel buffer must be {expected} bytes, found {found}"
                )
            }
            Self::BusInit(code) => {
                write!(
                    f,
                    "vendor driver failed to create the bus (status {code}); the peripheral may stay claimed until the board is power-cycled"
                )
            }
            Self::Io(code) => write!(f, "vendor driver rejected the transfer (status {code})"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(target_os = "espidf")]
impl From<esp_idf_sys::EspError> for Error {
    fn from(e: esp_idf_sys::EspError) -> Self {
        Self::Io(e.code())
    }
}
