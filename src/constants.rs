//! Defaults shared by the config layer, the layout and the drivers.

/// Panel width in pixels (SSD1306 128x32 module).
pub const DISPLAY_WIDTH: u32 = 128;
/// Panel height in pixels.
pub const DISPLAY_HEIGHT: u32 = 32;

/// Default Linux I2C device for the Raspberry Pi header.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
/// SSD1306 7-bit address with SA0 low.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Wireless interface whose hardware address is shown.
pub const DEFAULT_INTERFACE: &str = "wlan0";
/// Shown in place of a field that could not be read.
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

/// Seconds between presentations.
pub const REFRESH_SECS: u64 = 10;
/// Longest accepted refresh interval, one day.
pub const MAX_REFRESH_SECS: u64 = 86_400;

/// Pixels between the widest label and the value column.
pub const LABEL_GUTTER: u32 = 5;
/// Vertical advance per label/value row.
pub const ROW_HEIGHT: u32 = 10;

pub const LABEL_HOST: &str = "HOST:";
pub const LABEL_IP: &str = "IP:";
pub const LABEL_MAC: &str = "MAC:";

/// Bundled pixel font, relative to the executable's directory.
pub const BUNDLED_FONT: &str = "fonts/Minecraftia-Regular.ttf";
pub const BUNDLED_FONT_SIZE: f32 = 8.0;

/// System font used when the bundled one is absent.
pub const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
pub const SYSTEM_FONT_SIZE: f32 = 9.0;
