/*
 *  display/drivers/ssd1306.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED display driver over Linux I2C
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize, DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::pixelcolor::BinaryColor;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver, PanelSettings};
use crate::vframebuf::VarFrameBuf;

use log::{debug, info};

type Panel<S> = Ssd1306<I2CInterface<I2cdev>, S, BufferedGraphicsMode<S>>;

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(Panel<DisplaySize128x64>),
    Size128x32(Panel<DisplaySize128x32>),
}

/// SSD1306 display driver wrapper
pub struct Ssd1306Driver {
    /// The underlying ssd1306 driver
    display: Ssd1306Variants,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Controls applied after every init
    settings: PanelSettings,
}

impl Ssd1306Driver {
    /// Create a new SSD1306 driver using I2C
    ///
    /// # Arguments
    ///
    /// * `i2c_bus_path` - Path to I2C device (e.g., "/dev/i2c-1")
    /// * `address` - I2C address (typically 0x3C or 0x3D)
    /// * `width`, `height` - panel geometry, 128x32 or 128x64
    /// * `settings` - brightness/invert/rotation pushed during `init`
    ///
    /// The bus is opened here, the controller is not touched until `init`.
    pub fn new_i2c(
        i2c_bus_path: &str,
        address: u8,
        width: u32,
        height: u32,
        settings: PanelSettings,
    ) -> Result<Self, DisplayError> {
        info!("Opening SSD1306 on {} at address 0x{:02X}", i2c_bus_path, address);

        let i2c = I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let display = match (width, height) {
            (128, 64) => Ssd1306Variants::Size128x64(
                Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            (128, 32) => Ssd1306Variants::Size128x32(
                Ssd1306::new(interface, DisplaySize128x32, DisplayRotation::Rotate0)
                    .into_buffered_graphics_mode(),
            ),
            _ => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", width, height)
                ));
            }
        };

        Ok(Self {
            display,
            capabilities: DisplayCapabilities::monochrome(width, height),
            settings,
        })
    }
}

fn init_panel<S: DisplaySize>(panel: &mut Panel<S>) -> Result<(), DisplayError> {
    panel.init()
        .map_err(|e| DisplayError::InitializationFailed(format!("{:?}", e)))
}

/// Copy the whole frame into the controller buffer and flush every page
fn blit<S: DisplaySize>(panel: &mut Panel<S>, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
    panel.clear_buffer();
    for (x, y) in frame.lit_pixels() {
        panel.set_pixel(x, y, true);
    }
    panel.flush()?;
    Ok(())
}

fn brightness_level(value: u8) -> Brightness {
    match value {
        0..=63 => Brightness::DIMMEST,
        64..=127 => Brightness::DIM,
        128..=191 => Brightness::NORMAL,
        _ => Brightness::BRIGHTEST,
    }
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => init_panel(display)?,
            Ssd1306Variants::Size128x32(display) => init_panel(display)?,
        }
        let settings = self.settings;
        settings.apply(self)?;
        info!("SSD1306 initialized ({}x{})", self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let blank = VarFrameBuf::mono(self.capabilities.width, self.capabilities.height);
        self.present(&blank)
    }

    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => blit(display, frame)?,
            Ssd1306Variants::Size128x32(display) => blit(display, frame)?,
        }
        debug!("SSD1306 frame flushed");
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let brightness = brightness_level(value);
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_brightness(brightness)?,
            Ssd1306Variants::Size128x32(display) => display.set_brightness(brightness)?,
        }
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_invert(inverted)?,
            Ssd1306Variants::Size128x32(display) => display.set_invert(inverted)?,
        }
        Ok(())
    }

    /// Only landscape orientations, frames are always laid out width x height
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        let rotation = match degrees {
            0 => DisplayRotation::Rotate0,
            180 => DisplayRotation::Rotate180,
            90 | 270 => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("{} degree rotation would turn the panel portrait", degrees)
                ));
            }
            _ => return Err(DisplayError::InvalidRotation(degrees)),
        };

        match &mut self.display {
            Ssd1306Variants::Size128x64(display) => display.set_rotation(rotation)?,
            Ssd1306Variants::Size128x32(display) => display.set_rotation(rotation)?,
        }
        Ok(())
    }
}
