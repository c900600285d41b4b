/*
 *  display/traits.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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

use embedded_graphics::pixelcolor::BinaryColor;

use crate::display::error::DisplayError;
use crate::vframebuf::VarFrameBuf;

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the display supports hardware rotation
    pub supports_rotation: bool,

    /// Whether the display supports brightness control
    pub supports_brightness: bool,

    /// Whether the display supports inversion
    pub supports_invert: bool,
}

impl DisplayCapabilities {
    /// Plain monochrome panel, every optional control available
    pub fn monochrome(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            supports_rotation: true,
            supports_brightness: true,
            supports_invert: true,
        }
    }
}

/// Minimal hardware abstraction - every 1-bit panel driver implements this
///
/// Frames are always pushed whole. A driver never diffs against the previous
/// frame, `present` overwrites the controller's entire GDDRAM.
pub trait DisplayDriver {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the panel (full-zero frame) and refresh
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Transfer a full frame to the controller and refresh
    ///
    /// The frame must match the panel's native resolution.
    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    fn set_brightness(&mut self, _value: u8) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Set display inversion (if supported)
    fn set_invert(&mut self, _inverted: bool) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Set display rotation (if supported)
    ///
    /// Rotation angle should be 0, 90, 180, or 270 degrees.
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if !self.capabilities().supports_rotation {
            return Err(DisplayError::UnsupportedOperation);
        }
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        Err(DisplayError::UnsupportedOperation)
    }

    /// Reject frames that do not match the panel
    fn check_frame(&self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = (frame.width() as u32, frame.height() as u32);
        if expected != actual {
            return Err(DisplayError::BufferSizeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl<T: DisplayDriver + ?Sized> DisplayDriver for Box<T> {
    fn capabilities(&self) -> &DisplayCapabilities { (**self).capabilities() }
    fn init(&mut self) -> Result<(), DisplayError> { (**self).init() }
    fn clear(&mut self) -> Result<(), DisplayError> { (**self).clear() }
    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        (**self).present(frame)
    }
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> { (**self).set_brightness(value) }
    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> { (**self).set_invert(inverted) }
    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> { (**self).set_rotation(degrees) }
}

/// Optional panel controls applied once the controller is initialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelSettings {
    pub brightness: Option<u8>,
    pub invert: Option<bool>,
    pub rotate_deg: Option<u16>,
}

impl PanelSettings {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        cfg.display
            .as_ref()
            .map(|d| Self {
                brightness: d.brightness,
                invert: d.invert,
                rotate_deg: d.rotate_deg,
            })
            .unwrap_or_default()
    }

    /// Push every configured control to the driver
    pub fn apply<D: DisplayDriver + ?Sized>(&self, driver: &mut D) -> Result<(), DisplayError> {
        if let Some(brightness) = self.brightness {
            driver.set_brightness(brightness)?;
        }
        if let Some(invert) = self.invert {
            driver.set_invert(invert)?;
        }
        if let Some(rotation) = self.rotate_deg {
            driver.set_rotation(rotation)?;
        }
        Ok(())
    }
}
