/*
 *  display/factory.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Picks and builds the panel driver from configuration
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

use crate::config::{BusConfig, Config, DriverKind};
use crate::display::drivers::headless::HeadlessDriver;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::{DisplayDriver, PanelSettings};
use log::info;

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from the merged configuration
    ///
    /// The driver is constructed but not initialized, callers run `init`
    /// so a bus that opens but does not answer is reported there.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let cfg = config::load(&cli)?;
    /// let mut driver = DisplayDriverFactory::create_from_config(&cfg)?;
    /// driver.init()?;
    /// ```
    pub fn create_from_config(cfg: &Config) -> Result<BoxedDriver, DisplayFactoryError> {
        let settings = PanelSettings::from_config(cfg);
        let (width, height) = (cfg.width(), cfg.height());

        match cfg.driver() {
            DriverKind::Headless => {
                info!("Headless panel {}x{}", width, height);
                if let Some(path) = cfg.frame_dump() {
                    info!("Frames will be written to {}", path.display());
                }
                Ok(Box::new(
                    HeadlessDriver::new(width, height)
                        .with_settings(settings)
                        .with_dump(cfg.frame_dump()),
                ))
            }
            DriverKind::Ssd1306 => Self::create_ssd1306(cfg.bus(), width, height, settings),
        }
    }

    #[cfg(feature = "driver-ssd1306")]
    fn create_ssd1306(
        bus: BusConfig,
        width: u32,
        height: u32,
        settings: PanelSettings,
    ) -> Result<BoxedDriver, DisplayFactoryError> {
        let BusConfig::I2c { bus, address } = bus;
        Ok(Box::new(Ssd1306Driver::new_i2c(&bus, address, width, height, settings)?))
    }

    #[cfg(not(feature = "driver-ssd1306"))]
    fn create_ssd1306(
        _bus: BusConfig,
        _width: u32,
        _height: u32,
        _settings: PanelSettings,
    ) -> Result<BoxedDriver, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverNotEnabled("driver-ssd1306"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;

    fn headless(dump: Option<&str>) -> Config {
        Config {
            display: Some(DisplayConfig {
                driver: Some(DriverKind::Headless),
                width: Some(128),
                height: Some(64),
                brightness: Some(10),
                frame_dump: dump.map(Into::into),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_headless_from_config() {
        let mut driver = DisplayDriverFactory::create_from_config(&headless(None)).unwrap();
        assert_eq!(driver.dimensions(), (128, 64));
        driver.init().unwrap();
    }

    #[test]
    fn test_ssd1306_missing_bus() {
        let cfg = Config {
            display: Some(DisplayConfig {
                driver: Some(DriverKind::Ssd1306),
                bus: Some(BusConfig::I2c { bus: "/dev/i2c-not-here".into(), address: 0x3C }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(DisplayDriverFactory::create_from_config(&cfg).is_err());
    }
}
