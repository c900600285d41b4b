/*
 *  display/drivers/headless.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory panel for running without hardware
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
use crate::display::traits::{DisplayCapabilities, DisplayDriver, PanelSettings};
use crate::vframebuf::VarFrameBuf;

use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Headless display driver
///
/// Holds the "panel" contents in memory and records every operation so a
/// run can be inspected afterwards. With a dump path set, each presented
/// frame is also written out as a binary PBM, which any image viewer opens.
#[derive(Debug, Clone)]
pub struct HeadlessDriver {
    /// What the panel currently shows
    framebuffer: VarFrameBuf<BinaryColor>,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Controls applied on init
    settings: PanelSettings,

    /// PBM file rewritten on every frame
    dump: Option<PathBuf>,

    /// Shared state for inspection
    state: Arc<Mutex<HeadlessState>>,
}

/// Something the panel was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Init,
    /// full-zero frame
    Clear { at: Instant },
    /// content frame with this many lit pixels
    Frame { at: Instant, lit: usize },
}

/// Operation log shared between the driver and whoever inspects it
#[derive(Debug, Default)]
pub struct HeadlessState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Number of frames presented (clears excluded)
    pub present_count: usize,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// Last rotation set
    pub last_rotation: Option<u16>,

    /// Last invert state set
    pub last_invert: Option<bool>,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Every call in order
    pub events: Vec<PanelEvent>,

    /// Simulate failures (for error testing)
    pub simulate_present_failure: bool,
    pub simulate_init_failure: bool,
}

impl HeadlessDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: VarFrameBuf::mono(width, height),
            capabilities: DisplayCapabilities::monochrome(width, height),
            settings: PanelSettings::default(),
            dump: None,
            state: Arc::new(Mutex::new(HeadlessState::default())),
        }
    }

    pub fn with_settings(mut self, settings: PanelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_dump(mut self, path: Option<&Path>) -> Self {
        self.dump = path.map(Path::to_path_buf);
        self
    }

    /// Snapshot of what the panel shows
    pub fn framebuffer(&self) -> &VarFrameBuf<BinaryColor> {
        &self.framebuffer
    }

    /// Get reference to state for inspection
    pub fn state(&self) -> Arc<Mutex<HeadlessState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        // a panicked inspector must not take the panel down with it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the current panel contents as a binary (P4) PBM
    pub fn save_to_pbm(&self, path: &Path) -> std::io::Result<()> {
        // write beside the target then rename so viewers never see half a frame
        let tmp = path.with_extension("pbm.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            write!(file, "P4\n{} {}\n", self.capabilities.width, self.capabilities.height)?;
            file.write_all(&self.framebuffer.to_packed_rows())?;
        }
        fs::rename(&tmp, path)
    }

    fn show(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        self.framebuffer = frame.clone();
        if let Some(path) = self.dump.as_ref() {
            self.save_to_pbm(path)?;
            debug!("frame written to {}", path.display());
        }
        Ok(())
    }
}

impl DisplayDriver for HeadlessDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock();
            if state.simulate_init_failure {
                return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
            }
            state.init_count += 1;
            state.is_initialized = true;
            state.events.push(PanelEvent::Init);
        } // Release lock before the settings call back into us

        let settings = self.settings;
        settings.apply(self)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock();
            state.clear_count += 1;
            state.events.push(PanelEvent::Clear { at: Instant::now() });
        }
        let blank = VarFrameBuf::mono(self.capabilities.width, self.capabilities.height);
        self.show(&blank)
    }

    fn present(&mut self, frame: &VarFrameBuf<BinaryColor>) -> Result<(), DisplayError> {
        self.check_frame(frame)?;
        {
            let mut state = self.lock();
            if state.simulate_present_failure {
                return Err(DisplayError::I2cError("Simulated bus failure".to_string()));
            }
            state.present_count += 1;
            state.events.push(PanelEvent::Frame { at: Instant::now(), lit: frame.count_on() });
        }
        self.show(frame)
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.lock().last_brightness = Some(value);
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.lock().last_invert = Some(inverted);
        Ok(())
    }

    fn set_rotation(&mut self, degrees: u16) -> Result<(), DisplayError> {
        if degrees != 0 && degrees != 90 && degrees != 180 && degrees != 270 {
            return Err(DisplayError::InvalidRotation(degrees));
        }
        self.lock().last_rotation = Some(degrees);
        Ok(())
    }
}
