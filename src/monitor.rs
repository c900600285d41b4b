/*
 *  monitor.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Poll, render, present, repeat
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

use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::display::{DisplayDriver, DisplayError};
use crate::identity::{HostIdentity, IdentitySnapshot};
use crate::layout::{InfoRenderer, InfoRows, LayoutError};
use crate::pacer::Pacer;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("display: {0}")]
    Display(#[from] DisplayError),
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
}

/// Owns everything one refresh needs; nothing is shared or global.
pub struct Monitor<D: DisplayDriver> {
    driver: D,
    identity: Box<dyn HostIdentity>,
    renderer: InfoRenderer,
    placeholder: String,
    refresh: Duration,
}

impl<D: DisplayDriver> Monitor<D> {
    pub fn new(
        driver: D,
        identity: Box<dyn HostIdentity>,
        renderer: InfoRenderer,
        placeholder: &str,
        refresh: Duration,
    ) -> Self {
        Self {
            driver,
            identity,
            renderer,
            placeholder: placeholder.to_string(),
            refresh,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Bring the panel up and blank it before any content is shown
    pub fn start(&mut self) -> Result<(), MonitorError> {
        self.driver.init()?;
        self.driver.clear()?;
        let (w, h) = self.driver.dimensions();
        info!("Display ready {}x{}, font {}", w, h, self.renderer.typeface().describe());
        Ok(())
    }

    /// One poll: read identity, lay it out, push the whole frame
    pub fn tick(&mut self) -> Result<IdentitySnapshot, MonitorError> {
        let snapshot = IdentitySnapshot::read(self.identity.as_ref(), &self.placeholder);
        debug!("host={} ip={} mac={}", snapshot.hostname, snapshot.ip_address, snapshot.mac_address);

        let frame = self.renderer.render(&InfoRows::identity(&snapshot))?;
        self.driver.present(&frame)?;
        Ok(snapshot)
    }

    /// `start`, then tick every `refresh` until an error; `once` stops after the first frame
    pub fn run(&mut self, once: bool) -> Result<(), MonitorError> {
        if !once {
            info!("Refreshing every {:?}", self.refresh);
        }
        self.paced(once.then_some(1))
    }

    /// Like `run` but stops after `ticks` frames
    pub fn run_for(&mut self, ticks: usize) -> Result<(), MonitorError> {
        if ticks == 0 {
            return self.start();
        }
        self.paced(Some(ticks))
    }

    /// The one loop behind `run` and `run_for`: the interval starts once a
    /// frame is on the panel, so presentations are never closer than `refresh`.
    fn paced(&mut self, limit: Option<usize>) -> Result<(), MonitorError> {
        self.start()?;
        let mut pacer = Pacer::new(self.refresh);
        let mut shown = 0usize;
        loop {
            self.tick()?;
            pacer.mark();
            shown += 1;
            if limit.is_some_and(|n| shown >= n) {
                return Ok(());
            }
            pacer.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessDriver, PanelEvent};
    use crate::identity::IdentityError;
    use crate::layout::LayoutSpec;
    use crate::typeface::MonoTypeface;

    struct Fixed;

    impl HostIdentity for Fixed {
        fn hostname(&self) -> Result<String, IdentityError> { Ok("pi-zero".into()) }
        fn ip_address(&self) -> Result<String, IdentityError> {
            Err(IdentityError::NoAddress("offline".into()))
        }
        fn mac_address(&self) -> Result<String, IdentityError> { Ok("b8:27:eb:11:22:33".into()) }
    }

    fn monitor(refresh: Duration) -> Monitor<HeadlessDriver> {
        Monitor::new(
            HeadlessDriver::new(128, 32),
            Box::new(Fixed),
            InfoRenderer::new(Box::new(MonoTypeface::default()), LayoutSpec::default()),
            "N/A",
            refresh,
        )
    }

    #[test]
    fn test_start_clears_before_content() {
        let mut m = monitor(Duration::from_secs(10));
        m.run(true).unwrap();
        let state = m.driver().state();
        let state = state.lock().unwrap();
        assert!(matches!(state.events[0], PanelEvent::Init));
        assert!(matches!(state.events[1], PanelEvent::Clear { .. }));
        assert!(matches!(state.events[2], PanelEvent::Frame { lit, .. } if lit > 0));
        assert_eq!(state.events.len(), 3);
    }

    #[test]
    fn test_tick_substitutes_placeholder() {
        let mut m = monitor(Duration::from_secs(10));
        m.start().unwrap();
        let snap = m.tick().unwrap();
        assert_eq!(snap.hostname, "pi-zero");
        assert_eq!(snap.ip_address, "N/A");
    }

    #[test]
    fn test_frames_spaced_by_refresh() {
        let refresh = Duration::from_millis(30);
        let mut m = monitor(refresh);
        m.run_for(3).unwrap();
        let state = m.driver().state();
        let state = state.lock().unwrap();
        let at: Vec<_> = state
            .events
            .iter()
            .filter_map(|e| match e {
                PanelEvent::Frame { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(at.len(), 3);
        assert!(at.windows(2).all(|w| w[1].duration_since(w[0]) >= refresh));
    }

    #[test]
    fn test_run_for_zero_only_starts() {
        let mut m = monitor(Duration::from_secs(10));
        m.run_for(0).unwrap();
        let state = m.driver().state();
        let state = state.lock().unwrap();
        assert_eq!(state.clear_count, 1);
        assert_eq!(state.present_count, 0);
    }

    #[test]
    fn test_present_failure_propagates() {
        let mut m = monitor(Duration::from_secs(10));
        m.start().unwrap();
        m.driver().state().lock().unwrap().simulate_present_failure = true;
        assert!(matches!(m.tick(), Err(MonitorError::Display(DisplayError::I2cError(_)))));
    }
}
