//! End to end: fixed identity, headless panel, real layout and pacing.

use std::path::Path;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::BinaryColor;
use netmons::display::{DisplayDriver, HeadlessDriver, PanelEvent};
use netmons::identity::{HostIdentity, IdentityError};
use netmons::constants::{SYSTEM_FONT, SYSTEM_FONT_SIZE};
use netmons::layout::{value_column, InfoRenderer, LayoutSpec};
use netmons::monitor::Monitor;
use netmons::typeface::{MonoTypeface, SvgTypeface, Typeface};
use netmons::vframebuf::VarFrameBuf;

struct FixedIdentity {
    mac: Option<&'static str>,
}

impl HostIdentity for FixedIdentity {
    fn hostname(&self) -> Result<String, IdentityError> {
        Ok("pi-zero".to_string())
    }

    fn ip_address(&self) -> Result<String, IdentityError> {
        Ok("192.168.1.42".to_string())
    }

    fn mac_address(&self) -> Result<String, IdentityError> {
        self.mac.map(str::to_string).ok_or_else(|| IdentityError::NoMac {
            iface: "wlan0".to_string(),
            reason: "no such device".to_string(),
        })
    }
}

fn monitor(refresh: Duration, mac: Option<&'static str>) -> Monitor<HeadlessDriver> {
    Monitor::new(
        HeadlessDriver::new(128, 32),
        Box::new(FixedIdentity { mac }),
        InfoRenderer::new(Box::new(MonoTypeface::default()), LayoutSpec::default()),
        "N/A",
        refresh,
    )
}

/// Draw `text` alone at `at` into a blank panel sized frame
fn text_at(x: i32, y: i32, text: &str) -> VarFrameBuf<BinaryColor> {
    let mut fb = VarFrameBuf::mono(128, 32);
    MonoTypeface::default()
        .draw_text(&mut fb, embedded_graphics::prelude::Point::new(x, y), text)
        .unwrap();
    fb
}

#[test]
fn startup_clears_before_first_frame() {
    let mut m = monitor(Duration::from_millis(1), Some("b8:27:eb:11:22:33"));
    m.run_for(2).unwrap();

    let state = m.driver().state();
    let state = state.lock().unwrap();
    let first_frame = state
        .events
        .iter()
        .position(|e| matches!(e, PanelEvent::Frame { .. }))
        .unwrap();
    let first_clear = state
        .events
        .iter()
        .position(|e| matches!(e, PanelEvent::Clear { .. }))
        .unwrap();
    assert!(first_clear < first_frame);
    assert_eq!(state.init_count, 1);
    assert_eq!(state.present_count, 2);
}

#[test]
fn every_frame_is_full_panel_size() {
    let mut m = monitor(Duration::from_millis(1), Some("b8:27:eb:11:22:33"));
    m.run_for(1).unwrap();
    let fb = m.driver().framebuffer();
    assert_eq!((fb.width(), fb.height()), (128, 32));
    assert!(fb.count_on() > 0);
}

#[test]
fn presentations_respect_interval() {
    let interval = Duration::from_millis(60);
    let mut m = monitor(interval, Some("b8:27:eb:11:22:33"));
    m.run_for(3).unwrap();

    let state = m.driver().state();
    let state = state.lock().unwrap();
    let times: Vec<_> = state
        .events
        .iter()
        .filter_map(|e| match e {
            PanelEvent::Frame { at, .. } => Some(*at),
            _ => None,
        })
        .collect();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= interval);
    }
}

#[test]
fn rows_land_at_expected_offsets() {
    let mut m = monitor(Duration::from_millis(1), Some("b8:27:eb:11:22:33"));
    m.run_for(1).unwrap();
    let shown = m.driver().framebuffer().clone();

    // widest label "HOST:" is 30px with the 6x10 font, plus a 5px gutter
    let mut expected = VarFrameBuf::mono(128, 32);
    for (x, y, text) in [
        (0, 0, "HOST:"),
        (35, 0, "pi-zero"),
        (0, 10, "IP:"),
        (35, 10, "192.168.1.42"),
        (0, 20, "MAC:"),
        (35, 20, "b8:27:eb:11:22:33"),
    ] {
        expected.merge(&text_at(x, y, text));
    }
    assert_eq!(shown.as_slice(), expected.as_slice());
}

#[test]
fn failed_field_shows_placeholder() {
    let mut with_mac = monitor(Duration::from_millis(1), Some("b8:27:eb:11:22:33"));
    let mut without = monitor(Duration::from_millis(1), None);
    with_mac.start().unwrap();
    without.start().unwrap();

    assert_eq!(with_mac.tick().unwrap().mac_address, "b8:27:eb:11:22:33");
    let snap = without.tick().unwrap();
    assert_eq!(snap.mac_address, "N/A");
    assert_eq!(snap.hostname, "pi-zero");

    // the MAC row differs, the rows above it do not
    let a = with_mac.driver().framebuffer();
    let b = without.driver().framebuffer();
    for y in 0..20 {
        for x in 0..128 {
            assert_eq!(a.get(x, y), b.get(x, y));
        }
    }
    assert_ne!(a.as_slice(), b.as_slice());
}

#[test]
fn headless_driver_reports_dimensions() {
    let m = monitor(Duration::from_secs(10), None);
    assert_eq!(m.driver().dimensions(), (128, 32));
}

fn runs_in_row(fb: &VarFrameBuf<BinaryColor>, y: u32, x_end: u32) -> usize {
    let mut runs = 0;
    let mut prev = false;
    for x in 0..x_end {
        let on = fb.get(x, y) == Some(BinaryColor::On);
        if on && !prev {
            runs += 1;
        }
        prev = on;
    }
    runs
}

#[test]
fn system_font_frame_places_rows_and_keeps_glyphs() {
    let path = Path::new(SYSTEM_FONT);
    if !path.exists() {
        return;
    }
    let face = SvgTypeface::load(path, SYSTEM_FONT_SIZE).unwrap();
    let labels = ["HOST:", "IP:", "MAC:"].map(String::from);
    let host = face.text_width("HOST:").unwrap();
    let column = value_column(&face, &labels, 5).unwrap();
    assert_eq!(column, host + 5);

    let mut m = Monitor::new(
        HeadlessDriver::new(128, 32),
        Box::new(FixedIdentity { mac: Some("b8:27:eb:11:22:33") }),
        InfoRenderer::new(Box::new(SvgTypeface::load(path, SYSTEM_FONT_SIZE).unwrap()), LayoutSpec::default()),
        "N/A",
        Duration::from_millis(1),
    );
    m.run(true).unwrap();
    let shown = m.driver().framebuffer().clone();

    let column = column as i32;
    let mut labels_only = VarFrameBuf::mono(128, 32);
    let mut expected = VarFrameBuf::mono(128, 32);
    for (y, label, value) in [
        (0, "HOST:", "pi-zero"),
        (10, "IP:", "192.168.1.42"),
        (20, "MAC:", "b8:27:eb:11:22:33"),
    ] {
        face.draw_text(&mut labels_only, embedded_graphics::prelude::Point::new(0, y), label).unwrap();
        face.draw_text(&mut expected, embedded_graphics::prelude::Point::new(column, y), value).unwrap();
    }
    assert!(labels_only.lit_pixels().all(|(x, _)| (x as i32) < column));
    expected.merge(&labels_only);
    assert_eq!(shown.as_slice(), expected.as_slice());

    // the H of HOST: keeps both stems above and below its crossbar
    let h_end = face.text_width("H").unwrap();
    let h_rows: Vec<u32> = shown
        .lit_pixels()
        .filter(|&(x, y)| x < h_end && y < 10)
        .map(|(_, y)| y)
        .collect();
    let top = *h_rows.iter().min().unwrap();
    let bottom = *h_rows.iter().max().unwrap();
    assert!(bottom - top >= 4);
    assert_eq!(runs_in_row(&shown, top + 1, h_end), 2);
    assert_eq!(runs_in_row(&shown, bottom - 1, h_end), 2);
}

#[test]
fn run_once_does_not_wait_for_interval() {
    let mut m = monitor(Duration::from_secs(30), Some("b8:27:eb:11:22:33"));
    let started = Instant::now();
    m.run(true).unwrap();
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(m.driver().state().lock().unwrap().present_count, 1);
}
