/*
 *  typeface.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Font discovery, metrics and 1-bit text rasterization
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

//! TrueType text goes through usvg: the face is loaded into a private font
//! database, each string becomes an SVG `<text>` element, resvg paints it
//! anti-aliased into an RGBA pixmap and any pixel with a quarter coverage or
//! more is lit. At 8-9 px most stems are under a pixel wide and straddle
//! pixel edges; an aliased fill or a half-coverage cut drops them.
//! When no font file can be found the embedded-graphics 6x10 mono font is
//! used instead.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::{debug, info, warn};
use resvg::render;
use usvg::{
    fontdb::Database,
    Options as UsvgOptions,
    ShapeRendering,
    TextRendering,
    Transform,
    Tree,
};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::constants::{BUNDLED_FONT, BUNDLED_FONT_SIZE, SYSTEM_FONT, SYSTEM_FONT_SIZE};
use crate::vframebuf::VarFrameBuf;

/// Alpha at or above this lights the pixel. Any stem at least half a pixel
/// wide leaves one pixel with a quarter coverage.
const ALPHA_THRESHOLD: u8 = 56;
/// Canvas used when only measuring, wide enough for any single row
const MEASURE_CANVAS: u32 = 2048;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font file not found: {0}")]
    NotFound(PathBuf),
    #[error("cannot load font {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("font {0} has no usable face")]
    NoFace(PathBuf),
    #[error("text layout failed: {0}")]
    Layout(String),
    #[error("cannot allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),
}

/// A font able to measure and draw a single line of text.
pub trait Typeface {
    /// Human readable description for logs
    fn describe(&self) -> String;

    /// Rendered width in pixels, measured from the draw origin to the right edge
    fn text_width(&self, text: &str) -> Result<u32, FontError>;

    /// Draw `text` with its top-left corner at `origin`, clipping at the frame edge
    fn draw_text(
        &self,
        target: &mut VarFrameBuf<BinaryColor>,
        origin: Point,
        text: &str,
    ) -> Result<(), FontError>;
}

/// embedded-graphics bitmap font, always available
#[derive(Clone, Copy)]
pub struct MonoTypeface {
    font: &'static MonoFont<'static>,
}

impl MonoTypeface {
    pub fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    fn style(&self) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(self.font, BinaryColor::On)
    }
}

impl Default for MonoTypeface {
    fn default() -> Self {
        Self::new(&FONT_6X10)
    }
}

impl fmt::Debug for MonoTypeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonoTypeface({}x{})", self.font.character_size.width, self.font.character_size.height)
    }
}

impl Typeface for MonoTypeface {
    fn describe(&self) -> String {
        format!("built-in {}x{} mono", self.font.character_size.width, self.font.character_size.height)
    }

    fn text_width(&self, text: &str) -> Result<u32, FontError> {
        if text.is_empty() {
            return Ok(0);
        }
        let bbox = Text::with_baseline(text, Point::zero(), self.style(), Baseline::Top).bounding_box();
        Ok(bbox.size.width)
    }

    fn draw_text(
        &self,
        target: &mut VarFrameBuf<BinaryColor>,
        origin: Point,
        text: &str,
    ) -> Result<(), FontError> {
        Text::with_baseline(text, origin, self.style(), Baseline::Top)
            .draw(target)
            .ok();
        Ok(())
    }
}

/// TrueType/OpenType face rasterized through usvg + resvg
pub struct SvgTypeface {
    path: PathBuf,
    family: String,
    size: f32,
    options: UsvgOptions<'static>,
}

impl fmt::Debug for SvgTypeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgTypeface")
            .field("path", &self.path)
            .field("family", &self.family)
            .field("size", &self.size)
            .finish()
    }
}

impl SvgTypeface {
    pub fn load(path: &Path, size: f32) -> Result<Self, FontError> {
        if !path.exists() {
            return Err(FontError::NotFound(path.to_path_buf()));
        }
        let data = fs::read(path).map_err(|e| FontError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut db = Database::new();
        db.load_font_data(data);
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| FontError::NoFace(path.to_path_buf()))?;

        let mut options = UsvgOptions::default();
        options.font_family = family.clone();
        options.font_size = size;
        // coverage is needed for the threshold, OptimizeSpeed would disable anti-aliasing
        options.shape_rendering = ShapeRendering::GeometricPrecision;
        options.text_rendering = TextRendering::GeometricPrecision;
        options.fontdb = Arc::new(db);

        debug!("loaded font family '{}' from {}", family, path.display());
        Ok(Self { path: path.to_path_buf(), family, size, options })
    }

    fn document(&self, width: u32, height: u32, origin: Point, text: &str) -> String {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{x}" y="{y}" font-family="{family}" font-size="{size}" fill="white" text-rendering="geometricPrecision" dominant-baseline="text-before-edge" xml:space="preserve">{text}</text></svg>"##,
            w = width,
            h = height,
            x = origin.x,
            y = origin.y,
            family = xml_escape(&self.family),
            size = self.size,
            text = xml_escape(text),
        )
    }

    fn parse(&self, width: u32, height: u32, origin: Point, text: &str) -> Result<Tree, FontError> {
        let svg = self.document(width, height, origin, text);
        Tree::from_str(&svg, &self.options).map_err(|e| FontError::Layout(format!("{:?}", e)))
    }
}

impl Typeface for SvgTypeface {
    fn describe(&self) -> String {
        format!("{} {}px ({})", self.family, self.size, self.path.display())
    }

    fn text_width(&self, text: &str) -> Result<u32, FontError> {
        if text.trim().is_empty() {
            return Ok(0);
        }
        let tree = self.parse(MEASURE_CANVAS, MEASURE_CANVAS, Point::zero(), text)?;
        let right = tree.root().abs_bounding_box().right();
        Ok(right.max(0.0).ceil() as u32)
    }

    fn draw_text(
        &self,
        target: &mut VarFrameBuf<BinaryColor>,
        origin: Point,
        text: &str,
    ) -> Result<(), FontError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let (w, h) = (target.width() as u32, target.height() as u32);
        let tree = self.parse(w, h, origin, text)?;
        let mut pixmap = Pixmap::new(w, h).ok_or(FontError::Pixmap(w, h))?;
        render(&tree, Transform::default(), &mut pixmap.as_mut());

        let lit = pixmap
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alpha() >= ALPHA_THRESHOLD)
            .map(|(i, _)| {
                let (x, y) = (i as u32 % w, i as u32 / w);
                Pixel(Point::new(x as i32, y as i32), BinaryColor::On)
            });
        target.draw_iter(lit).ok();
        Ok(())
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// The font the renderer will use.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    File { path: PathBuf, size: f32 },
    Builtin,
}

/// Candidate font locations, first existing one wins.
#[derive(Debug, Clone)]
pub struct FontSearch {
    /// user supplied, must exist
    pub explicit: Option<PathBuf>,
    /// shipped next to the executable
    pub bundled: Option<PathBuf>,
    pub system: PathBuf,
    /// overrides the per-location default size
    pub size: Option<f32>,
}

impl FontSearch {
    pub fn new(explicit: Option<&Path>, size: Option<f32>) -> Self {
        let bundled = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLED_FONT)));
        Self {
            explicit: explicit.map(Path::to_path_buf),
            bundled,
            system: PathBuf::from(SYSTEM_FONT),
            size,
        }
    }

    pub fn resolve(&self) -> Result<FontSource, FontError> {
        if let Some(path) = self.explicit.as_ref() {
            if !path.exists() {
                return Err(FontError::NotFound(path.clone()));
            }
            return Ok(FontSource::File {
                path: path.clone(),
                size: self.size.unwrap_or(BUNDLED_FONT_SIZE),
            });
        }
        if let Some(path) = self.bundled.as_ref().filter(|p| p.exists()) {
            return Ok(FontSource::File {
                path: path.clone(),
                size: self.size.unwrap_or(BUNDLED_FONT_SIZE),
            });
        }
        if self.system.exists() {
            debug!("bundled font absent, using {}", self.system.display());
            return Ok(FontSource::File {
                path: self.system.clone(),
                size: self.size.unwrap_or(SYSTEM_FONT_SIZE),
            });
        }
        warn!("no font file found (bundled {:?}, system {}), using built-in mono font",
            self.bundled, self.system.display());
        Ok(FontSource::Builtin)
    }
}

pub fn load_typeface(source: &FontSource) -> Result<Box<dyn Typeface>, FontError> {
    let face: Box<dyn Typeface> = match source {
        FontSource::File { path, size } => Box::new(SvgTypeface::load(path, *size)?),
        FontSource::Builtin => Box::new(MonoTypeface::default()),
    };
    info!("font: {}", face.describe());
    Ok(face)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("netmons-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_mono_width_is_cell_multiple() {
        let face = MonoTypeface::default();
        assert_eq!(face.text_width("HOST:").unwrap(), 30);
        assert_eq!(face.text_width("IP:").unwrap(), 18);
        assert_eq!(face.text_width("").unwrap(), 0);
    }

    #[test]
    fn test_mono_draws_from_top_left() {
        let face = MonoTypeface::default();
        let mut fb = VarFrameBuf::mono(128, 32);
        face.draw_text(&mut fb, Point::new(0, 10), "M").unwrap();
        assert!(fb.count_on() > 0);
        for (x, y) in fb.lit_pixels() {
            assert!(x < 6);
            assert!((10..20).contains(&y));
        }
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    }

    #[test]
    fn test_missing_bundled_falls_back_to_system() {
        let system = temp_path("system.ttf");
        fs::write(&system, b"not really a font").unwrap();
        let search = FontSearch {
            explicit: None,
            bundled: Some(temp_path("absent.ttf")),
            system: system.clone(),
            size: None,
        };
        assert_eq!(
            search.resolve().unwrap(),
            FontSource::File { path: system.clone(), size: SYSTEM_FONT_SIZE }
        );
        fs::remove_file(system).ok();
    }

    #[test]
    fn test_bundled_preferred_when_present() {
        let bundled = temp_path("bundled.ttf");
        fs::write(&bundled, b"x").unwrap();
        let search = FontSearch {
            explicit: None,
            bundled: Some(bundled.clone()),
            system: temp_path("absent-system.ttf"),
            size: None,
        };
        assert_eq!(
            search.resolve().unwrap(),
            FontSource::File { path: bundled.clone(), size: BUNDLED_FONT_SIZE }
        );
        fs::remove_file(bundled).ok();
    }

    #[test]
    fn test_nothing_found_uses_builtin() {
        let search = FontSearch {
            explicit: None,
            bundled: None,
            system: temp_path("nope.ttf"),
            size: Some(12.0),
        };
        assert_eq!(search.resolve().unwrap(), FontSource::Builtin);
    }

    #[test]
    fn test_explicit_font_must_exist() {
        let search = FontSearch {
            explicit: Some(temp_path("explicit.ttf")),
            bundled: None,
            system: PathBuf::from(SYSTEM_FONT),
            size: None,
        };
        assert!(matches!(search.resolve(), Err(FontError::NotFound(_))));
    }

    #[test]
    fn test_garbage_font_file_is_rejected() {
        let bogus = temp_path("bogus.ttf");
        fs::write(&bogus, b"definitely not sfnt").unwrap();
        assert!(matches!(SvgTypeface::load(&bogus, 8.0), Err(FontError::NoFace(_))));
        fs::remove_file(bogus).ok();
    }

    /// Separate lit runs along row `y`
    fn runs_in_row(fb: &VarFrameBuf<BinaryColor>, y: u32) -> usize {
        let mut runs = 0;
        let mut prev = false;
        for x in 0..fb.width() as u32 {
            let on = fb.get(x, y) == Some(BinaryColor::On);
            if on && !prev {
                runs += 1;
            }
            prev = on;
        }
        runs
    }

    /// 8-connected groups of lit pixels
    fn components(fb: &VarFrameBuf<BinaryColor>) -> usize {
        let (w, h) = (fb.width() as i32, fb.height() as i32);
        let mut seen = vec![false; (w * h) as usize];
        let mut count = 0;
        for (x, y) in fb.lit_pixels() {
            let start = (y as i32 * w + x as i32) as usize;
            if seen[start] {
                continue;
            }
            count += 1;
            seen[start] = true;
            let mut stack = vec![(x as i32, y as i32)];
            while let Some((cx, cy)) = stack.pop() {
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (cx + dx, cy + dy);
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let i = (ny * w + nx) as usize;
                        if !seen[i] && fb.get(nx as u32, ny as u32) == Some(BinaryColor::On) {
                            seen[i] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
        count
    }

    fn system_face() -> Option<SvgTypeface> {
        let path = Path::new(SYSTEM_FONT);
        path.exists().then(|| SvgTypeface::load(path, SYSTEM_FONT_SIZE).unwrap())
    }

    #[test]
    fn test_system_font_keeps_both_stems_of_h() {
        let Some(face) = system_face() else { return };
        let mut fb = VarFrameBuf::mono(32, 16);
        face.draw_text(&mut fb, Point::zero(), "H").unwrap();

        let top = fb.lit_pixels().map(|(_, y)| y).min().unwrap();
        let bottom = fb.lit_pixels().map(|(_, y)| y).max().unwrap();
        assert!(bottom - top >= 4, "H is only {} rows tall", bottom - top + 1);
        // above and below the crossbar only the two stems are lit
        assert_eq!(runs_in_row(&fb, top + 1), 2);
        assert_eq!(runs_in_row(&fb, bottom - 1), 2);
    }

    #[test]
    fn test_system_font_round_glyph_is_closed() {
        let Some(face) = system_face() else { return };
        let mut fb = VarFrameBuf::mono(32, 16);
        face.draw_text(&mut fb, Point::zero(), "O").unwrap();
        assert_eq!(components(&fb), 1);
    }

    #[test]
    fn test_system_font_measures_and_draws() {
        let path = Path::new(SYSTEM_FONT);
        if !path.exists() {
            return;
        }
        let face = SvgTypeface::load(path, SYSTEM_FONT_SIZE).unwrap();
        let host = face.text_width("HOST:").unwrap();
        let ip = face.text_width("IP:").unwrap();
        assert!(host > ip && ip > 0);

        let mut fb = VarFrameBuf::mono(128, 32);
        face.draw_text(&mut fb, Point::new(0, 10), "HOST:").unwrap();
        assert!(fb.count_on() > 0);
        assert!(fb.lit_pixels().all(|(x, y)| x <= host && y >= 10 && y < 22));
    }
}
