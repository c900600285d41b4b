/*
 *  layout.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Label/value rows laid out into a panel sized 1-bit frame
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
use embedded_graphics::prelude::Point;
use log::debug;
use thiserror::Error;

use crate::config::Config;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, LABEL_GUTTER, LABEL_HOST, LABEL_IP, LABEL_MAC, ROW_HEIGHT};
use crate::identity::IdentitySnapshot;
use crate::typeface::{FontError, Typeface};
use crate::vframebuf::VarFrameBuf;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("{labels} labels but {values} values")]
    LengthMismatch { labels: usize, values: usize },
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Parallel label and value columns, always the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRows {
    labels: Vec<String>,
    values: Vec<String>,
}

impl InfoRows {
    pub fn new(labels: Vec<String>, values: Vec<String>) -> Result<Self, LayoutError> {
        if labels.len() != values.len() {
            return Err(LayoutError::LengthMismatch { labels: labels.len(), values: values.len() });
        }
        Ok(Self { labels, values })
    }

    /// HOST / IP / MAC rows for one poll
    pub fn identity(snapshot: &IdentitySnapshot) -> Self {
        Self {
            labels: vec![LABEL_HOST.to_string(), LABEL_IP.to_string(), LABEL_MAC.to_string()],
            values: vec![
                snapshot.hostname.clone(),
                snapshot.ip_address.clone(),
                snapshot.mac_address.clone(),
            ],
        }
    }

    pub fn labels(&self) -> &[String] { &self.labels }
    pub fn values(&self) -> &[String] { &self.values }
    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter().map(String::as_str))
    }
}

/// Frame geometry and spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    pub width: u32,
    pub height: u32,
    /// pixels between the widest label and the values
    pub gutter: u32,
    pub row_height: u32,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
            gutter: LABEL_GUTTER,
            row_height: ROW_HEIGHT,
        }
    }
}

impl LayoutSpec {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            width: cfg.width(),
            height: cfg.height(),
            gutter: cfg.gutter(),
            row_height: cfg.row_height(),
        }
    }
}

/// Where one row's label and value are drawn (top-left anchors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub label: Point,
    pub value: Point,
}

/// x of the value column: widest label plus the gutter, values never move it
pub fn value_column(face: &dyn Typeface, labels: &[String], gutter: u32) -> Result<u32, FontError> {
    let mut widest = 0;
    for label in labels {
        widest = widest.max(face.text_width(label)?);
    }
    Ok(widest.saturating_add(gutter))
}

/// y of each row, starting at 0; offsets past `i32::MAX` stay there
pub fn row_offsets(rows: usize, row_height: u32) -> Vec<i32> {
    (0..rows)
        .map(|i| {
            let y = u32::try_from(i).unwrap_or(u32::MAX).saturating_mul(row_height);
            to_coord(y)
        })
        .collect()
}

fn to_coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

pub fn place(rows: &InfoRows, face: &dyn Typeface, spec: &LayoutSpec) -> Result<Vec<Placement>, LayoutError> {
    let column = to_coord(value_column(face, rows.labels(), spec.gutter)?);
    Ok(row_offsets(rows.len(), spec.row_height)
        .into_iter()
        .map(|y| Placement { label: Point::new(0, y), value: Point::new(column, y) })
        .collect())
}

/// Owns the font and geometry, turns rows into frames.
pub struct InfoRenderer {
    face: Box<dyn Typeface>,
    spec: LayoutSpec,
}

impl InfoRenderer {
    pub fn new(face: Box<dyn Typeface>, spec: LayoutSpec) -> Self {
        Self { face, spec }
    }

    pub fn typeface(&self) -> &dyn Typeface { self.face.as_ref() }

    /// Fresh frame of exactly `width x height`; text running past the edge is clipped.
    pub fn render(&self, rows: &InfoRows) -> Result<VarFrameBuf<BinaryColor>, LayoutError> {
        let mut frame = VarFrameBuf::mono(self.spec.width, self.spec.height);
        let placements = place(rows, self.face.as_ref(), &self.spec)?;
        for ((label, value), at) in rows.iter().zip(placements) {
            self.face.draw_text(&mut frame, at.label, label)?;
            self.face.draw_text(&mut frame, at.value, value)?;
        }
        debug!("rendered {} rows, {} pixels lit", rows.len(), frame.count_on());
        Ok(frame)
    }
}
