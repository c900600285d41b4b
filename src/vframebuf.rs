/*
 *  vframebuf.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{BinaryColor, PixelColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor + Clone> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Pixel at (x, y), None when outside the buffer
    pub fn get(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl VarFrameBuf<BinaryColor> {
    /// Blank 1-bit frame
    pub fn mono(width: u32, height: u32) -> Self {
        Self::new(width, height, BinaryColor::Off)
    }

    pub fn count_on(&self) -> usize {
        self.buf.iter().filter(|c| c.is_on()).count()
    }

    /// True when every pixel is off
    pub fn is_blank(&self) -> bool {
        self.buf.iter().all(|c| c.is_off())
    }

    /// Iterate lit pixels as (x, y)
    pub fn lit_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.w;
        self.buf
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_on())
            .map(move |(i, _)| ((i % w) as u32, (i / w) as u32))
    }

    /// OR another frame of the same size into this one
    pub fn merge(&mut self, other: &VarFrameBuf<BinaryColor>) {
        if other.w != self.w || other.h != self.h {
            return;
        }
        for (dst, src) in self.buf.iter_mut().zip(other.buf.iter()) {
            if src.is_on() {
                *dst = BinaryColor::On;
            }
        }
    }

    /// Pack into row-major bytes, MSB = leftmost pixel, rows padded to a byte.
    /// This is the raw PBM (P4) payload layout.
    pub fn to_packed_rows(&self) -> Vec<u8> {
        let stride = (self.w + 7) / 8;
        let mut bytes = vec![0u8; stride * self.h];
        for (x, y) in self.lit_pixels() {
            let (x, y) = (x as usize, y as usize);
            bytes[y * stride + x / 8] |= 0x80 >> (x % 8);
        }
        bytes
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor + Clone> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // colors arrive row by row over the whole area, clipped pixels are consumed and dropped
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }

        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                if let Some(i) = self.idx(area.top_left + Point::new(col, row)) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}
