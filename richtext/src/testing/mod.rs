// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic font metrics for tests.

use hashbrown::HashMap;

use crate::font::{FontId, FontMetrics};

#[derive(Copy, Clone, Debug)]
struct FontSpec {
    advance: u32,
    ascender: u32,
    descender: u32,
}

/// A [`FontMetrics`] provider with fixed advances.
///
/// Every character of a font has the same advance unless overridden with
/// [`FixedFontMetrics::with_char_width`]. Kerning is zero except for the pairs
/// registered with [`FixedFontMetrics::with_kerning`].
#[derive(Clone, Debug)]
pub struct FixedFontMetrics {
    default: FontSpec,
    fonts: HashMap<FontId, FontSpec>,
    widths: HashMap<char, u32>,
    kerning: HashMap<(char, char), i32>,
}

impl FixedFontMetrics {
    /// Every font advances by `advance` pixels per character.
    ///
    /// The ascender equals the advance and the descender is a quarter of it.
    pub fn new(advance: u32) -> Self {
        Self {
            default: FontSpec {
                advance,
                ascender: advance,
                descender: advance / 4,
            },
            fonts: HashMap::new(),
            widths: HashMap::new(),
            kerning: HashMap::new(),
        }
    }

    /// Gives `font` its own metrics.
    #[must_use]
    pub fn with_font(mut self, font: FontId, advance: u32, ascender: u32, descender: u32) -> Self {
        self.fonts.insert(
            font,
            FontSpec {
                advance,
                ascender,
                descender,
            },
        );
        self
    }

    /// Overrides the advance of `ch` in every font.
    #[must_use]
    pub fn with_char_width(mut self, ch: char, width: u32) -> Self {
        self.widths.insert(ch, width);
        self
    }

    /// Kerns `ch` by `value` when it follows `prev`.
    #[must_use]
    pub fn with_kerning(mut self, prev: char, ch: char, value: i32) -> Self {
        self.kerning.insert((prev, ch), value);
        self
    }

    fn spec(&self, font: FontId) -> FontSpec {
        self.fonts.get(&font).copied().unwrap_or(self.default)
    }
}

impl Default for FixedFontMetrics {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FontMetrics for FixedFontMetrics {
    fn width(&self, font: FontId, ch: char) -> u32 {
        self.widths
            .get(&ch)
            .copied()
            .unwrap_or_else(|| self.spec(font).advance)
    }

    fn kerning(&self, _font: FontId, prev: char, ch: char) -> i32 {
        self.kerning.get(&(prev, ch)).copied().unwrap_or(0)
    }

    fn ascender(&self, font: FontId) -> u32 {
        self.spec(font).ascender
    }

    fn descender(&self, font: FontId) -> u32 {
        self.spec(font).descender
    }
}
