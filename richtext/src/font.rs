// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font metrics interface consumed by the text model.

use core::fmt::Debug;

/// Opaque reference to a font known to a [`FontMetrics`] provider.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FontId(pub u32);

/// Glyph metrics for the fonts referenced by rich text.
///
/// All values are in whole pixels. The model asks for the width of a
/// character once, when the character enters a fragment, and for kerning
/// whenever two characters become visually adjacent.
pub trait FontMetrics: Debug + Send + Sync {
    /// The advance width of `ch`.
    fn width(&self, font: FontId, ch: char) -> u32;

    /// The kerning adjustment between `prev` and `ch` when `ch` follows `prev`
    /// on the same line, from left to right.
    fn kerning(&self, font: FontId, prev: char, ch: char) -> i32;

    /// Distance from the baseline to the top of the font.
    fn ascender(&self, font: FontId) -> u32;

    /// Distance from the baseline to the bottom of the font.
    fn descender(&self, font: FontId) -> u32;
}
