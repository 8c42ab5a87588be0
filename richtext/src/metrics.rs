// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character width and kerning cache of a fragment.

use alloc::vec::Vec;
use core::ops::Range;

use crate::font::{FontId, FontMetrics};
use crate::string::RichString;

/// Widths and kerning of the characters of a visual line.
///
/// `kernings[i]` is the adjustment between visual characters `i - 1` and `i`;
/// `kernings[0]` is always zero.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub(crate) struct CharacterMetrics {
    widths: Vec<u32>,
    kernings: Vec<i32>,
}

/// Kerning between two visually adjacent characters. Characters set in
/// different fonts are never kerned.
pub(crate) fn kern(fonts: &dyn FontMetrics, prev: (char, FontId), ch: (char, FontId)) -> i32 {
    if prev.1 == ch.1 {
        fonts.kerning(ch.1, prev.0, ch.0)
    } else {
        0
    }
}

fn clamp(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl CharacterMetrics {
    /// Measures every character of `text`, which is in visual order.
    pub(crate) fn measure(fonts: &dyn FontMetrics, text: &RichString) -> Self {
        let metas = text.metas();
        let chars = text.chars();
        let mut out = Self {
            widths: Vec::with_capacity(chars.len()),
            kernings: Vec::with_capacity(chars.len()),
        };
        for (i, (&ch, meta)) in chars.iter().zip(&metas).enumerate() {
            out.widths.push(fonts.width(meta.font, ch));
            out.kernings.push(if i == 0 {
                0
            } else {
                kern(fonts, (chars[i - 1], metas[i - 1].font), (ch, meta.font))
            });
        }
        out
    }

    /// Measures `text`, reusing values from `old` (the metrics of `old_text`).
    ///
    /// `mapping[i]` names the character of `old_text` that became character
    /// `i` of `text`, if any. Widths of mapped characters are reused, as is the
    /// kerning of pairs that were already adjacent. Everything else is asked
    /// from the font provider.
    pub(crate) fn remeasure(
        fonts: &dyn FontMetrics,
        text: &RichString,
        old: &Self,
        mapping: &[Option<usize>],
    ) -> Self {
        let metas = text.metas();
        let chars = text.chars();
        let mut out = Self {
            widths: Vec::with_capacity(chars.len()),
            kernings: Vec::with_capacity(chars.len()),
        };
        for (i, (&ch, meta)) in chars.iter().zip(&metas).enumerate() {
            let reused = mapping.get(i).copied().flatten();
            out.widths.push(match reused {
                Some(j) if j < old.len() => old.widths[j],
                _ => fonts.width(meta.font, ch),
            });
            let kerning = if i == 0 {
                0
            } else {
                match (mapping.get(i - 1).copied().flatten(), reused) {
                    (Some(p), Some(j)) if p + 1 == j && j < old.len() => old.kernings[j],
                    _ => kern(fonts, (chars[i - 1], metas[i - 1].font), (ch, meta.font)),
                }
            };
            out.kernings.push(kerning);
        }
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.widths.len()
    }

    #[cfg(test)]
    pub(crate) fn kernings(&self) -> &[i32] {
        &self.kernings
    }

    /// The width of the whole line.
    pub(crate) fn total(&self) -> u32 {
        self.range_width(0..self.len())
    }

    /// The width of `range` laid out as a line of its own.
    pub(crate) fn range_width(&self, range: Range<usize>) -> u32 {
        let range = range.start.min(self.len())..range.end.min(self.len());
        if range.is_empty() {
            return 0;
        }
        let widths: i64 = self.widths[range.clone()].iter().map(|&w| i64::from(w)).sum();
        let kernings: i64 = self.kernings[range.start + 1..range.end]
            .iter()
            .map(|&k| i64::from(k))
            .sum();
        clamp(widths + kernings)
    }

    /// `out[v]` is the width of the visual prefix `0..v`.
    pub(crate) fn prefix_widths(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.len() + 1);
        let mut acc = 0_i64;
        out.push(0);
        for (i, &w) in self.widths.iter().enumerate() {
            if i > 0 {
                acc += i64::from(self.kernings[i]);
            }
            acc += i64::from(w);
            out.push(clamp(acc));
        }
        out
    }

    /// `out[v]` is the width of the visual suffix `v..len`.
    pub(crate) fn suffix_widths(&self) -> Vec<u32> {
        let len = self.len();
        let mut out = alloc::vec![0; len + 1];
        let mut acc = 0_i64;
        for i in (0..len).rev() {
            acc += i64::from(self.widths[i]);
            if i + 1 < len {
                acc += i64::from(self.kernings[i + 1]);
            }
            out[i] = clamp(acc);
        }
        out
    }

    /// The horizontal offset of the left edge of every character, relative to
    /// the start of the line, followed by the width of the line.
    pub(crate) fn edges(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.len() + 1);
        let mut x = 0_i64;
        for (i, &w) in self.widths.iter().enumerate() {
            x += i64::from(self.kernings[i]);
            out.push(clamp(x));
            x += i64::from(w);
        }
        out.push(clamp(x));
        out
    }

    /// The visual caret index closest to `x`.
    pub(crate) fn index_at(&self, x: u32) -> usize {
        let edges = self.edges();
        let len = self.len();
        // First character whose centre lies right of `x`.
        let mut lo = 0;
        let mut hi = len;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let centre = (u64::from(edges[mid]) + u64::from(edges[mid + 1])) / 2;
            if centre <= u64::from(x) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Returns the metrics of `range` laid out as a line of its own.
    pub(crate) fn slice(&self, range: Range<usize>) -> Self {
        let range = range.start.min(self.len())..range.end.min(self.len());
        let mut out = Self {
            widths: self.widths[range.clone()].to_vec(),
            kernings: self.kernings[range].to_vec(),
        };
        if let Some(first) = out.kernings.first_mut() {
            *first = 0;
        }
        out
    }

    /// Appends `other`, the metrics of `right`, to these metrics of `left`.
    ///
    /// Only the kerning across the junction is computed.
    pub(crate) fn append(
        &mut self,
        fonts: &dyn FontMetrics,
        left: &RichString,
        other: &Self,
        right: &RichString,
    ) {
        let junction = self.len();
        self.widths.extend_from_slice(&other.widths);
        self.kernings.extend_from_slice(&other.kernings);
        if junction == 0 || other.len() == 0 {
            return;
        }
        let prev = left.char_at(junction - 1).zip(left.meta_at(junction - 1));
        let next = right.char_at(0).zip(right.meta_at(0));
        if let Some(((pc, pm), (nc, nm))) = prev.zip(next) {
            self.kernings[junction] = kern(fonts, (pc, pm.font), (nc, nm.font));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CharacterMetrics;
    use crate::string::RichString;
    use crate::testing::FixedFontMetrics;

    fn fonts() -> FixedFontMetrics {
        FixedFontMetrics::new(10).with_kerning('A', 'V', -3)
    }

    #[test]
    fn kerning_applies_between_pairs() {
        let fonts = fonts();
        let m = CharacterMetrics::measure(&fonts, &RichString::new("AVA"));
        assert_eq!(m.kernings(), [0, -3, 0]);
        assert_eq!(m.total(), 27);
        assert_eq!(m.range_width(1..3), 20);
        assert_eq!(m.range_width(0..2), 17);
        assert_eq!(m.prefix_widths(), [0, 10, 17, 27]);
        assert_eq!(m.suffix_widths(), [27, 20, 10, 0]);
        assert_eq!(m.edges(), [0, 7, 17, 27]);
    }

    #[test]
    fn slice_and_append_only_touch_the_junction() {
        let fonts = fonts();
        let text = RichString::new("AVA");
        let m = CharacterMetrics::measure(&fonts, &text);
        let mut head = m.slice(0..1);
        let tail = m.slice(1..3);
        assert_eq!(tail.kernings(), [0, 0]);
        head.append(&fonts, &text.slice(0..1), &tail, &text.slice(1..3));
        assert_eq!(head, m);
    }

    #[test]
    fn remeasure_reuses_known_characters() {
        let fonts = fonts();
        let old_text = RichString::new("AV");
        let old = CharacterMetrics::measure(&fonts, &old_text);
        let text = RichString::new("AxV");
        let m = CharacterMetrics::remeasure(&fonts, &text, &old, &[Some(0), None, Some(1)]);
        assert_eq!(m, CharacterMetrics::measure(&fonts, &text));
    }

    #[test]
    fn hit_testing() {
        let m = CharacterMetrics::measure(&fonts(), &RichString::new("abc"));
        assert_eq!(m.index_at(0), 0);
        assert_eq!(m.index_at(4), 0);
        assert_eq!(m.index_at(6), 1);
        assert_eq!(m.index_at(100), 3);
    }
}
