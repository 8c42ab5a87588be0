// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unicode analysis: bidi level resolution, line break opportunities and
//! word boundaries.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use icu_properties::CodePointMapData;
use icu_properties::props::{BidiClass, LineBreak};
use icu_segmenter::options::{LineBreakOptions, WordBreakInvariantOptions};
use icu_segmenter::{LineSegmenter, WordSegmenter};
use unicode_bidi::{BidiInfo, Level};

use crate::bidi::{Direction, Embedding};
use crate::string::{RichString, TextMeta};

/// The line breaking behaviour at the boundary before a character.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub enum BreakOpportunity {
    /// A line may not end here.
    #[default]
    None,
    /// A line may end here.
    Allowed,
    /// A line must end here.
    Mandatory,
}

impl BreakOpportunity {
    /// Returns `true` for [`BreakOpportunity::Allowed`] and [`BreakOpportunity::Mandatory`].
    pub fn is_break(self) -> bool {
        self != Self::None
    }
}

/// Returns `true` if a line must end after `ch`.
pub(crate) fn is_mandatory_break(ch: char) -> bool {
    // See: https://github.com/unicode-org/icu4x/blob/ee5399a77a6b94efb5d4b60678bb458c5eedb25d/components/segmenter/src/line.rs#L338-L351
    matches!(
        CodePointMapData::<LineBreak>::new().get(ch),
        LineBreak::MandatoryBreak | LineBreak::CarriageReturn | LineBreak::LineFeed | LineBreak::NextLine
    )
}

/// How an explicit formatting character changes the embedding depth: `1`
/// for the embedding, override and isolate initiators, `-1` for their
/// terminators.
fn formatting_depth(ch: char) -> Option<isize> {
    match CodePointMapData::<BidiClass>::new().get(ch) {
        BidiClass::LeftToRightEmbedding
        | BidiClass::RightToLeftEmbedding
        | BidiClass::LeftToRightOverride
        | BidiClass::RightToLeftOverride
        | BidiClass::LeftToRightIsolate
        | BidiClass::RightToLeftIsolate
        | BidiClass::FirstStrongIsolate => Some(1),
        BidiClass::PopDirectionalFormat | BidiClass::PopDirectionalIsolate => Some(-1),
        _ => None,
    }
}

/// The direction of the first strong character, if any.
pub(crate) fn first_strong_direction(chars: &[char]) -> Option<Direction> {
    let map = CodePointMapData::<BidiClass>::new();
    chars.iter().find_map(|&ch| match map.get(ch) {
        BidiClass::LeftToRight => Some(Direction::LeftToRight),
        BidiClass::RightToLeft | BidiClass::ArabicLetter => Some(Direction::RightToLeft),
        _ => None,
    })
}

/// Character counts of the paragraphs in `chars`.
///
/// Every paragraph but the last ends with a mandatory break; a carriage
/// return followed by a line feed counts as one break. The result is never
/// empty, and its last entry is `0` when the text ends with a break.
pub(crate) fn paragraph_lengths(chars: &[char]) -> Vec<usize> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, &ch) in chars.iter().enumerate() {
        if is_mandatory_break(ch) && !(ch == '\r' && chars.get(i + 1) == Some(&'\n')) {
            out.push(i + 1 - start);
            start = i + 1;
        }
    }
    out.push(chars.len() - start);
    out
}

/// Resolved embedding levels of `text`, one per character. Mandatory
/// breaks take the base level.
fn char_levels(text: &str, base: Direction) -> Vec<u8> {
    let level = match base {
        Direction::LeftToRight => Level::ltr(),
        Direction::RightToLeft => Level::rtl(),
    };
    let info = BidiInfo::new(text, Some(level));
    text.char_indices()
        .map(|(byte, ch)| {
            if is_mandatory_break(ch) {
                level.number()
            } else {
                info.levels[byte].number()
            }
        })
        .collect()
}

/// Folds embedding levels into run directions and nested blocks.
///
/// A stretch above the base level that reaches the first opposite level is a
/// run of the opposite direction, and everything deeper inside it is nested.
/// A stretch that skips the opposite level flows in the base direction.
fn embeddings_from_levels(levels: &[u8], base: Direction) -> Vec<Embedding> {
    let base_level = u8::from(base.is_rtl());
    let mut out = alloc::vec![Embedding::run(base); levels.len()];
    let mut start = 0;
    while start < levels.len() {
        if levels[start] <= base_level {
            start += 1;
            continue;
        }
        let end = levels[start..]
            .iter()
            .position(|&l| l <= base_level)
            .map_or(levels.len(), |n| start + n);
        if levels[start..end].contains(&(base_level + 1)) {
            for (e, &level) in out[start..end].iter_mut().zip(&levels[start..end]) {
                *e = Embedding::run(base.opposite());
                if level > base_level + 1 {
                    *e = e.nested();
                }
            }
        }
        start = end;
    }
    out
}

/// Resolves the direction of every character of `text` against `base` and
/// removes the explicit formatting characters.
///
/// The returned string is in logical order. Characters inside explicit
/// embeddings, overrides and isolates are marked `explicit` and keep the
/// direction resolved here; all others are resolved by [`resolve`].
pub(crate) fn prepare(text: &RichString, base: Direction) -> RichString {
    if text.is_empty() {
        return RichString::default();
    }
    let s: String = text.chars().iter().collect();
    let levels = char_levels(&s, base);
    let mut depth = 0_isize;
    let mut chars = Vec::with_capacity(text.len());
    let mut metas = Vec::with_capacity(text.len());
    let mut kept_levels = Vec::with_capacity(text.len());
    for ((&ch, meta), level) in text.chars().iter().zip(text.metas()).zip(levels) {
        if let Some(change) = formatting_depth(ch) {
            depth = (depth + change).max(0);
            continue;
        }
        chars.push(ch);
        metas.push(TextMeta {
            explicit: depth > 0 && !is_mandatory_break(ch),
            ..meta
        });
        kept_levels.push(level);
        if is_mandatory_break(ch) {
            depth = 0;
        }
    }
    let embeddings = embeddings_from_levels(&kept_levels, base);
    let prepared = RichString::from_parts(chars, metas).with_embeddings(&embeddings);
    resolve(&prepared, base)
}

/// Re-resolves the direction of every character that is not under explicit
/// formatting, one paragraph at a time.
///
/// Explicitly directed characters keep their direction and take part in the
/// resolution as strong characters of the direction they flow in.
pub(crate) fn resolve(text: &RichString, base: Direction) -> RichString {
    let metas = text.metas();
    let mut embeddings = Vec::with_capacity(text.len());
    let mut start = 0;
    for len in paragraph_lengths(text.chars()) {
        let range = start..start + len;
        start += len;
        let s: String = text.chars()[range.clone()]
            .iter()
            .zip(&metas[range.clone()])
            .map(|(&ch, meta)| match (meta.explicit, Embedding::of(meta).flow(base)) {
                (false, _) => ch,
                // HEBREW LETTER ALEF
                (true, Direction::RightToLeft) => '\u{05D0}',
                (true, Direction::LeftToRight) => 'a',
            })
            .collect();
        let resolved = embeddings_from_levels(&char_levels(&s, base), base);
        for (meta, e) in metas[range].iter().zip(resolved) {
            embeddings.push(if meta.explicit { Embedding::of(meta) } else { e });
        }
    }
    text.with_embeddings(&embeddings)
}

/// Maps byte offsets into `text` to character offsets.
fn char_offsets(text: &str, bytes: impl Iterator<Item = usize>) -> impl Iterator<Item = usize> {
    let starts: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    bytes.map(move |b| starts.partition_point(|&s| s < b))
}

/// Classifies the boundary before every character of a paragraph.
///
/// `chars` and `rtl` are the paragraph's logical text and direction flags.
/// The first boundary is mandatory for every paragraph but the first; a
/// change of direction is always a break opportunity.
pub(crate) fn paragraph_breaks(
    chars: &[char],
    rtl: &[bool],
    first_paragraph: bool,
) -> Vec<BreakOpportunity> {
    let mut out = alloc::vec![BreakOpportunity::None; chars.len()];
    if chars.is_empty() {
        return out;
    }
    if !first_paragraph {
        out[0] = BreakOpportunity::Mandatory;
    }
    let s: String = chars.iter().collect();
    let segmenter = LineSegmenter::new_auto(LineBreakOptions::default());
    for pos in char_offsets(&s, segmenter.segment_str(&s)) {
        // icu adds leading and trailing boundaries, which we don't use.
        if pos > 0 && pos < chars.len() {
            out[pos] = BreakOpportunity::Allowed;
        }
    }
    for i in 1..chars.len() {
        if rtl[i] != rtl[i - 1] {
            out[i] = BreakOpportunity::Allowed;
        }
    }
    out
}

/// The word containing the character at `index`, as a range of character offsets.
///
/// An index at or past the end selects the last word.
pub(crate) fn word_at(chars: &[char], index: usize) -> Range<usize> {
    if chars.is_empty() {
        return 0..0;
    }
    let index = index.min(chars.len() - 1);
    let s: String = chars.iter().collect();
    let segmenter = WordSegmenter::new_auto(WordBreakInvariantOptions::default());
    let bounds: Vec<usize> = char_offsets(&s, segmenter.segment_str(&s)).collect();
    let end = bounds.partition_point(|&b| b <= index);
    match (end.checked_sub(1).and_then(|i| bounds.get(i)), bounds.get(end)) {
        (Some(&start), Some(&end)) => start..end,
        _ => index..index + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        first_strong_direction, paragraph_breaks, paragraph_lengths, prepare, resolve, word_at,
        BreakOpportunity,
    };
    use crate::bidi::Direction;
    use crate::string::RichString;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn paragraphs_split_after_breaks() {
        assert_eq!(paragraph_lengths(&chars("ab\ncd")), [3, 2]);
        assert_eq!(paragraph_lengths(&chars("ab\r\ncd\n")), [4, 3, 0]);
        assert_eq!(paragraph_lengths(&[]), [0]);
    }

    #[test]
    fn formatting_characters_are_consumed() {
        let text = RichString::new("ab\u{202E}cd\u{202C}ef");
        let prepared = prepare(&text, Direction::LeftToRight);
        assert_eq!(prepared.to_string(), "abcdef");
        assert_eq!(
            prepared.rtl_flags(),
            [false, false, true, true, false, false]
        );
    }

    #[test]
    fn digits_nest_inside_hebrew() {
        let prepared = prepare(&RichString::new("abc אבג 123"), Direction::LeftToRight);
        let flags: Vec<(bool, bool)> = prepared
            .metas()
            .iter()
            .map(|m| (m.rtl, m.nested))
            .collect();
        let mut expected = alloc::vec![(false, false); 4];
        expected.extend([(true, false); 4]);
        expected.extend([(true, true); 3]);
        assert_eq!(flags, expected);
    }

    #[test]
    fn resolution_follows_the_neighbours() {
        // A space typed between two Hebrew letters, still flagged left-to-right.
        let text = prepare(&RichString::new("אב"), Direction::LeftToRight);
        let mut edited = text.clone();
        edited.insert(1, &RichString::new(" "));
        assert_eq!(edited.rtl_flags(), [true, false, true]);
        let resolved = resolve(&edited, Direction::LeftToRight);
        assert_eq!(resolved.rtl_flags(), [true, true, true]);

        // Explicitly overridden characters keep their direction.
        let overridden = prepare(&RichString::new("ab\u{202E}cd\u{202C}"), Direction::LeftToRight);
        assert_eq!(resolve(&overridden, Direction::LeftToRight), overridden);
        assert_eq!(overridden.rtl_flags(), [false, false, true, true]);
    }

    #[test]
    fn hebrew_resolves_right_to_left() {
        let text = RichString::new("אב\n");
        let prepared = prepare(&text, Direction::LeftToRight);
        assert_eq!(prepared.rtl_flags(), [true, true, false]);
        assert_eq!(
            first_strong_direction(&chars("12 אב c")),
            Some(Direction::RightToLeft)
        );
        assert_eq!(first_strong_direction(&chars("12 ")), None);
    }

    #[test]
    fn break_classification() {
        let text = chars("ab cd");
        let rtl = [false; 5];
        let breaks = paragraph_breaks(&text, &rtl, true);
        assert_eq!(breaks[3], BreakOpportunity::Allowed);
        assert_eq!(
            breaks.iter().filter(|b| b.is_break()).count(),
            1,
            "only the space ends a line"
        );
        let breaks = paragraph_breaks(&text, &[false, false, false, true, true], false);
        assert_eq!(breaks[0], BreakOpportunity::Mandatory);
        assert_eq!(breaks[3], BreakOpportunity::Allowed);
    }

    #[test]
    fn direction_change_is_a_break() {
        let text = chars("abcd");
        let breaks = paragraph_breaks(&text, &[false, false, true, true], true);
        assert_eq!(
            breaks,
            [
                BreakOpportunity::None,
                BreakOpportunity::None,
                BreakOpportunity::Allowed,
                BreakOpportunity::None
            ]
        );
    }

    #[test]
    fn words() {
        let text = chars("hello big world");
        assert_eq!(word_at(&text, 7), 6..9);
        assert_eq!(word_at(&text, 0), 0..5);
        assert_eq!(word_at(&text, 99), 10..15);
    }
}
