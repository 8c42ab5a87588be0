// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strings with run-length character metadata.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::bidi::Embedding;
    use crate::font::FontId;

/// Opaque hyperlink tag attached to a run of characters.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct LinkId(pub u32);

/// Metadata shared by a run of characters.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct TextMeta {
    /// The font used to measure and draw the characters.
    pub font: FontId,
    /// `true` if the characters belong to a right-to-left run.
    ///
    /// This and the two following flags are set by the text model when text
    /// enters it; any value supplied by the caller is replaced.
    pub rtl: bool,
    /// The characters flow in the paragraph direction inside a run of the
    /// opposite direction, like digits inside Hebrew in a left-to-right
    /// paragraph.
    pub nested: bool,
    /// The direction came from explicit formatting characters and survives
    /// re-resolution after edits.
    pub explicit: bool,
    /// Optional hyperlink tag.
    pub link: Option<LinkId>,
}

impl TextMeta {
    /// Metadata for `font` with no link.
    pub fn new(font: FontId) -> Self {
        Self {
            font,
            ..Self::default()
        }
    }

    /// Attaches a hyperlink tag.
    #[must_use]
    pub fn with_link(mut self, link: LinkId) -> Self {
        self.link = Some(link);
        self
    }
}

/// A sequence of characters with run-length encoded [`TextMeta`].
///
/// Runs never overlap, are never empty, cover the whole string and no two
/// adjacent runs carry equal metadata.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RichString {
    chars: Vec<char>,
    /// Start index and metadata of each run.
    runs: Vec<(usize, TextMeta)>,
}

impl RichString {
    /// Creates a string using the default metadata.
    pub fn new(text: &str) -> Self {
        Self::with_meta(text, TextMeta::default())
    }

    /// Creates a string where every character carries `meta`.
    pub fn with_meta(text: &str, meta: TextMeta) -> Self {
        let mut s = Self::default();
        s.push_str(text, meta);
        s
    }

    /// Appends `text` with the given metadata.
    pub fn push_str(&mut self, text: &str, meta: TextMeta) {
        let start = self.chars.len();
        self.chars.extend(text.chars());
        if self.chars.len() > start {
            self.push_run(start, meta);
        }
    }

    pub(crate) fn from_parts(chars: Vec<char>, metas: impl IntoIterator<Item = TextMeta>) -> Self {
        let mut runs: Vec<(usize, TextMeta)> = Vec::new();
        for (i, meta) in metas.into_iter().enumerate().take(chars.len()) {
            if runs.last().is_none_or(|(_, last)| *last != meta) {
                runs.push((i, meta));
            }
        }
        debug_assert!(
            chars.is_empty() || !runs.is_empty(),
            "metadata must cover every character"
        );
        Self { chars, runs }
    }

    fn push_run(&mut self, start: usize, meta: TextMeta) {
        if self.runs.last().is_none_or(|(_, last)| *last != meta) {
            self.runs.push((start, meta));
        }
    }

    /// The number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if there are no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The characters.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The character at `index`.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// The metadata of the character at `index`.
    pub fn meta_at(&self, index: usize) -> Option<TextMeta> {
        if index >= self.chars.len() {
            return None;
        }
        let run = self.runs.partition_point(|(start, _)| *start <= index);
        self.runs.get(run.checked_sub(1)?).map(|(_, meta)| *meta)
    }

    /// Iterates over the metadata runs.
    pub fn runs(&self) -> impl Iterator<Item = (Range<usize>, TextMeta)> + '_ {
        self.runs.iter().enumerate().map(|(i, (start, meta))| {
            let end = self
                .runs
                .get(i + 1)
                .map_or(self.chars.len(), |(next, _)| *next);
            (*start..end, *meta)
        })
    }

    /// Start offsets of the metadata runs.
    pub fn run_starts(&self) -> impl Iterator<Item = usize> + '_ {
        self.runs.iter().map(|(start, _)| *start)
    }

    /// Per-character metadata.
    pub(crate) fn metas(&self) -> Vec<TextMeta> {
        let mut out = Vec::with_capacity(self.chars.len());
        for (range, meta) in self.runs() {
            out.extend(core::iter::repeat_n(meta, range.len()));
        }
        out
    }

    /// Per-character direction flags.
    pub(crate) fn rtl_flags(&self) -> Vec<bool> {
        self.metas().iter().map(|meta| meta.rtl).collect()
    }

    /// Per-character placement in the reordering.
    pub(crate) fn embeddings(&self) -> Vec<Embedding> {
        self.metas().iter().map(Embedding::of).collect()
    }

    /// Returns `range` as a new string.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let range = range.start.min(self.len())..range.end.min(self.len());
        if range.is_empty() {
            return Self::default();
        }
        let mut out = Self {
            chars: self.chars[range.clone()].to_vec(),
            runs: Vec::new(),
        };
        for (run, meta) in self.runs() {
            let start = run.start.max(range.start);
            let end = run.end.min(range.end);
            if start < end {
                out.push_run(start - range.start, meta);
            }
        }
        out
    }

    /// Appends another string.
    pub fn append(&mut self, other: &Self) {
        let offset = self.chars.len();
        self.chars.extend_from_slice(&other.chars);
        for (start, meta) in &other.runs {
            self.push_run(start + offset, *meta);
        }
    }

    /// Inserts `other` before the character at `pos`.
    pub fn insert(&mut self, pos: usize, other: &Self) {
        let pos = pos.min(self.len());
        let mut out = self.slice(0..pos);
        out.append(other);
        out.append(&self.slice(pos..self.len()));
        *self = out;
    }

    /// Removes the characters in `range`.
    pub fn remove(&mut self, range: Range<usize>) {
        let mut out = self.slice(0..range.start);
        out.append(&self.slice(range.end..self.len()));
        *self = out;
    }

    /// Returns the characters rearranged so that `out[i] == self[order[i]]`.
    pub(crate) fn permuted(&self, order: &[usize]) -> Self {
        let metas = self.metas();
        Self::from_parts(
            order.iter().map(|&i| self.chars[i]).collect(),
            order.iter().map(|&i| metas[i]),
        )
    }

    /// Replaces the direction of every character.
    pub(crate) fn with_embeddings(&self, embeddings: &[Embedding]) -> Self {
        let metas = self.metas();
        Self::from_parts(
            self.chars.clone(),
            metas.into_iter().zip(embeddings.iter()).map(|(meta, e)| TextMeta {
                rtl: e.rtl,
                nested: e.nested,
                ..meta
            }),
        )
    }

    /// Keeps only the characters for which `keep` returns `true`.
    pub(crate) fn filtered(&self, mut keep: impl FnMut(char) -> bool) -> Self {
        let metas = self.metas();
        let (chars, metas): (Vec<char>, Vec<TextMeta>) = self
            .chars
            .iter()
            .zip(metas)
            .filter(|(c, _)| keep(**c))
            .map(|(c, m)| (*c, m))
            .unzip();
        Self::from_parts(chars, metas)
    }
}

impl fmt::Display for RichString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RichString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichString")
            .field("text", &self.chars.iter().collect::<String>())
            .field("runs", &self.runs)
            .finish()
    }
}

impl From<&str> for RichString {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RichString {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{LinkId, RichString, TextMeta};
    use crate::bidi::Embedding;
    use crate::font::FontId;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    fn bold() -> TextMeta {
        TextMeta::new(FontId(1))
    }

    #[test]
    fn runs_are_coalesced() {
        let mut s = RichString::new("ab");
        s.push_str("cd", TextMeta::default());
        s.push_str("ef", bold());
        assert_eq!(s.to_string(), "abcdef");
        assert_eq!(s.run_starts().collect::<Vec<_>>(), [0, 4]);
        assert_eq!(s.meta_at(3), Some(TextMeta::default()));
        assert_eq!(s.meta_at(4), Some(bold()));
        assert_eq!(s.meta_at(6), None);
    }

    #[test]
    fn slice_insert_remove() {
        let mut s = RichString::new("hello");
        s.insert(2, &RichString::with_meta("XY", bold()));
        assert_eq!(s.to_string(), "heXYllo");
        assert_eq!(s.run_starts().collect::<Vec<_>>(), [0, 2, 4]);

        let mid = s.slice(1..5);
        assert_eq!(mid.to_string(), "eXYl");
        assert_eq!(mid.run_starts().collect::<Vec<_>>(), [0, 1, 3]);

        s.remove(2..4);
        assert_eq!(s.to_string(), "hello");
        assert_eq!(s.run_starts().collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn permute_and_directions() {
        let link = TextMeta::default().with_link(LinkId(3));
        let mut s = RichString::new("ab");
        s.push_str("c", link);
        let reversed = s.permuted(&[2, 1, 0]);
        assert_eq!(reversed.to_string(), "cba");
        assert_eq!(reversed.meta_at(0), Some(link));

        let flagged = s.with_embeddings(&[
            Embedding::default(),
            Embedding::RTL,
            Embedding::RTL.nested(),
        ]);
        assert_eq!(flagged.rtl_flags(), [false, true, true]);
        assert_eq!(flagged.meta_at(2).map(|m| m.nested), Some(true));
        assert_eq!(flagged.meta_at(2).and_then(|m| m.link), Some(LinkId(3)));
    }
}
