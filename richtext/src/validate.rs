// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural self-check of the model.

use alloc::vec::Vec;

use crate::analysis::{is_mandatory_break, paragraph_breaks, paragraph_lengths, resolve};
use crate::bidi::{self, Embedding};
use crate::error::{internal_assert, internal_fault, Result};
use crate::metrics::CharacterMetrics;
use crate::model::RichText;
use crate::string::RichString;
use crate::wrap::SplitRule;

impl RichText {
    /// Checks every structural invariant of the model.
    ///
    /// This walks the whole text and re-measures and re-analyses every
    /// fragment, so it is meant for tests and debugging.
    pub fn validate(&self) -> Result<()> {
        let base = self.direction;
        let fonts = &*self.fonts;
        internal_assert!(!self.order.is_empty(), "document without paragraphs");
        internal_assert!(
            self.order.len() == self.paragraphs.len(),
            "{} paragraphs in order, {} allocated",
            self.order.len(),
            self.paragraphs.len()
        );

        let mut first_char = 0;
        let mut first_fragment = 0;
        let mut y = 0;
        let mut listed = 0;
        let last_paragraph = self.order.len() - 1;
        for (index, &pid) in self.order.iter().enumerate() {
            let paragraph = &self.paragraphs[pid];
            internal_assert!(paragraph.index == index, "paragraph {index} numbered {}", paragraph.index);
            internal_assert!(
                paragraph.first_char == first_char,
                "paragraph {index} starts at {}, expected {first_char}",
                paragraph.first_char
            );
            internal_assert!(
                paragraph.first_fragment == first_fragment,
                "paragraph {index} has first fragment {}, expected {first_fragment}",
                paragraph.first_fragment
            );
            internal_assert!(paragraph.y == y, "paragraph {index} at y {}, expected {y}", paragraph.y);
            internal_assert!(!paragraph.fragments.is_empty(), "paragraph {index} has no fragments");

            let mut local_char = 0;
            let mut local_y = 0;
            let mut chars = Vec::new();
            let mut metas = Vec::new();
            let mut breaks = Vec::new();
            for (fi, &fid) in paragraph.fragments.iter().enumerate() {
                listed += 1;
                let Some(fragment) = self.fragments.get(fid) else {
                    return Err(internal_fault!(
                        "paragraph {index} lists a removed fragment"
                    ));
                };
                let len = fragment.len();
                internal_assert!(fragment.paragraph == pid, "fragment {fi} of paragraph {index} points elsewhere");
                internal_assert!(fragment.index == fi, "fragment {fi} numbered {}", fragment.index);
                internal_assert!(fragment.first_char == local_char, "fragment {fi} of paragraph {index} misplaced");
                internal_assert!(fragment.y == local_y, "fragment {fi} of paragraph {index} at wrong y");
                internal_assert!(
                    fragment.metrics.len() == len && fragment.breaks.len() == len,
                    "fragment {fi} of paragraph {index}: {len} characters, {} metrics, {} breaks",
                    fragment.metrics.len(),
                    fragment.breaks.len()
                );
                internal_assert!(
                    len > 0 || self.num_chars == 0,
                    "empty fragment in a non-empty document"
                );
                internal_assert!(
                    fragment.metrics == CharacterMetrics::measure(fonts, &fragment.text),
                    "stale metrics in fragment {fi} of paragraph {index}"
                );
                internal_assert!(
                    fragment.width == fragment.metrics.total(),
                    "fragment width {} differs from its metrics",
                    fragment.width
                );
                if self.word_wrap_width > 0 && fragment.width > self.word_wrap_width {
                    internal_assert!(
                        !fragment.legal_cuts(base, SplitRule::AtBreak).contains(&true),
                        "fragment {fi} of paragraph {index} is too wide but could be broken"
                    );
                }

                for &id in &fragment.locations {
                    let location = self.locations.get(id);
                    internal_assert!(
                        location.is_some_and(|l| l.fragment == fid),
                        "fragment lists a foreign location"
                    );
                }

                let visual = fragment.embeddings();
                let order = bidi::logical_order(&visual, base);
                let logical: Vec<Embedding> = order.iter().map(|&v| visual[v]).collect();
                internal_assert!(
                    bidi::invert(&order) == bidi::visual_order(&logical, base),
                    "fragment {fi} of paragraph {index} is not in display order"
                );
                let fragment_metas = fragment.text.metas();
                for &v in &order {
                    chars.push(fragment.text.chars()[v]);
                    metas.push(fragment_metas[v]);
                    breaks.push(fragment.breaks[v]);
                }
                local_char += len;
                local_y += fragment.height();
            }

            internal_assert!(paragraph.num_chars == local_char, "paragraph {index} size mismatch");
            internal_assert!(paragraph.height == local_y, "paragraph {index} height mismatch");
            let lengths = paragraph_lengths(&chars);
            if index < last_paragraph {
                internal_assert!(
                    chars.last().copied().is_some_and(is_mandatory_break),
                    "paragraph {index} does not end with a break"
                );
            }
            internal_assert!(
                lengths[0] == chars.len(),
                "paragraph {index} contains a break at {}",
                lengths[0]
            );
            let logical = RichString::from_parts(chars, metas);
            internal_assert!(
                resolve(&logical, base) == logical,
                "stale character directions in paragraph {index}"
            );
            internal_assert!(
                breaks == paragraph_breaks(logical.chars(), &logical.rtl_flags(), index == 0),
                "stale break classification in paragraph {index}"
            );

            first_char += local_char;
            first_fragment += paragraph.fragments.len();
            y += local_y;
        }
        internal_assert!(first_char == self.num_chars, "character count mismatch");
        internal_assert!(first_fragment == self.num_fragments, "fragment count mismatch");
        internal_assert!(listed == self.fragments.len(), "unreachable fragments");
        internal_assert!(y == self.height(), "height mismatch");

        let last = self.last_fragment();
        for (id, location) in &self.locations {
            let Some(fragment) = self.fragments.get(location.fragment) else {
                return Err(internal_fault!("location on a removed fragment"));
            };
            internal_assert!(
                fragment.locations.contains(&id),
                "location missing from its fragment"
            );
            internal_assert!(
                location.offset < fragment.len()
                    || (location.offset == fragment.len() && last == Some(location.fragment)),
                "location offset {} outside of a fragment of {} characters",
                location.offset,
                fragment.len()
            );
            internal_assert!(self.pos(id)? <= self.max_pos(), "location past the end");
        }

        if self.is_editor {
            let text = self.text();
            internal_assert!(
                text.char_at(text.len().wrapping_sub(1)) == Some('\n'),
                "editable text lost its trailing newline"
            );
        }
        Ok(())
    }
}
