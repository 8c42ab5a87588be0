// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraphs: the fragments between two mandatory breaks.

use alloc::vec::Vec;

use slotmap::SlotMap;

use crate::fragment::{Fragment, FragmentId};

slotmap::new_key_type! {
    /// Handle to a paragraph.
    pub(crate) struct ParagraphId;
}

/// An ordered run of fragments ending with a mandatory break, or with the
/// end of the text.
#[derive(Clone, Debug, Default)]
pub(crate) struct Paragraph {
    pub(crate) fragments: Vec<FragmentId>,
    /// Position in the document.
    pub(crate) index: usize,
    /// Logical offset of the first character in the document.
    pub(crate) first_char: usize,
    pub(crate) num_chars: usize,
    /// Global number of the first fragment.
    pub(crate) first_fragment: usize,
    /// Top edge of the first fragment.
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) minimum_width: u32,
    pub(crate) height: u32,
    pub(crate) above_baseline: u32,
    pub(crate) below_baseline: u32,
}

impl Paragraph {
    pub(crate) fn new(fragments: Vec<FragmentId>) -> Self {
        Self {
            fragments,
            ..Self::default()
        }
    }

    /// Renumbers the fragments and recomputes the aggregates.
    pub(crate) fn refresh(&mut self, fragments: &mut SlotMap<FragmentId, Fragment>) {
        let mut first_char = 0;
        let mut y = 0;
        self.width = 0;
        self.minimum_width = 0;
        self.above_baseline = 0;
        self.below_baseline = 0;
        for (index, id) in self.fragments.iter().enumerate() {
            let Some(fragment) = fragments.get_mut(*id) else {
                continue;
            };
            fragment.index = index;
            fragment.first_char = first_char;
            fragment.y = y;
            first_char += fragment.len();
            y += fragment.height();
            self.width = self.width.max(fragment.width);
            self.minimum_width = self.minimum_width.max(fragment.minimum_width);
            self.above_baseline = self.above_baseline.max(fragment.above_baseline);
            self.below_baseline = self.below_baseline.max(fragment.below_baseline);
        }
        self.num_chars = first_char;
        self.height = y;
    }
}
