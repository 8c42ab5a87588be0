// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers to inspect and check a model during testing.

use std::string::String;
use std::vec::Vec;

use crate::{BreakOpportunity, RichText};

/// Asserts that the model passes validation and that its character count
/// matches the text it holds.
#[track_caller]
pub(crate) fn assert_consistent(text: &RichText) {
    if let Err(e) = text.validate() {
        panic!("invalid model: {e}\n{:?}", fragment_texts(text));
    }
    assert_eq!(
        text.num_chars(),
        text.text().len(),
        "character count differs from the stored text"
    );
    let fragments: usize = text.fragments().count();
    assert_eq!(text.num_fragments(), fragments, "fragment count mismatch");
}

/// The visual text of every fragment, top to bottom.
pub(crate) fn fragment_texts(text: &RichText) -> Vec<String> {
    text.fragments().map(|f| f.visual_text()).collect()
}

/// The break class before every character, in logical order.
pub(crate) fn logical_breaks(text: &RichText) -> Vec<BreakOpportunity> {
    let base = text.direction();
    let mut out = Vec::new();
    for view in text.fragments() {
        let fragment = &text.fragments[view.id()];
        for v in fragment.logical_order(base) {
            out.push(fragment.breaks[v]);
        }
    }
    out
}
