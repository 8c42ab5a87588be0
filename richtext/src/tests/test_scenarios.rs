// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::string::ToString;
use std::vec::Vec;

use crate::{BreakOpportunity, MergeKind, RunDirection, SplitKind, SplitRule};

use super::utils::{assert_consistent, fragment_texts, logical_breaks, TestEnv};

#[test]
fn override_run_breaks() {
    let env = TestEnv::new();
    let text = env.label("Lorem Ipsum\u{202E}Dolor Sit\u{202C} Amet", 0);
    assert_consistent(&text);
    assert_eq!(text.num_paragraphs(), 1);
    assert_eq!(text.num_fragments(), 1);
    assert_eq!(text.num_chars(), 25);

    let breaks = logical_breaks(&text);
    // Before "Ipsum", where the overridden run starts and where it ends.
    for pos in [6, 11, 20] {
        assert_eq!(breaks[pos], BreakOpportunity::Allowed, "no break at {pos}");
    }
    // The line segmenter also allows breaking before "Sit" inside the run
    // and before "Amet" after the space that follows it.
    let others: Vec<usize> = breaks
        .iter()
        .enumerate()
        .filter(|(i, b)| b.is_break() && ![6, 11, 20].contains(i))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(others, [17, 21]);
    assert!(breaks.iter().all(|b| *b != BreakOpportunity::Mandatory));

    let view = text.fragments().next().unwrap();
    assert_eq!(view.visual_text(), "Lorem IpsumtiS roloD Amet");
    assert_eq!(view.run_direction(), RunDirection::Mixed);
}

#[test]
fn newline_insert_splits_paragraph() {
    let env = TestEnv::new();
    let mut text = env.label("Helloworld ", 0);
    let stays = text.at(5).unwrap();
    text.set_do_not_adjust(stays, true).unwrap();
    let moves = text.at(5).unwrap();

    let end = text.insert(moves, "\n").unwrap();
    assert_consistent(&text);
    assert_eq!(text.num_paragraphs(), 2);
    assert_eq!(fragment_texts(&text), ["Hello\n", "world "]);
    let views: Vec<_> = text.fragments().collect();
    assert_eq!(views[0].logical_text().len(), 6);
    assert_eq!(views[1].logical_text().len(), 6);

    assert_eq!(text.pos(stays).unwrap(), 5);
    assert_eq!(text.pos(moves).unwrap(), 6);
    assert_eq!(text.pos(end).unwrap(), 6);
    assert_eq!(text.fragment_at(5).unwrap().0, views[0].id());
    assert_eq!(text.fragment_at(6).unwrap().0, views[1].id());
}

#[test]
fn bidi_merge_across_paragraphs() {
    let env = TestEnv::new();
    let mut text = env.rtl_label("lorem ipsum\ndolorsit amet", 0);
    assert_consistent(&text);
    assert_eq!(fragment_texts(&text), ["\nlorem ipsum", "dolorsit amet"]);

    let first = text.fragments().next().unwrap().id();
    assert!(text.merge_fragment(first, MergeKind::Bidi).unwrap());
    assert_eq!(text.num_paragraphs(), 1);
    assert_eq!(text.num_fragments(), 1);
    let view = text.fragment(first).unwrap();
    assert_eq!(view.text().to_string(), "dolorsit amet\nlorem ipsum");
    assert_eq!(view.text().run_starts().collect::<Vec<_>>(), [0, 13, 14]);
    assert_eq!(text.num_chars(), 25);
}

#[test]
fn remove_across_paragraphs_after_split() {
    let env = TestEnv::new();
    let mut text = env.label("0123456789 abcdefghi\nlorem ipsum dolor\nsit amet conse", 0);
    assert_eq!(text.num_chars(), 53);
    assert_eq!(text.num_paragraphs(), 3);

    let (fragment, offset) = text.fragment_at(10).unwrap();
    text.split_fragment(fragment, offset, SplitKind::LeftToRight, SplitRule::Unconditional)
        .unwrap();
    assert_eq!(text.num_fragments(), 4);

    let from = text.at(8).unwrap();
    let to = text.at(50).unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(text.num_chars(), 53 - 42);
    assert_eq!(text.text().to_string(), "01234567nse");
    assert_eq!(text.num_paragraphs(), 1);
    assert_eq!(text.pos(from).unwrap(), 8);
    assert_eq!(text.pos(to).unwrap(), 8);
    assert_consistent(&text);
}
