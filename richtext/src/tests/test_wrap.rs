// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::testing::FixedFontMetrics;
use crate::{Alignment, Direction, WrapStep};

use super::utils::{assert_consistent, fragment_texts, TestEnv};

#[test]
fn wraps_at_spaces() {
    let env = TestEnv::new();
    let mut text = env.label("aaa bbb ccc", 40);
    assert_consistent(&text);
    assert_eq!(fragment_texts(&text), ["aaa ", "bbb ", "ccc"]);
    assert_eq!(text.height(), 3 * 12);
    let ys: Vec<u32> = text.fragments().map(|f| f.y()).collect();
    assert_eq!(ys, [0, 12, 24]);

    assert!(!text.rewrap(40).unwrap());
    assert!(text.rewrap(0).unwrap());
    assert_eq!(fragment_texts(&text), ["aaa bbb ccc"]);
    assert!(!text.unwrap().unwrap());
    assert_consistent(&text);
}

#[test]
fn long_word_overflows() {
    let env = TestEnv::new();
    let text = env.label("a verylongword b", 50);
    assert_consistent(&text);
    assert_eq!(fragment_texts(&text), ["a ", "verylongword ", "b"]);
    assert_eq!(text.width(), 130);
    assert_eq!(text.minimum_width(), 130);
}

#[test]
fn absorbs_when_widened() {
    let env = TestEnv::new();
    let mut text = env.label("aa bbbbbb", 80);
    assert_eq!(fragment_texts(&text), ["aa ", "bbbbbb"]);
    // The next fragment has no break, so all of it must fit.
    assert!(text.rewrap(89).unwrap());
    assert_eq!(text.num_fragments(), 2);
    assert!(text.rewrap(90).unwrap());
    assert_eq!(fragment_texts(&text), ["aa bbbbbb"]);
    assert_consistent(&text);
}

#[test]
fn wrap_steps() {
    let env = TestEnv::new();
    let mut text = env.label("aaa bbb ccc", 40);
    let first = text.fragments().next().unwrap().id();

    text.word_wrap_width = 80;
    let step = text.with_mutation(|m| m.rewrap_fragment(first)).unwrap();
    assert_eq!(step, WrapStep { toosmall: true, toobig: false });
    assert_eq!(fragment_texts(&text), ["aaa bbb ", "ccc"]);

    text.word_wrap_width = 30;
    let step = text.with_mutation(|m| m.rewrap_fragment(first)).unwrap();
    assert_eq!(step, WrapStep { toosmall: false, toobig: true });
    assert_eq!(fragment_texts(&text), ["aaa ", "bbb ", "ccc"]);
}

#[test]
fn right_to_left_lines() {
    let env = TestEnv::new();
    let text = env.label("אבג דהו", 40);
    assert_consistent(&text);
    assert_eq!(text.direction(), Direction::RightToLeft);
    // Each line reads from the right, so the first line ends on the left.
    assert_eq!(fragment_texts(&text), [" גבא", "והד"]);
    let xs: Vec<u32> = text.fragments().map(|f| f.x()).collect();
    assert_eq!(xs, [0, 10]);
    let firsts: Vec<usize> = text.fragments().map(|f| f.first_char()).collect();
    assert_eq!(firsts, [0, 4]);
}

#[test]
fn embedded_run_is_not_cut_inside() {
    let env = TestEnv::new();
    let text = env.label("abc אבג def", 50);
    assert_consistent(&text);
    assert_eq!(text.direction(), Direction::LeftToRight);
    assert_eq!(fragment_texts(&text), ["abc ", "גבא ", "def"]);

    let mut unwrapped = env.label("abc אבג def", 0);
    assert_eq!(fragment_texts(&unwrapped), ["abc גבא def"]);
    unwrapped.rewrap(50).unwrap();
    assert_eq!(fragment_texts(&unwrapped), fragment_texts(&text));
}

#[test]
fn alignment_moves_lines() {
    let env = TestEnv::new();
    let mut text = env.label("aaa bb", 40);
    assert_eq!(fragment_texts(&text), ["aaa ", "bb"]);
    let xs = |text: &crate::RichText| text.fragments().map(|f| f.x()).collect::<Vec<_>>();
    assert_eq!(xs(&text), [0, 0]);
    text.set_alignment(Alignment::End);
    assert_eq!(xs(&text), [0, 20]);
    text.set_alignment(Alignment::Middle);
    assert_eq!(xs(&text), [0, 10]);
}

#[test]
fn kerning_counts_towards_width() {
    let env = TestEnv::with_fonts(FixedFontMetrics::new(10).with_kerning('A', 'V', -5));
    let text = env.label("AVAV AV", 35);
    assert_consistent(&text);
    // "AVAV " is 50 - 10 = 40 wide, too much for 35.
    assert_eq!(fragment_texts(&text), ["AVAV ", "AV"]);
    let first = text.fragments().next().unwrap();
    assert_eq!(first.width(), 40);
    assert_eq!(first.edges(), [0, 5, 15, 20, 30, 40]);
    assert_eq!(first.advances(), [5, 10, 5, 10, 10]);
}
