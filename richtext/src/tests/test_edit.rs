// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::string::ToString;

use crate::{BaseDirection, Direction, RichTextOptions};

use super::utils::{assert_consistent, fragment_texts, TestEnv};

#[test]
fn empty_editor_takes_direction_from_first_text() {
    let env = TestEnv::new();
    let mut text = env.editor("", 0);
    assert_eq!(text.num_chars(), 1);
    assert_eq!(text.direction(), Direction::LeftToRight);
    let at = text.begin().unwrap();
    let end = text.insert(at, "שלום").unwrap();
    assert_eq!(text.direction(), Direction::RightToLeft);
    assert_eq!(text.text().to_string(), "שלום\n");
    assert_eq!(text.pos(end).unwrap(), 4);
    assert_eq!(text.pos(at).unwrap(), 4);
    assert_consistent(&text);
}

#[test]
fn multi_line_insert() {
    let env = TestEnv::new();
    let mut text = env.label("start end", 0);
    let at = text.at(6).unwrap();
    let before = text.at(2).unwrap();
    let end = text.insert(at, "one\ntwo\nthree ").unwrap();
    assert_consistent(&text);
    assert_eq!(fragment_texts(&text), ["start one\n", "two\n", "three end"]);
    assert_eq!(text.num_paragraphs(), 3);
    assert_eq!(text.pos(end).unwrap(), 20);
    assert_eq!(text.pos(at).unwrap(), 20);
    assert_eq!(text.pos(before).unwrap(), 2);
}

#[test]
fn crlf_is_one_break() {
    let env = TestEnv::new();
    let mut text = env.label("ab\r\ncd", 0);
    assert_eq!(text.num_paragraphs(), 2);
    assert_eq!(text.num_chars(), 6);
    let end = text.end().unwrap();
    text.insert(end, "x\r\ny").unwrap();
    assert_eq!(text.num_paragraphs(), 3);
    assert_eq!(text.text().to_string(), "ab\r\ncdx\r\ny");
    assert_consistent(&text);
}

#[test]
fn remove_everything() {
    let env = TestEnv::new();
    let mut text = env.label("abc\ndef", 0);
    let from = text.begin().unwrap();
    let to = text.end().unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(text.num_chars(), 0);
    assert_eq!(text.num_paragraphs(), 1);
    assert_eq!(text.num_fragments(), 1);
    assert_eq!(text.pos(to).unwrap(), 0);
    assert_consistent(&text);

    let mut editor = env.editor("abc\ndef", 0);
    let from = editor.begin().unwrap();
    let to = editor.end().unwrap();
    editor.remove(from, to).unwrap();
    assert_eq!(editor.text().to_string(), "\n");
    assert_consistent(&editor);
}

#[test]
fn editor_keeps_trailing_newline() {
    let env = TestEnv::new();
    let mut text = env.editor("ab", 0);
    let from = text.at(1).unwrap();
    let to = text.end().unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(text.text().to_string(), "a\n");
    assert_eq!(text.pos(to).unwrap(), 1);
    assert_consistent(&text);
}

#[test]
fn replace_word() {
    let env = TestEnv::new();
    let mut text = env.label("hello world", 0);
    let from = text.at(6).unwrap();
    let to = text.at(11).unwrap();
    let end = text.replace(from, to, "there").unwrap();
    assert_eq!(text.text().to_string(), "hello there");
    assert_eq!(text.pos(end).unwrap(), 11);
    assert_eq!(text.num_locations(), 3);
    assert_consistent(&text);
}

#[test]
fn replacing_all_of_an_editor_resets_it() {
    let env = TestEnv::new();
    let mut text = env.editor("abc", 0);
    let from = text.begin().unwrap();
    let to = text.end().unwrap();
    let end = text.replace(from, to, "שלום").unwrap();
    assert_eq!(text.direction(), Direction::RightToLeft);
    assert_eq!(text.pos(end).unwrap(), 4);
    assert_consistent(&text);
}

#[test]
fn set_moves_locations() {
    let env = TestEnv::new();
    let mut text = env.label("abc", 0);
    let middle = text.at(1).unwrap();
    let end = text.end().unwrap();
    text.set("hello").unwrap();
    assert_eq!(text.pos(middle).unwrap(), 0);
    assert_eq!(text.pos(end).unwrap(), 5);
    assert_consistent(&text);
}

#[test]
fn insert_right_to_left_into_left_to_right() {
    let env = TestEnv::new();
    let mut text = env.label("ab cd", 0);
    let at = text.at(3).unwrap();
    text.insert(at, "אבג ").unwrap();
    assert_eq!(text.text().to_string(), "ab אבג cd");
    assert_eq!(fragment_texts(&text), ["ab גבא cd"]);
    assert_consistent(&text);
}

#[test]
fn edits_keep_lines_wrapped() {
    let env = TestEnv::new();
    let mut text = env.label("aaa bbb", 40);
    let at = text.at(4).unwrap();
    text.insert(at, "ccc ").unwrap();
    assert_eq!(fragment_texts(&text), ["aaa ", "ccc ", "bbb"]);
    assert_consistent(&text);

    let from = text.at(3).unwrap();
    let to = text.at(8).unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(fragment_texts(&text), ["aaabbb"]);
    assert_consistent(&text);
}

#[test]
fn empty_insert_changes_nothing() {
    let env = TestEnv::new();
    let mut text = env.label("abc", 0);
    let at = text.at(1).unwrap();
    let same = text.insert(at, "").unwrap();
    assert_eq!(text.pos(same).unwrap(), 1);
    assert_eq!(text.num_chars(), 3);
    // Formatting characters alone insert nothing either.
    text.insert(at, "\u{202E}\u{202C}").unwrap();
    assert_eq!(text.num_chars(), 3);
    assert_consistent(&text);
}

#[test]
fn first_insert_into_empty_editor_keeps_anchor_in_front() {
    let env = TestEnv::new();
    let mut text = env.editor("", 0);
    let anchor = text.begin().unwrap();
    text.set_do_not_adjust(anchor, true).unwrap();
    let caret = text.begin().unwrap();
    let end = text.insert(caret, "abc").unwrap();
    assert_eq!(text.pos(anchor).unwrap(), 0);
    assert_eq!(text.pos(caret).unwrap(), 3);
    assert_eq!(text.pos(end).unwrap(), 3);
    assert_consistent(&text);
}

#[test]
fn neutrals_take_the_direction_of_their_neighbours() {
    let env = TestEnv::new();
    let options = RichTextOptions::label().with_direction(BaseDirection::LeftToRight);

    let mut text = env.build("אבגד", options);
    let at = text.at(2).unwrap();
    text.insert(at, " ").unwrap();
    assert_eq!(text.text().to_string(), "אב גד");
    assert_eq!(fragment_texts(&text), fragment_texts(&env.build("אב גד", options)));
    assert_eq!(fragment_texts(&text), ["דג בא"]);
    assert_consistent(&text);

    let mut text = env.build("אב x גד", options);
    assert_eq!(fragment_texts(&text), ["בא x דג"]);
    let from = text.at(3).unwrap();
    let to = text.at(4).unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(fragment_texts(&text), fragment_texts(&env.build("אב  גד", options)));
    assert_eq!(fragment_texts(&text), ["דג  בא"]);
    assert_consistent(&text);
}

#[test]
fn digits_inside_right_to_left_text() {
    let env = TestEnv::new();
    let text = env.label("abc אבג 123", 0);
    assert_eq!(fragment_texts(&text), ["abc 123 גבא"]);
    assert_consistent(&text);

    // The digits stay together and come last on a narrow line.
    let text = env.label("abc אבג 123", 40);
    assert_eq!(fragment_texts(&text), ["abc ", " גבא", "123"]);
    assert_consistent(&text);

    let mut text = env.label("abc אבג", 0);
    let end = text.end().unwrap();
    text.insert(end, " 123").unwrap();
    assert_eq!(fragment_texts(&text), ["abc 123 גבא"]);
    assert_consistent(&text);
}

#[test]
fn edits_leave_other_paragraphs_attached() {
    let env = TestEnv::new();
    let mut text = env.label("ab\ncd\nef", 0);
    let before = text.at(1).unwrap();
    let after = text.at(7).unwrap();
    let anchored = text.locations[after].clone();

    let at = text.at(4).unwrap();
    text.insert(at, "xyz").unwrap();
    assert_eq!(text.text().to_string(), "ab\ncxyzd\nef");
    assert_eq!(text.pos(before).unwrap(), 1);
    assert_eq!(text.pos(after).unwrap(), 10);
    let location = &text.locations[after];
    assert_eq!(location.fragment, anchored.fragment);
    assert_eq!(location.offset, anchored.offset);

    let from = text.at(3).unwrap();
    let to = text.at(5).unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(text.pos(after).unwrap(), 8);
    assert_eq!(text.locations[after].fragment, anchored.fragment);
    assert_consistent(&text);
}

#[test]
fn carriage_return_and_line_feed_rejoin() {
    let env = TestEnv::new();
    let mut text = env.label("ab\rXY\ncd", 0);
    assert_eq!(text.num_paragraphs(), 3);
    let from = text.at(3).unwrap();
    let to = text.at(5).unwrap();
    text.remove(from, to).unwrap();
    assert_eq!(text.text().to_string(), "ab\r\ncd");
    assert_eq!(text.num_paragraphs(), 2);
    assert_eq!(fragment_texts(&text), ["ab\r\n", "cd"]);
    assert_consistent(&text);

    let mut text = env.label("ab\r", 0);
    let end = text.end().unwrap();
    text.insert(end, "\n").unwrap();
    assert_eq!(text.num_paragraphs(), 1);
    assert_eq!(text.pos(end).unwrap(), 4);
    assert_consistent(&text);
}
