//! Assistant text -> ordered prose and item-group segments.
//!
//! Two passes over the lines. The first marks each line as id-bearing or
//! not. The second builds paragraphs: consecutive id-bearing lines form one
//! paragraph, every other line is a paragraph of its own even when only a
//! single line break separates it from a list of ids, and blank lines only
//! separate. Id paragraphs become item groups; everything else stays prose.

use shopdb_core::{ContentSegment, Message, Role};

use crate::codec::IdCodec;
use crate::optimize::optimize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Ids(&'a str),
    Text(&'a str),
}

#[derive(Debug, PartialEq, Eq)]
enum Paragraph<'a> {
    Ids(Vec<&'a str>),
    Text(&'a str),
}

/// Split `text` into segments using `codec` to recognise ids. The final line
/// counts whether or not the text ends with a line break, so partially
/// streamed text tokenizes the same way as complete text.
pub fn tokenize_with(codec: &IdCodec, text: &str) -> Vec<ContentSegment> {
    let lines = text.lines().map(|line| if codec.contains_id(line) { Line::Ids(line) } else { Line::Text(line) });
    paragraphs(lines).into_iter().filter_map(|p| segment(codec, p)).collect()
}

pub fn tokenize(text: &str) -> Vec<ContentSegment> { tokenize_with(&IdCodec::default(), text) }

/// Tokenize and merge runs. An id whose closing marker has not arrived yet
/// stays prose.
pub fn parse_assistant_with(codec: &IdCodec, text: &str) -> Vec<ContentSegment> { optimize(tokenize_with(codec, text)) }

pub fn parse_assistant(text: &str) -> Vec<ContentSegment> { parse_assistant_with(&IdCodec::default(), text) }

/// Build an assistant message with its content already parsed.
pub fn assistant_message(codec: &IdCodec, content: impl Into<String>) -> Message {
    let mut message = Message::new(Role::Assistant, content);
    message.segments = parse_assistant_with(codec, &message.content);
    message
}

fn paragraphs<'a>(lines: impl Iterator<Item = Line<'a>>) -> Vec<Paragraph<'a>> {
    let mut out = Vec::new();
    let mut run: Vec<&'a str> = Vec::new();
    for line in lines {
        match line {
            Line::Ids(line) => run.push(line),
            Line::Text(line) => {
                if !run.is_empty() { out.push(Paragraph::Ids(std::mem::take(&mut run))); }
                out.push(Paragraph::Text(line));
            }
        }
    }
    if !run.is_empty() { out.push(Paragraph::Ids(run)); }
    out
}

fn segment(codec: &IdCodec, paragraph: Paragraph<'_>) -> Option<ContentSegment> {
    match paragraph {
        Paragraph::Ids(lines) => {
            let ids: Vec<String> = lines.iter().flat_map(|line| codec.find_ids(line)).collect();
            if !ids.is_empty() { return Some(ContentSegment::ItemGroup(ids)); }
            let text = lines.join("\n");
            let text = text.trim();
            (!text.is_empty()).then(|| ContentSegment::Prose(text.to_string()))
        }
        Paragraph::Text(line) => {
            let text = line.trim();
            (!text.is_empty()).then(|| ContentSegment::Prose(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prose(s: &str) -> ContentSegment { ContentSegment::Prose(s.to_string()) }

    fn group(ids: &[&str]) -> ContentSegment { ContentSegment::ItemGroup(ids.iter().map(|s| s.to_string()).collect()) }

    #[test]
    fn id_lines_group_and_text_lines_stand_alone() {
        let codec = IdCodec::default();
        let lines = ["Intro", "--A--", "--B--", "", "Outro"]
            .into_iter()
            .map(|l| if codec.contains_id(l) { Line::Ids(l) } else { Line::Text(l) });
        assert_eq!(
            paragraphs(lines),
            vec![
                Paragraph::Text("Intro"),
                Paragraph::Ids(vec!["--A--", "--B--"]),
                Paragraph::Text(""),
                Paragraph::Text("Outro"),
            ]
        );
    }

    #[test]
    fn blank_and_whitespace_lines_produce_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\n  \n\t\n").is_empty());
    }

    #[test]
    fn prose_inside_an_id_paragraph_is_discarded() {
        assert_eq!(tokenize("1. --A-- is lovely\n2. --B-- too"), vec![group(&["A", "B"])]);
    }

    #[test]
    fn unwrapped_to_nothing_keeps_the_line_as_prose() {
        assert_eq!(tokenize("-- . --"), vec![prose("-- . --")]);
    }

    #[test]
    fn every_text_line_is_its_own_paragraph() {
        assert_eq!(tokenize("one\ntwo\r\n\n\nthree"), vec![prose("one"), prose("two"), prose("three")]);
        assert_eq!(parse_assistant("one\ntwo"), vec![prose("one\n\ntwo")]);
    }

    #[test]
    fn assistant_message_carries_segments() {
        let message = assistant_message(&IdCodec::default(), "Try:\n--A--");
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.segments, vec![prose("Try:"), group(&["A"])]);
        assert!(message.has_items());
    }
}
