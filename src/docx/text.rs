//! Paragraph and run text.
//!
//! A run's visible text is the concatenation of its `w:t` contents, with
//! `w:tab` read as a tab and `w:br`/`w:cr` as a line break. Writing text back
//! replaces only those content children; `w:rPr` and anything else in the run
//! stays where it was, which is what keeps styling intact across a
//! substitution.

use super::xml::{Element, Node};

pub const PARAGRAPH: &str = "w:p";
pub const RUN: &str = "w:r";
const RUN_PROPERTIES: &str = "w:rPr";
const TEXT: &str = "w:t";
const TAB: &str = "w:tab";
const BREAK: &str = "w:br";
const CARRIAGE_RETURN: &str = "w:cr";

fn is_text_content(name: &str) -> bool {
    matches!(name, TEXT | TAB | BREAK | CARRIAGE_RETURN)
}

pub fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            TEXT => text.push_str(&child.text()),
            TAB => text.push('\t'),
            BREAK | CARRIAGE_RETURN => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Replace the run's text content, keeping its properties and other children.
pub fn set_run_text(run: &mut Element, text: &str) {
    run.children
        .retain(|n| !matches!(n, Node::Element(e) if is_text_content(&e.name)));

    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(run, &mut pending);
                let name = if ch == '\t' { TAB } else { BREAK };
                run.children.push(Node::Element(Element::new(name)));
            }
            _ => pending.push(ch),
        }
    }
    flush_text(run, &mut pending);
}

fn flush_text(run: &mut Element, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let t = Element::new(TEXT)
        .with_attr("xml:space", "preserve")
        .with_text(std::mem::take(pending));
    run.children.push(Node::Element(t));
}

pub fn runs(paragraph: &Element) -> impl Iterator<Item = &Element> {
    paragraph.child_elements(RUN)
}

pub fn runs_mut(paragraph: &mut Element) -> impl Iterator<Item = &mut Element> {
    paragraph.child_elements_mut(RUN)
}

pub fn paragraph_text(paragraph: &Element) -> String {
    runs(paragraph).map(run_text).collect()
}

/// Build a run with the given text and no properties.
pub fn new_run(text: &str) -> Element {
    let mut run = Element::new(RUN);
    set_run_text(&mut run, text);
    run
}

/// Build a paragraph holding a single plain run.
pub fn new_paragraph(text: &str) -> Element {
    let p = Element::new(PARAGRAPH);
    if text.is_empty() {
        p
    } else {
        p.with_child(new_run(text))
    }
}

/// Collapse the paragraph's text into its first run, dropping the rest.
///
/// Used when a token spans several runs: the first run's properties survive,
/// later runs (and their formatting) are lost.
pub fn set_paragraph_text(paragraph: &mut Element, text: &str) {
    let mut seen_run = false;
    paragraph.children.retain(|n| match n {
        Node::Element(e) if e.name == RUN => !std::mem::replace(&mut seen_run, true),
        _ => true,
    });

    match paragraph.find_child_mut(RUN) {
        Some(run) => set_run_text(run, text),
        None if !text.is_empty() => paragraph.children.push(Node::Element(new_run(text))),
        None => {}
    }
}
