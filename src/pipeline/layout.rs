//! Layout reconstruction: group text runs into lines and blocks.
//!
//! pdfium exposes a page as a flat list of page objects. Every text object
//! is one run of uniformly styled text with a bounding box, i.e. a [`Span`].
//! We rebuild the block → line → span hierarchy from geometry alone:
//!
//! ```text
//! spans (content order)
//!   │  same baseline, moving rightwards        → same Line
//!   │  otherwise                               → new Line
//!   ▼
//! lines
//!   │  vertical gap ≤ one line height, below   → same Block
//!   │  larger gap, or jumps upwards (column)   → new Block
//!   ▼
//! blocks
//! ```
//!
//! Coordinates are PDF user space: y grows upwards, so the line below has a
//! smaller `bottom`.

use serde::Serialize;

/// Baseline tolerance as a fraction of line height.
const SAME_LINE_TOLERANCE: f32 = 0.5;
/// A span may start this far (× height) left of the previous span's end and
/// still continue the line. Kerning and overlapping runs need some slack.
const BACKTRACK_TOLERANCE: f32 = 0.5;
/// A horizontal gap wider than this (× height) becomes a synthesized space.
const WORD_GAP: f32 = 0.25;
/// A vertical gap wider than this (× height) starts a new block.
const BLOCK_GAP: f32 = 1.0;

/// One run of text with its bounding box in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub text: String,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Span {
    pub fn new(text: impl Into<String>, left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            text: text.into(),
            left: left.min(right),
            right: left.max(right),
            bottom: bottom.min(top),
            top: bottom.max(top),
        }
    }

    fn height(&self) -> f32 {
        (self.top - self.bottom).max(1.0)
    }
}

/// Spans sharing a baseline, in content order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    /// Literal text of the line: span texts concatenated in order.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn left(&self) -> f32 {
        self.spans.iter().map(|s| s.left).fold(f32::INFINITY, f32::min)
    }

    fn right(&self) -> f32 {
        self.spans.iter().map(|s| s.right).fold(f32::NEG_INFINITY, f32::max)
    }

    fn bottom(&self) -> f32 {
        self.spans.iter().map(|s| s.bottom).fold(f32::INFINITY, f32::min)
    }

    fn top(&self) -> f32 {
        self.spans.iter().map(|s| s.top).fold(f32::NEG_INFINITY, f32::max)
    }

    fn height(&self) -> f32 {
        (self.top() - self.bottom()).max(1.0)
    }

    /// Whether `span` continues this line.
    fn accepts(&self, span: &Span) -> bool {
        let Some(last) = self.spans.last() else {
            return true;
        };
        let height = self.height().max(span.height());
        let same_baseline = (span.bottom - self.bottom()).abs() <= SAME_LINE_TOLERANCE * height;
        let moves_right = span.left >= last.right - BACKTRACK_TOLERANCE * height;
        same_baseline && moves_right
    }

    fn push(&mut self, mut span: Span) {
        if let Some(last) = self.spans.last() {
            let gap = span.left - last.right;
            let height = self.height().max(span.height());
            let has_space = last.text.ends_with(char::is_whitespace)
                || span.text.starts_with(char::is_whitespace);
            if gap > WORD_GAP * height && !has_space {
                span.text.insert(0, ' ');
            }
        }
        self.spans.push(span);
    }
}

/// Consecutive, vertically adjacent lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub lines: Vec<Line>,
}

impl Block {
    /// The block's paragraph: every line's text followed by one space, the
    /// whole trimmed.
    pub fn paragraph(&self) -> String {
        let mut paragraph = String::new();
        for line in &self.lines {
            paragraph.push_str(&line.text());
            paragraph.push(' ');
        }
        paragraph.trim().to_string()
    }

    /// Whether `line` continues this block.
    fn accepts(&self, line: &Line) -> bool {
        let Some(prev) = self.lines.last() else {
            return true;
        };
        let height = prev.height().max(line.height());
        // Moving up the page means a new column or a floating element.
        if line.top() > prev.top() + SAME_LINE_TOLERANCE * height {
            return false;
        }
        let gap = prev.bottom() - line.top();
        if gap > BLOCK_GAP * height {
            return false;
        }
        // Lines must overlap horizontally to belong together.
        line.left() <= prev.right() && line.right() >= prev.left()
    }
}

/// Group spans (in content order) into blocks of lines.
///
/// Spans with empty text are dropped. The result preserves content order.
/// PDF affine matrix `[a b c d e f]`: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
///
/// Objects nested in a form XObject report bounds in the form's own space;
/// composing the form matrices maps them back onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self` first, then `outer`.
    pub fn then(self, outer: Transform) -> Transform {
        Transform {
            a: outer.a * self.a + outer.c * self.b,
            b: outer.b * self.a + outer.d * self.b,
            c: outer.a * self.c + outer.c * self.d,
            d: outer.b * self.c + outer.d * self.d,
            e: outer.a * self.e + outer.c * self.f + outer.e,
            f: outer.b * self.e + outer.d * self.f + outer.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Axis-aligned box around the transformed rectangle, as
    /// `(left, bottom, right, top)`.
    pub fn apply_rect(&self, left: f32, bottom: f32, right: f32, top: f32) -> (f32, f32, f32, f32) {
        let corners = [
            self.apply(left, bottom),
            self.apply(left, top),
            self.apply(right, bottom),
            self.apply(right, top),
        ];
        corners.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(l, b, r, t), &(x, y)| (l.min(x), b.min(y), r.max(x), t.max(y)),
        )
    }
}

pub fn group_spans(spans: impl IntoIterator<Item = Span>) -> Vec<Block> {
    let mut lines: Vec<Line> = Vec::new();
    let mut current = Line::default();

    for span in spans.into_iter().filter(|s| !s.text.is_empty()) {
        if !current.accepts(&span) {
            lines.push(std::mem::take(&mut current));
        }
        current.push(span);
    }
    if !current.spans.is_empty() {
        lines.push(current);
    }

    let mut blocks: Vec<Block> = Vec::new();
    let mut block = Block::default();
    for line in lines {
        if !block.accepts(&line) {
            blocks.push(std::mem::take(&mut block));
        }
        block.lines.push(line);
    }
    if !block.lines.is_empty() {
        blocks.push(block);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 12pt span whose baseline sits at `y`, 6pt per character wide.
    fn span(text: &str, x: f32, y: f32) -> Span {
        let width = 6.0 * text.chars().count() as f32;
        Span::new(text, x, y, x + width, y + 12.0)
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(group_spans(Vec::new()).is_empty());
    }

    #[test]
    fn empty_spans_are_dropped() {
        let blocks = group_spans(vec![span("", 72.0, 700.0)]);
        assert!(blocks.is_empty());
    }

    #[test]
    fn adjacent_spans_share_a_line() {
        let blocks = group_spans(vec![span("Hel", 72.0, 700.0), span("lo", 90.0, 700.0)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].lines[0].text(), "Hello");
    }

    #[test]
    fn wide_gap_synthesizes_space() {
        let blocks = group_spans(vec![span("Hello", 72.0, 700.0), span("World", 120.0, 700.0)]);
        assert_eq!(blocks[0].lines[0].text(), "Hello World");
    }

    #[test]
    fn existing_space_is_not_doubled() {
        let blocks = group_spans(vec![span("Hello ", 72.0, 700.0), span("World", 120.0, 700.0)]);
        assert_eq!(blocks[0].lines[0].text(), "Hello World");
    }

    #[test]
    fn stacked_lines_form_one_block() {
        let blocks = group_spans(vec![span("Hello", 72.0, 720.0), span("World", 72.0, 706.0)]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[0].paragraph(), "Hello World");
    }

    #[test]
    fn large_vertical_gap_splits_blocks() {
        let blocks = group_spans(vec![
            span("Title", 72.0, 720.0),
            span("Body text", 72.0, 600.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].paragraph(), "Title");
        assert_eq!(blocks[1].paragraph(), "Body text");
    }

    #[test]
    fn jump_up_the_page_starts_new_block() {
        // Left column ends low, right column starts at the top again.
        let blocks = group_spans(vec![
            span("left top", 72.0, 720.0),
            span("left low", 72.0, 706.0),
            span("right top", 320.0, 720.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].paragraph(), "right top");
    }

    #[test]
    fn jump_back_left_on_same_baseline_starts_new_line() {
        let line = {
            let mut l = Line::default();
            l.push(span("abcdefghij", 72.0, 700.0));
            l
        };
        assert!(!line.accepts(&span("x", 10.0, 700.0)));
        assert!(line.accepts(&span("x", 140.0, 700.0)));
    }

    #[test]
    fn paragraph_trims_trailing_line_space() {
        let block = Block {
            lines: vec![
                Line { spans: vec![span("  alpha", 72.0, 700.0)] },
                Line { spans: vec![span("beta  ", 72.0, 686.0)] },
            ],
        };
        assert_eq!(block.paragraph(), "alpha beta");
    }

    #[test]
    fn span_new_normalises_box() {
        let s = Span::new("x", 10.0, 20.0, 5.0, 8.0);
        assert_eq!((s.left, s.right, s.bottom, s.top), (5.0, 10.0, 8.0, 20.0));
    }

    #[test]
    fn identity_leaves_boxes_alone() {
        let t = Transform::IDENTITY;
        assert_eq!(t.apply_rect(72.0, 700.0, 100.0, 712.0), (72.0, 700.0, 100.0, 712.0));
    }

    #[test]
    fn translated_form_box_lands_in_page_space() {
        let form = Transform::new(1.0, 0.0, 0.0, 1.0, 50.0, -100.0);
        assert_eq!(form.apply_rect(72.0, 700.0, 100.0, 712.0), (122.0, 600.0, 150.0, 612.0));
    }

    #[test]
    fn nested_forms_compose_inner_first() {
        let inner = Transform::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let outer = Transform::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0);
        // Scale, then translate.
        assert_eq!(inner.then(outer).apply(5.0, 5.0), (20.0, 30.0));
        // Translate, then scale.
        assert_eq!(outer.then(inner).apply(5.0, 5.0), (30.0, 50.0));
    }

    #[test]
    fn rotation_keeps_box_axis_aligned() {
        // 90° counter-clockwise.
        let rot = Transform::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
        assert_eq!(rot.apply_rect(0.0, 0.0, 10.0, 2.0), (-2.0, 0.0, 0.0, 10.0));
    }
}
