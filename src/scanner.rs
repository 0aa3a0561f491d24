//! Line cursor over an OBJ source buffer.
//!
//! The scanner hands out byte spans into the original buffer and never writes
//! to it. Each span is tagged with the directive found at its start. Nothing
//! is decoded here, so lines the loader skips may hold any bytes.

/// The directives the loader cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Position,
    TexCoord,
    Normal,
    Face,
    Other,
}

impl Directive {
    fn from_tag(tag: &[u8]) -> Directive {
        match tag {
            b"v" => Directive::Position,
            b"vt" => Directive::TexCoord,
            b"vn" => Directive::Normal,
            b"f" => Directive::Face,
            _ => Directive::Other,
        }
    }
}

/// One line of the source, excluding its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    pub start: usize,
    pub end: usize,
    pub directive: Directive,
    /// Offset of the first byte after the directive tag.
    pub body_start: usize,
}

impl Line {
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.start..self.end]
    }

    /// Everything after the directive tag.
    pub fn body<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        &source[self.body_start..self.end]
    }
}

fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

pub struct Scanner<'a> {
    source: &'a [u8],
    offset: usize,
    number: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Scanner {
            source,
            offset: 0,
            number: 0,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        let bytes = self.source;
        if self.offset >= bytes.len() {
            return None;
        }

        let start = self.offset;
        let newline = bytes[start..].iter().position(|&c| c == b'\n');
        let (mut end, next) = match newline {
            Some(n) => (start + n, start + n + 1),
            None => (bytes.len(), bytes.len()),
        };
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        self.offset = next;
        self.number += 1;

        let mut tag_start = start;
        while tag_start < end && is_space(bytes[tag_start]) {
            tag_start += 1;
        }
        let mut tag_end = tag_start;
        while tag_end < end && !is_space(bytes[tag_end]) {
            tag_end += 1;
        }

        Some(Line {
            number: self.number,
            start,
            end,
            directive: Directive::from_tag(&bytes[tag_start..tag_end]),
            body_start: tag_end,
        })
    }
}
