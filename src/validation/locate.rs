//! Source positions for JSON pointers
//!
//! Scans already-valid JSON text once, recording where every object member and
//! array element starts, so instance errors can point back into the text.

/// Where a value sits in the source
#[derive(Debug)]
struct Spanned {
    offset: usize,
    kind: SpannedKind,
}

#[derive(Debug)]
enum SpannedKind {
    /// `(member name, offset of its key, value)`
    Object(Vec<(String, usize, Spanned)>),
    Array(Vec<Spanned>),
    Scalar,
}

pub(crate) struct SourceMap<'a> {
    text: &'a str,
    root: Option<Spanned>,
}

impl<'a> SourceMap<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut scanner = Scanner {
            bytes: text.as_bytes(),
            text,
            pos: 0,
        };
        let root = scanner.value();
        Self { text, root }
    }

    /// 1-based `(line, column)` of the deepest token on `pointer` that exists.
    ///
    /// A pointer into an object member resolves to the member's key; a missing
    /// segment resolves to the last container that was found.
    pub(crate) fn locate(&self, pointer: &str) -> Option<(usize, usize)> {
        let mut current = self.root.as_ref()?;
        let mut offset = current.offset;

        for segment in pointer_segments(pointer) {
            let next = match &current.kind {
                SpannedKind::Object(members) => members
                    .iter()
                    .find(|(name, _, _)| *name == segment)
                    .map(|(_, key_offset, value)| (*key_offset, value)),
                SpannedKind::Array(elements) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| elements.get(i))
                    .map(|element| (element.offset, element)),
                SpannedKind::Scalar => None,
            };
            match next {
                Some((at, value)) => {
                    offset = at;
                    current = value;
                }
                None => break,
            }
        }

        Some(line_column(self.text, offset))
    }
}

/// Split a JSON pointer into unescaped segments. `""` and `"/"` are the root.
pub(crate) fn pointer_segments(pointer: &str) -> impl Iterator<Item = String> + '_ {
    pointer
        .split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}

pub(crate) fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Byte offset of a 1-based line and 1-based byte column, clamped to the text
/// and moved back onto a character boundary. Column 0 means the line start.
pub(crate) fn byte_offset(text: &str, line: usize, byte_column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + byte_column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// 1-based line and character column of a byte offset
pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

struct Scanner<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl Scanner<'_> {
    fn skip_ws(&mut self) {
        while let Some(b) = self.bytes.get(self.pos) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Option<Spanned> {
        self.skip_ws();
        let offset = self.pos;
        let kind = match self.peek()? {
            b'{' => self.object()?,
            b'[' => self.array()?,
            b'"' => {
                self.string()?;
                SpannedKind::Scalar
            }
            _ => {
                self.scalar();
                SpannedKind::Scalar
            }
        };
        Some(Spanned { offset, kind })
    }

    fn object(&mut self) -> Option<SpannedKind> {
        self.pos += 1;
        let mut members = Vec::new();
        if self.eat(b'}') {
            return Some(SpannedKind::Object(members));
        }
        loop {
            self.skip_ws();
            let key_offset = self.pos;
            let (start, end) = self.string()?;
            let raw = &self.text[start..end];
            let name = serde_json::from_str::<String>(raw)
                .unwrap_or_else(|_| raw.trim_matches('"').to_string());
            if !self.eat(b':') {
                return None;
            }
            let value = self.value()?;
            members.push((name, key_offset, value));
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                return Some(SpannedKind::Object(members));
            }
            return None;
        }
    }

    fn array(&mut self) -> Option<SpannedKind> {
        self.pos += 1;
        let mut elements = Vec::new();
        if self.eat(b']') {
            return Some(SpannedKind::Array(elements));
        }
        loop {
            elements.push(self.value()?);
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                return Some(SpannedKind::Array(elements));
            }
            return None;
        }
    }

    /// Consume a string literal, returning its byte range including quotes
    fn string(&mut self) -> Option<(usize, usize)> {
        if self.peek() != Some(b'"') {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some((start, self.pos));
                }
                _ => self.pos += 1,
            }
        }
    }

    fn scalar(&mut self) {
        while let Some(b) = self.peek() {
            if matches!(b, b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r') {
                break;
            }
            self.pos += 1;
        }
    }
}
