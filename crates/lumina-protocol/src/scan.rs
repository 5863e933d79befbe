//! Delimiter scanning shared by the final and incremental parsers.
//!
//! Tags are matched ASCII case-insensitively and never inside a
//! `<![CDATA[ ... ]]>` section, so verbatim regions may contain anything that
//! looks like protocol markup. All offsets are byte offsets on char
//! boundaries.

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    Found(usize),
    /// Not present yet. Rescanning from the carried offset is enough to catch
    /// a later occurrence once more text arrives.
    Pending(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Element {
    pub start: usize,
    pub inner_start: usize,
    pub inner_end: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementScan {
    Closed(Element),
    /// Opening tag seen at this offset, closing tag not yet.
    Open(usize),
    Absent(usize),
}

fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if from > hay.len() {
        return None;
    }
    hay[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|p| p + from)
}

/// Earliest offset that could still begin a partial `needle` or CDATA opener.
fn resume_offset(text: &str, from: usize, needle_len: usize) -> usize {
    let keep = needle_len.max(CDATA_OPEN.len()) - 1;
    let mut offset = text.len().saturating_sub(keep).max(from);
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Find `needle` at or after `from`, skipping CDATA sections.
pub(crate) fn find_outside_cdata(text: &str, needle: &str, from: usize) -> Scan {
    let mut pos = from;
    loop {
        let hit = find_ci(text, needle, pos);
        let cdata = find_ci(text, CDATA_OPEN, pos);

        let cdata_start = match (hit, cdata) {
            (Some(h), Some(c)) if c < h => c,
            (Some(h), _) => return Scan::Found(h),
            (None, Some(c)) => c,
            (None, None) => return Scan::Pending(resume_offset(text, pos, needle.len())),
        };

        match find_ci(text, CDATA_CLOSE, cdata_start + CDATA_OPEN.len()) {
            Some(close) => pos = close + CDATA_CLOSE.len(),
            None => return Scan::Pending(cdata_start),
        }
    }
}

/// Locate the next `<tag>...</tag>` pair at or after `from`.
pub(crate) fn scan_element(text: &str, tag: &str, from: usize) -> ElementScan {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = match find_outside_cdata(text, &open, from) {
        Scan::Found(start) => start,
        Scan::Pending(resume) => return ElementScan::Absent(resume),
    };
    let inner_start = start + open.len();

    match find_outside_cdata(text, &close, inner_start) {
        Scan::Found(inner_end) => ElementScan::Closed(Element {
            start,
            inner_start,
            inner_end,
            end: inner_end + close.len(),
        }),
        Scan::Pending(_) => ElementScan::Open(start),
    }
}

/// First closed element in complete text.
pub(crate) fn element(text: &str, tag: &str) -> Option<Element> {
    match scan_element(text, tag, 0) {
        ElementScan::Closed(el) => Some(el),
        _ => None,
    }
}

/// Every closed element in complete text, in order.
pub(crate) fn elements(text: &str, tag: &str) -> Vec<Element> {
    let mut found = Vec::new();
    let mut from = 0;
    while let ElementScan::Closed(el) = scan_element(text, tag, from) {
        from = el.end;
        found.push(el);
    }
    found
}

pub(crate) fn inner<'a>(text: &'a str, el: &Element) -> &'a str {
    &text[el.inner_start..el.inner_end]
}

/// Trimmed text of the first `<tag>` element.
pub(crate) fn text_of(text: &str, tag: &str) -> Option<String> {
    element(text, tag).map(|el| inner(text, &el).trim().to_string())
}

/// Verbatim value of the first `<tag>` element.
///
/// When the element body is one or more adjacent CDATA sections (surrounding
/// whitespace allowed) their bodies are concatenated, which also decodes the
/// split-section idiom used to embed `]]>`. Any other body is taken literally
/// and untrimmed.
pub(crate) fn verbatim_of(text: &str, tag: &str) -> Option<String> {
    let el = element(text, tag)?;
    let body = inner(text, &el);
    Some(decode_cdata(body).unwrap_or_else(|| body.to_string()))
}

fn decode_cdata(body: &str) -> Option<String> {
    let mut rest = body.trim_start();
    if find_ci(rest, CDATA_OPEN, 0) != Some(0) {
        return None;
    }

    let mut value = String::new();
    while find_ci(rest, CDATA_OPEN, 0) == Some(0) {
        let section = &rest[CDATA_OPEN.len()..];
        let close = section.find(CDATA_CLOSE)?;
        value.push_str(&section[..close]);
        rest = &section[close + CDATA_CLOSE.len()..];
    }

    rest.trim().is_empty().then_some(value)
}
