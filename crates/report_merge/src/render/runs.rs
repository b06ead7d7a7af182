//! Text-run scanning over WordprocessingML
//!
//! Word splits typed text into runs whenever formatting, spell checking or
//! revision marks change, so a tag written as `{{EVIDENCNI}}` may arrive as
//! `{{EVI` in one `<w:t>` and `DENCNI}}` in the next. Everything here works on
//! the XML text directly and only ever moves characters between `<w:t>`
//! contents.

use std::ops::Range;

/// One `<w:t>` element: its start tag and its character content
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextRun {
    pub open: Range<usize>,
    pub content: Range<usize>,
}

/// Kind of a delimited tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Var,
    Open,
    Inverted,
    Close,
}

/// A tag found in text, with its byte span including delimiters
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTag {
    pub start: usize,
    pub end: usize,
    pub kind: TagKind,
    pub name: String,
}

impl RawTag {
    pub fn is_section(&self) -> bool {
        self.kind != TagKind::Var
    }
}

/// Every non-empty `<w:t>` element in document order
pub(crate) fn text_runs(xml: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut pos = 0;

    while let Some(found) = xml[pos..].find("<w:t") {
        let start = pos + found;
        let after = start + "<w:t".len();
        pos = after;
        if !xml[after..].starts_with(|c: char| c == '>' || c.is_whitespace()) {
            continue;
        }
        let Some(gt) = xml[after..].find('>') else {
            break;
        };
        let open_end = after + gt + 1;
        if xml[..open_end].ends_with("/>") {
            pos = open_end;
            continue;
        }
        let Some(close) = xml[open_end..].find("</w:t>") else {
            break;
        };
        let content_end = open_end + close;
        runs.push(TextRun {
            open: start..open_end,
            content: open_end..content_end,
        });
        pos = content_end + "</w:t>".len();
    }

    runs
}

/// Scan text for `open … close` delimited tags.
///
/// A leading `#` opens a section, `^` opens an inverted section and `/`
/// closes one. Tags with an empty name or with markup inside are skipped.
pub(crate) fn scan_tags(text: &str, open: &str, close: &str) -> Vec<RawTag> {
    let mut tags = Vec::new();
    if open.is_empty() || close.is_empty() {
        return tags;
    }
    let mut pos = 0;

    while let Some(found) = text[pos..].find(open) {
        let start = pos + found;
        let inner_start = start + open.len();
        let Some(len) = text[inner_start..].find(close) else {
            break;
        };
        let end = inner_start + len + close.len();
        let inner = text[inner_start..inner_start + len].trim();

        let (kind, name) = match inner.chars().next() {
            Some('#') => (TagKind::Open, &inner[1..]),
            Some('^') => (TagKind::Inverted, &inner[1..]),
            Some('/') => (TagKind::Close, &inner[1..]),
            _ => (TagKind::Var, inner),
        };
        let name = name.trim();
        if name.is_empty() || name.contains('<') || name.contains(open) {
            pos = inner_start;
            continue;
        }

        tags.push(RawTag {
            start,
            end,
            kind,
            name: name.to_string(),
        });
        pos = end;
    }

    tags
}

/// Move every tag split across several `<w:t>` elements into the element
/// where it starts.
///
/// Text elements that end up holding a tag are marked `xml:space="preserve"`
/// so substituted values keep their surrounding spaces. Parts without text
/// runs are returned unchanged.
pub(crate) fn normalize_split_tags(xml: &str, open: &str, close: &str) -> String {
    let runs = text_runs(xml);
    if runs.is_empty() {
        return xml.to_string();
    }

    let mut concat = String::new();
    let mut starts = Vec::with_capacity(runs.len());
    for run in &runs {
        starts.push(concat.len());
        concat.push_str(&xml[run.content.clone()]);
    }

    let tags = scan_tags(&concat, open, close);
    if tags.is_empty() {
        return xml.to_string();
    }

    let run_at = |offset: usize| starts.partition_point(|&s| s <= offset).saturating_sub(1);

    let mut owner = vec![0usize; concat.len()];
    for (i, run) in runs.iter().enumerate() {
        let start = starts[i];
        owner[start..start + run.content.len()].fill(i);
    }

    let mut preserve = vec![false; runs.len()];
    for tag in &tags {
        let first = run_at(tag.start);
        let last = run_at(tag.end - 1);
        if first != last {
            owner[tag.start..tag.end].fill(first);
        }
        preserve[first] = true;
    }

    let mut contents = vec![String::new(); runs.len()];
    let mut i = 0;
    while i < concat.len() {
        let run = owner[i];
        let mut j = i + 1;
        while j < concat.len() && owner[j] == run {
            j += 1;
        }
        contents[run].push_str(&concat[i..j]);
        i = j;
    }

    let mut out = String::with_capacity(xml.len() + 32);
    let mut cursor = 0;
    for (i, run) in runs.iter().enumerate() {
        out.push_str(&xml[cursor..run.open.start]);
        let start_tag = &xml[run.open.clone()];
        if preserve[i] && !start_tag.contains("xml:space") {
            out.push_str(r#"<w:t xml:space="preserve">"#);
        } else {
            out.push_str(start_tag);
        }
        out.push_str(&contents[i]);
        cursor = run.content.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

/// Start or end tag of a named element, with its byte span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementTag {
    Open(usize),
    Close(usize, usize),
}

/// Start and end tags of `name`, in document order. Self-closing elements
/// and longer names sharing the prefix (`w:pPr` for `w:p`) are skipped.
fn element_tags<'a>(xml: &'a str, name: &'a str) -> impl Iterator<Item = ElementTag> + 'a {
    let name_ends = |rest: &str| rest.starts_with(|c: char| c == '>' || c == '/' || c.is_whitespace());
    xml.match_indices('<').filter_map(move |(at, _)| {
        let rest = &xml[at + 1..];
        let gt = at + xml[at..].find('>')?;
        if let Some(after) = rest.strip_prefix('/').and_then(|r| r.strip_prefix(name)) {
            return name_ends(after).then_some(ElementTag::Close(at, gt + 1));
        }
        let after = rest.strip_prefix(name)?;
        (name_ends(after) && !xml[..gt].ends_with('/')).then_some(ElementTag::Open(at))
    })
}

/// Span of the innermost `<name …>…</name>` element containing `pos`.
///
/// Start and end tags are paired by nesting depth, so closed elements of the
/// same name between the start tag and `pos` do not hide the container.
pub fn enclosing(xml: &str, pos: usize, name: &str) -> Option<Range<usize>> {
    let pos = pos.min(xml.len());
    let mut open = Vec::new();
    let mut depth = 0usize;
    for tag in element_tags(xml, name) {
        match tag {
            ElementTag::Open(at) if at < pos => open.push(at),
            ElementTag::Close(at, _) if at < pos => {
                open.pop();
            }
            ElementTag::Open(_) => depth += 1,
            ElementTag::Close(_, end) => {
                if depth == 0 {
                    return open.last().map(|&start| start..end);
                }
                depth -= 1;
            }
        }
    }
    None
}

/// Concatenated `<w:t>` text of an XML fragment
pub(crate) fn plain_text(xml: &str) -> String {
    text_runs(xml)
        .into_iter()
        .map(|run| &xml[run.content])
        .collect()
}
