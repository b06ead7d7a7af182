//! Loop-aware tag rendering
//!
//! Tags are written between configurable delimiters (`{{` and `}}` by
//! default):
//!
//! - `{{NAME}}` substitutes a value, looked up in the innermost scope first
//!   and then in every enclosing scope
//! - `{{#NAME}}…{{/NAME}}` repeats the block once per list item, renders it
//!   once for a group or a non-empty text, and drops it otherwise
//! - `{{^NAME}}…{{/NAME}}` renders the block only when `NAME` is missing or
//!   empty
//!
//! Section pairing is validated across all parts before anything is
//! rendered.

use super::runs::{enclosing, normalize_split_tags, plain_text, scan_tags, RawTag, TagKind};
use crate::error::{MergeError, Result, TagIssue, TagIssueKind, UnresolvedTag};
use crate::model::{TemplateScope, TemplateValue};
use crate::text::escape_xml;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Markup inserted for a newline inside a substituted value
pub const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// Tag delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Options for loop-aware rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub delimiters: Delimiters,
    /// Turn newlines in values into line breaks
    pub linebreaks: bool,
    /// Drop the paragraph of a section tag that stands alone in it
    pub paragraph_loop: bool,
    /// Fail on value tags that resolve to nothing
    pub strict: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            linebreaks: true,
            paragraph_loop: true,
            strict: true,
        }
    }
}

impl RenderOptions {
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self { self.delimiters = delimiters; self }
    pub fn with_linebreaks(mut self, on: bool) -> Self { self.linebreaks = on; self }
    pub fn with_paragraph_loop(mut self, on: bool) -> Self { self.paragraph_loop = on; self }
    pub fn with_strict(mut self, on: bool) -> Self { self.strict = on; self }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Section {
        name: String,
        inverted: bool,
        body: Vec<Node>,
    },
}

/// Renders XML parts containing section tags against a [`TemplateScope`]
#[derive(Debug, Clone, Default)]
pub struct SectionRenderer {
    options: RenderOptions,
}

impl SectionRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one part
    pub fn render(&self, part: &str, xml: &str, data: &TemplateScope) -> Result<String> {
        let mut rendered = self.render_parts(&[(part.to_string(), xml.to_string())], data)?;
        Ok(rendered.pop().map(|(_, xml)| xml).unwrap_or_default())
    }

    /// Render several parts as one unit.
    ///
    /// Every structural issue of every part is collected before any part is
    /// rendered; in strict mode every unresolved tag of every part is
    /// collected before failing.
    pub fn render_parts(
        &self,
        parts: &[(String, String)],
        data: &TemplateScope,
    ) -> Result<Vec<(String, String)>> {
        let Delimiters { open, close } = &self.options.delimiters;

        let normalized: Vec<(String, String)> = parts
            .iter()
            .map(|(name, xml)| (name.clone(), normalize_split_tags(xml, open, close)))
            .collect();

        let issues: Vec<TagIssue> = normalized
            .iter()
            .flat_map(|(name, xml)| self.check_part(name, xml))
            .collect();
        if !issues.is_empty() {
            return Err(MergeError::TemplateStructure { issues });
        }

        let mut unresolved = Vec::new();
        let mut rendered = Vec::with_capacity(normalized.len());
        for (name, xml) in normalized {
            let nodes = self.parse(&xml);
            let mut out = String::with_capacity(xml.len());
            let mut missing = Vec::new();
            let mut scopes = vec![data];
            self.render_nodes(&nodes, &mut scopes, &mut out, &mut missing);

            for tag in missing {
                let issue = UnresolvedTag { part: name.clone(), tag };
                if !unresolved.contains(&issue) {
                    unresolved.push(issue);
                }
            }
            tracing::debug!(part = %name, bytes = out.len(), "rendered template part");
            rendered.push((name, out));
        }

        if self.options.strict && !unresolved.is_empty() {
            return Err(MergeError::Render { issues: unresolved });
        }
        Ok(rendered)
    }

    /// Section pairing problems of one part
    pub fn check(&self, part: &str, xml: &str) -> Vec<TagIssue> {
        let Delimiters { open, close } = &self.options.delimiters;
        self.check_part(part, &normalize_split_tags(xml, open, close))
    }

    fn check_part(&self, part: &str, xml: &str) -> Vec<TagIssue> {
        let Delimiters { open, close } = &self.options.delimiters;
        let issue = |kind| TagIssue { part: part.to_string(), kind };

        let mut issues = Vec::new();
        let mut stack: Vec<String> = Vec::new();
        for tag in scan_tags(xml, open, close) {
            match tag.kind {
                TagKind::Var => {}
                TagKind::Open | TagKind::Inverted => stack.push(tag.name),
                TagKind::Close => match stack.iter().rposition(|n| *n == tag.name) {
                    Some(at) => {
                        for name in stack.drain(at..).skip(1) {
                            issues.push(issue(TagIssueKind::Unclosed { name }));
                        }
                    }
                    None => match stack.pop() {
                        Some(opened) => issues.push(issue(TagIssueKind::Mismatched {
                            opened,
                            closed: tag.name,
                        })),
                        None => issues.push(issue(TagIssueKind::UnopenedClose { name: tag.name })),
                    },
                },
            }
        }
        issues.extend(stack.into_iter().map(|name| issue(TagIssueKind::Unclosed { name })));
        issues
    }

    /// Build the node tree of a validated, normalized part
    fn parse(&self, xml: &str) -> Vec<Node> {
        let Delimiters { open, close } = &self.options.delimiters;
        let xml = expand_row_loops(xml, &scan_tags(xml, open, close));
        let mut tags = scan_tags(&xml, open, close);
        if self.options.paragraph_loop {
            expand_paragraph_tags(&xml, &mut tags);
        }

        let mut stack: Vec<(String, bool, Vec<Node>)> = Vec::new();
        let mut current = Vec::new();
        let mut cursor = 0;

        for tag in tags {
            if tag.start > cursor {
                current.push(Node::Text(xml[cursor..tag.start].to_string()));
            }
            cursor = tag.end;
            match tag.kind {
                TagKind::Var => current.push(Node::Var(tag.name)),
                TagKind::Open | TagKind::Inverted => {
                    let inverted = tag.kind == TagKind::Inverted;
                    stack.push((tag.name, inverted, std::mem::take(&mut current)));
                }
                TagKind::Close => {
                    if let Some((name, inverted, parent)) = stack.pop() {
                        let body = std::mem::replace(&mut current, parent);
                        current.push(Node::Section { name, inverted, body });
                    }
                }
            }
        }
        if cursor < xml.len() {
            current.push(Node::Text(xml[cursor..].to_string()));
        }
        while let Some((name, inverted, parent)) = stack.pop() {
            let body = std::mem::replace(&mut current, parent);
            current.push(Node::Section { name, inverted, body });
        }
        current
    }

    fn render_nodes<'a>(
        &self,
        nodes: &[Node],
        scopes: &mut Vec<&'a TemplateScope>,
        out: &mut String,
        missing: &mut Vec<String>,
    ) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(name) => match resolve(scopes, name) {
                    Some(TemplateValue::Text(value)) => out.push_str(&self.escape(value)),
                    Some(_) => {}
                    None => {
                        tracing::debug!(tag = %name, "tag resolved to nothing");
                        missing.push(name.clone());
                    }
                },
                Node::Section { name, inverted: true, body } => {
                    if resolve(scopes, name).map_or(true, TemplateValue::is_empty) {
                        self.render_nodes(body, scopes, out, missing);
                    }
                }
                Node::Section { name, inverted: false, body } => match resolve(scopes, name) {
                    Some(TemplateValue::List(items)) => {
                        for item in items {
                            scopes.push(item);
                            self.render_nodes(body, scopes, out, missing);
                            scopes.pop();
                        }
                    }
                    Some(TemplateValue::Group(group)) if !group.is_empty() => {
                        scopes.push(group);
                        self.render_nodes(body, scopes, out, missing);
                        scopes.pop();
                    }
                    Some(value @ TemplateValue::Text(_)) if !value.is_empty() => {
                        self.render_nodes(body, scopes, out, missing);
                    }
                    _ => {}
                },
            }
        }
    }

    fn escape(&self, value: &str) -> String {
        let escaped = escape_xml(value);
        if self.options.linebreaks {
            escaped.replace("\r\n", "\n").replace('\n', LINE_BREAK)
        } else {
            escaped
        }
    }
}

fn resolve<'a>(scopes: &[&'a TemplateScope], name: &str) -> Option<&'a TemplateValue> {
    scopes.iter().rev().copied().find_map(|scope| scope.lookup(name))
}

/// Move the tags of a section that starts and ends in different cells of one
/// table row out to the row boundaries, so the whole row repeats
fn expand_row_loops(xml: &str, tags: &[RawTag]) -> String {
    let mut open: Vec<&RawTag> = Vec::new();
    // position → (closing tags, opening tags) inserted there
    let mut inserts: BTreeMap<usize, (String, String)> = BTreeMap::new();
    let mut deletions = Vec::new();

    for tag in tags {
        match tag.kind {
            TagKind::Var => {}
            TagKind::Open | TagKind::Inverted => open.push(tag),
            TagKind::Close => {
                let Some(start) = open.pop() else { continue };
                let (Some(row), Some(close_row)) =
                    (enclosing(xml, start.start, "w:tr"), enclosing(xml, tag.start, "w:tr"))
                else {
                    continue;
                };
                if row != close_row
                    || enclosing(xml, start.start, "w:tc") == enclosing(xml, tag.start, "w:tc")
                {
                    continue;
                }

                let open_text = &xml[start.start..start.end];
                let close_text = &xml[tag.start..tag.end];
                let at_start = inserts.entry(row.start).or_default();
                at_start.1 = format!("{}{}", open_text, at_start.1);
                inserts.entry(row.end).or_default().0.push_str(close_text);
                deletions.push(start.start..start.end);
                deletions.push(tag.start..tag.end);
            }
        }
    }

    if deletions.is_empty() {
        return xml.to_string();
    }

    let mut edits: Vec<(usize, usize, String)> = deletions
        .into_iter()
        .map(|range| (range.start, range.end, String::new()))
        .chain(
            inserts
                .into_iter()
                .map(|(pos, (closes, opens))| (pos, pos, closes + &opens)),
        )
        .collect();
    edits.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = xml.to_string();
    for (start, end, text) in edits {
        out.replace_range(start..end, &text);
    }
    out
}

/// Widen a section tag that is the only text of its paragraph to the whole
/// paragraph
fn expand_paragraph_tags(xml: &str, tags: &mut [RawTag]) {
    for tag in tags.iter_mut().filter(|t| t.is_section()) {
        let Some(paragraph) = enclosing(xml, tag.start, "w:p") else {
            continue;
        };
        if plain_text(&xml[paragraph.clone()]).trim() == &xml[tag.start..tag.end] {
            tag.start = paragraph.start;
            tag.end = paragraph.end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    fn doc(body: &str) -> String {
        format!("<w:document><w:body>{}</w:body></w:document>", body)
    }

    fn render(xml: &str, data: &TemplateScope) -> Result<String> {
        SectionRenderer::default().render("word/document.xml", xml, data)
    }

    #[test]
    fn test_substitution_escapes_values() {
        let data = TemplateScope::new().with("OBJ_ADRESA", "Dům <A> & \"B\"");
        let out = render(&para("Adresa: {{OBJ_ADRESA}}"), &data).unwrap();
        assert_eq!(out, para("Adresa: Dům &lt;A&gt; &amp; &quot;B&quot;"));
    }

    #[test]
    fn test_loop_with_parent_scope() {
        let data = TemplateScope::new().with("EVIDENCNI", "RZ-1").with(
            "BOARDS",
            vec![
                TemplateScope::new().with("TITLE", "RH1"),
                TemplateScope::new().with("TITLE", "RH2"),
            ],
        );
        let out = render("{{#BOARDS}}[{{TITLE}}/{{EVIDENCNI}}]{{/BOARDS}}", &data).unwrap();
        assert_eq!(out, "[RH1/RZ-1][RH2/RZ-1]");
    }

    #[test]
    fn test_nested_loops() {
        let data = TemplateScope::new().with(
            "ROOMS",
            vec![
                TemplateScope::new().with("NAME", "Kuchyň").with(
                    "DEVICES",
                    vec![
                        TemplateScope::new().with("TYP", "Zásuvka"),
                        TemplateScope::new().with("TYP", "Světlo"),
                    ],
                ),
                TemplateScope::new().with("NAME", "Sklep").with("DEVICES", Vec::new()),
            ],
        );
        let out = render(
            "{{#ROOMS}}{{NAME}}:{{#DEVICES}} {{TYP}}{{/DEVICES}}{{^DEVICES}} -{{/DEVICES}};{{/ROOMS}}",
            &data,
        )
        .unwrap();
        assert_eq!(out, "Kuchyň: Zásuvka Světlo;Sklep: -;");
    }

    #[test]
    fn test_text_and_group_sections() {
        let data = TemplateScope::new()
            .with("NOTE", "x")
            .with("EMPTY", "")
            .with("tech", TemplateScope::new().with("name", "Jan"));
        let out = render("{{#NOTE}}a{{/NOTE}}{{#EMPTY}}b{{/EMPTY}}{{#tech}}{{name}}{{/tech}}{{tech.name}}", &data)
            .unwrap();
        assert_eq!(out, "aJanJan");
    }

    #[test]
    fn test_split_runs_are_normalized() {
        let xml = "<w:p><w:r><w:t>{{EVI</w:t></w:r><w:r><w:t>DENCNI}}</w:t></w:r></w:p>";
        let data = TemplateScope::new().with("EVIDENCNI", "RZ-9");
        let out = render(xml, &data).unwrap();
        assert_eq!(
            out,
            "<w:p><w:r><w:t xml:space=\"preserve\">RZ-9</w:t></w:r><w:r><w:t></w:t></w:r></w:p>"
        );
    }

    #[test]
    fn test_paragraph_loop_drops_tag_paragraphs() {
        let xml = doc(&format!(
            "{}{}{}{}",
            para("Úkony:"),
            para("{{#PROHLIDKA}}"),
            para("• {{TEXT}}"),
            para("{{/PROHLIDKA}}")
        ));
        let data = TemplateScope::new().with(
            "PROHLIDKA",
            vec![
                TemplateScope::new().with("TEXT", "Kontrola krytů"),
                TemplateScope::new().with("TEXT", "Kontrola značení"),
            ],
        );
        let out = render(&xml, &data).unwrap();
        assert_eq!(
            out,
            doc(&format!(
                "{}{}{}",
                para("Úkony:"),
                r#"<w:p><w:r><w:t xml:space="preserve">• Kontrola krytů</w:t></w:r></w:p>"#,
                r#"<w:p><w:r><w:t xml:space="preserve">• Kontrola značení</w:t></w:r></w:p>"#
            ))
        );
    }

    #[test]
    fn test_paragraph_loop_can_be_disabled() {
        let xml = para("{{#A}}") + &para("x") + &para("{{/A}}");
        let data = TemplateScope::new().with("A", "on");
        let renderer = SectionRenderer::new(RenderOptions::default().with_paragraph_loop(false));
        let out = renderer.render("p", &xml, &data).unwrap();
        assert_eq!(
            out,
            r#"<w:p><w:r><w:t xml:space="preserve"></w:t></w:r></w:p><w:p><w:r><w:t>x</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve"></w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_table_row_repeats() {
        let cell = |text: &str| format!("<w:tc>{}</w:tc>", para(text));
        let row = format!("<w:tr>{}{}</w:tr>", cell("{{#ZAVADY}}{{POPIS}}"), cell("{{CSN}}{{/ZAVADY}}"));
        let xml = format!("<w:tbl>{}</w:tbl>", row);
        let data = TemplateScope::new().with(
            "ZAVADY",
            vec![
                TemplateScope::new().with("POPIS", "A").with("CSN", "1"),
                TemplateScope::new().with("POPIS", "B").with("CSN", "2"),
            ],
        );
        let out = render(&xml, &data).unwrap();
        let out_row = |a: &str, b: &str| {
            format!(
                "<w:tr><w:tc><w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p></w:tc></w:tr>",
                a, b
            )
        };
        assert_eq!(out, format!("<w:tbl>{}{}</w:tbl>", out_row("A", "1"), out_row("B", "2")));
    }

    #[test]
    fn test_unclosed_section_is_reported_before_output() {
        let data = TemplateScope::new().with("BOARDS", Vec::new());
        let err = render("{{#BOARDS}}{{TITLE}}", &data).unwrap_err();
        match err {
            MergeError::TemplateStructure { issues } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].tag_names(), vec!["BOARDS"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_structure_issue_is_listed() {
        let renderer = SectionRenderer::default();
        let parts = vec![
            ("word/document.xml".to_string(), "{{#A}}{{#B}}{{/A}}{{/C}}".to_string()),
            ("word/header1.xml".to_string(), "{{#ROOMS}}{{/DEVICES}}".to_string()),
        ];
        let err = renderer.render_parts(&parts, &TemplateScope::new()).unwrap_err();
        let MergeError::TemplateStructure { issues } = err else {
            panic!("expected a structure error");
        };
        let kinds: Vec<_> = issues.iter().map(|i| (i.part.as_str(), i.kind.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                ("word/document.xml", TagIssueKind::Unclosed { name: "B".into() }),
                ("word/document.xml", TagIssueKind::UnopenedClose { name: "C".into() }),
                (
                    "word/header1.xml",
                    TagIssueKind::Mismatched { opened: "ROOMS".into(), closed: "DEVICES".into() }
                ),
            ]
        );
    }

    #[test]
    fn test_strict_mode_reports_unresolved_tags() {
        let parts = vec![
            ("a".to_string(), "{{X}} {{X}} {{Y}}".to_string()),
            ("b".to_string(), "{{Z}}".to_string()),
        ];
        let err = SectionRenderer::default()
            .render_parts(&parts, &TemplateScope::new().with("Y", "y"))
            .unwrap_err();
        let MergeError::Render { issues } = err else {
            panic!("expected a render error");
        };
        let tags: Vec<_> = issues.iter().map(|i| (i.part.as_str(), i.tag.as_str())).collect();
        assert_eq!(tags, vec![("a", "X"), ("b", "Z")]);

        let lenient = SectionRenderer::new(RenderOptions::default().with_strict(false));
        assert_eq!(lenient.render("a", "[{{X}}]", &TemplateScope::new()).unwrap(), "[]");
    }

    #[test]
    fn test_linebreaks() {
        let data = TemplateScope::new().with("NOTE", "a\nb");
        assert_eq!(render("{{NOTE}}", &data).unwrap(), format!("a{}b", LINE_BREAK));

        let plain = SectionRenderer::new(RenderOptions::default().with_linebreaks(false));
        assert_eq!(plain.render("p", "{{NOTE}}", &data).unwrap(), "a\nb");
    }

    #[test]
    fn test_custom_delimiters() {
        let renderer = SectionRenderer::new(
            RenderOptions::default().with_delimiters(Delimiters::new("[[", "]]")),
        );
        let data = TemplateScope::new().with("A", "1");
        assert_eq!(renderer.render("p", "[[A]] {{A}}", &data).unwrap(), "1 {{A}}");
    }

    proptest! {
        #[test]
        fn prop_resolved_render_leaves_no_delimiters(
            entries in proptest::collection::btree_map("[A-Z]{1,6}", "[a-zA-Z0-9 ]{0,12}", 1..6),
            items in proptest::collection::vec("[a-z0-9 ]{0,8}", 0..4),
            filler in "[a-z ]{0,8}",
        ) {
            let mut data = TemplateScope::new();
            let mut template = String::new();
            for (key, value) in &entries {
                data.insert(key.as_str(), value.as_str());
                template.push_str(&para(&format!("{}{{{{{}}}}}", filler, key)));
            }
            data.insert(
                "ITEMS_LIST",
                items.iter().map(|i| TemplateScope::new().with("ITEM", i.as_str())).collect::<Vec<_>>(),
            );
            template.push_str(&para("{{#ITEMS_LIST}}"));
            template.push_str(&para("{{ITEM}}"));
            template.push_str(&para("{{/ITEMS_LIST}}"));
            template.push_str(&para("{{^ITEMS_LIST}}none{{/ITEMS_LIST}}"));

            let out = SectionRenderer::default().render("word/document.xml", &doc(&template), &data).unwrap();
            prop_assert!(!out.contains("{{"));
            prop_assert!(!out.contains("}}"));
        }
    }
}
