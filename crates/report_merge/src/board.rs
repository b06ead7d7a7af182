//! Board and component display lines

use crate::text::dash;
use inspection_model::{
    first_non_blank, flatten, non_blank_at, ComponentField, FieldResolver, FlatComponent,
};
use serde_json::Value;

/// Separator between segments of a component line
pub const SEGMENT_SEPARATOR: &str = "   •   ";
/// Separator between board metadata entries
pub const META_SEPARATOR: &str = "  |  ";

/// Board attributes in display order: (field, label)
pub const BOARD_FIELDS: [(&str, &str); 7] = [
    ("vyrobce", "Výrobce"),
    ("typ", "Typ"),
    ("umisteni", "Umístění"),
    ("vyrobniCislo", "S/N"),
    ("napeti", "Napětí"),
    ("odpor", "Odpor"),
    ("ip", "IP"),
];

const NBSP: char = '\u{00A0}';

/// Deepest level drawn; deeper components share its indentation
pub const MAX_DRAWN_DEPTH: usize = 32;

/// Tree prefix drawn in front of a component name
pub fn depth_prefix(depth: usize) -> String {
    match depth.min(MAX_DRAWN_DEPTH) {
        0 => String::new(),
        1 => "└─ ".to_string(),
        n => format!("{}└─ ", "│ ".repeat(n - 1)),
    }
}

/// Indented bullet used when components are rendered through a template
pub fn bullet_prefix(depth: usize) -> String {
    let indent: String = std::iter::repeat(NBSP)
        .take(depth.min(MAX_DRAWN_DEPTH).saturating_mul(2))
        .collect();
    let bullet = if depth > 0 { "▸ " } else { "• " };
    format!("{}{}", indent, bullet)
}

/// One component ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentLine {
    pub depth: usize,
    /// Component name or `—`
    pub name: String,
    /// Description followed by `label: value [unit]` measurement segments
    pub segments: Vec<String>,
}

impl ComponentLine {
    /// Build the display line of one flattened component
    pub fn from_component(component: &FlatComponent, resolver: &FieldResolver) -> Self {
        let record = &component.record;
        let name = dash(resolver.resolve_field(record, ComponentField::Name));

        let mut segments = Vec::new();
        if let Some(description) = resolver.resolve_field(record, ComponentField::Description) {
            segments.push(description);
        }
        for field in ComponentField::MEASUREMENTS {
            if let Some(value) = resolver.resolve_field(record, field) {
                segments.push(match field.unit() {
                    Some(unit) => format!("{}: {} {}", field.label(), value, unit),
                    None => format!("{}: {}", field.label(), value),
                });
            }
        }

        Self {
            depth: component.depth,
            name,
            segments,
        }
    }

    /// Placeholder row shown for a board without components
    pub fn placeholder() -> Self {
        Self {
            depth: 0,
            name: dash::<&str>(None),
            segments: Vec::new(),
        }
    }

    /// Segments joined by the fixed separator
    pub fn detail(&self) -> String {
        self.segments.join(SEGMENT_SEPARATOR)
    }

    /// Name with the tree prefix
    pub fn tree_title(&self) -> String {
        format!("{}{}", depth_prefix(self.depth), self.name)
    }

    /// Name with the indented bullet prefix
    pub fn bullet_title(&self) -> String {
        format!("{}{}", bullet_prefix(self.depth), self.name)
    }
}

/// A distribution board with its flattened components
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub title: String,
    /// Present attributes only, `label: value` joined by `  |  `, or `—`
    pub meta: String,
    /// Every attribute, dashed when missing, joined by ` | `
    pub details: String,
    /// Never empty; a placeholder row stands in for no components
    pub components: Vec<ComponentLine>,
}

impl BoardView {
    /// Build the view of board `index` (zero-based)
    pub fn from_record(board: &Value, index: usize, resolver: &FieldResolver) -> Self {
        let title = first_non_blank(board, &["name", "nazev"])
            .unwrap_or_else(|| format!("#{}", index + 1));

        let meta: Vec<String> = BOARD_FIELDS
            .iter()
            .filter_map(|(field, label)| {
                non_blank_at(board, field).map(|v| format!("{}: {}", label, v))
            })
            .collect();
        let meta = if meta.is_empty() {
            dash::<&str>(None)
        } else {
            meta.join(META_SEPARATOR)
        };

        let details = BOARD_FIELDS
            .iter()
            .map(|(field, label)| format!("{}: {}", label, dash(non_blank_at(board, field))))
            .collect::<Vec<_>>()
            .join(" | ");

        let components = component_lines(inspection_model::list_at(board, "komponenty"), resolver);

        Self {
            title,
            meta,
            details,
            components,
        }
    }
}

/// Flatten a component list and build one line per component
pub fn component_lines(items: &[Value], resolver: &FieldResolver) -> Vec<ComponentLine> {
    let flat = flatten(items);
    if flat.is_empty() {
        return vec![ComponentLine::placeholder()];
    }
    flat.iter()
        .map(|c| ComponentLine::from_component(c, resolver))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_depth_prefix() {
        assert_eq!(depth_prefix(0), "");
        assert_eq!(depth_prefix(1), "└─ ");
        assert_eq!(depth_prefix(3), "│ │ └─ ");
    }

    #[test]
    fn test_bullet_prefix() {
        assert_eq!(bullet_prefix(0), "• ");
        assert_eq!(bullet_prefix(1), "\u{00A0}\u{00A0}▸ ");
    }

    #[test]
    fn test_prefixes_stop_at_max_drawn_depth() {
        assert_eq!(depth_prefix(usize::MAX), depth_prefix(MAX_DRAWN_DEPTH));
        assert_eq!(bullet_prefix(usize::MAX), bullet_prefix(MAX_DRAWN_DEPTH));
        assert_eq!(depth_prefix(MAX_DRAWN_DEPTH).matches("│ ").count(), MAX_DRAWN_DEPTH - 1);
    }

    #[test]
    fn test_huge_level_renders() {
        let lines = component_lines(&[json!({ "name": "A", "level": 1e20 })], &FieldResolver::new());
        assert_eq!(lines[0].depth, 0);
        assert_eq!(lines[0].tree_title(), "A");
    }

    #[test]
    fn test_component_line() {
        let resolver = FieldResolver::new();
        let component = FlatComponent {
            record: json!({
                "nazev": "Jistič",
                "popis": "Kuchyň",
                "typ": "B16",
                "poles": 1,
                "result": { "riso": "250,5", "zs": "0,42" },
                "vybavovaciCasMs": 18,
                "pozn": "ok"
            }),
            depth: 2,
        };
        let line = ComponentLine::from_component(&component, &resolver);
        assert_eq!(line.tree_title(), "│ └─ Jistič");
        assert_eq!(
            line.detail(),
            "Kuchyň   •   typ: B16   •   póly: 1   •   Riso: 250.5 MΩ   •   Zs: 0.42 Ω   •   t: 18 ms   •   Pozn.: ok"
        );
    }

    #[test]
    fn test_board_view() {
        let resolver = FieldResolver::new();
        let board = json!({
            "name": "RH1",
            "vyrobce": "ABB",
            "ip": "IP44",
            "komponenty": [
                { "id": 1, "nazev": "Hlavní vypínač" },
                { "id": 2, "nazev": "RCD", "parentId": 1 }
            ]
        });
        let view = BoardView::from_record(&board, 0, &resolver);
        assert_eq!(view.title, "RH1");
        assert_eq!(view.meta, "Výrobce: ABB  |  IP: IP44");
        assert!(view.details.starts_with("Výrobce: ABB | Typ: — | "));
        assert_eq!(view.components.len(), 2);
        assert_eq!(view.components[1].tree_title(), "└─ RCD");
    }

    #[test]
    fn test_board_without_components_gets_placeholder_row() {
        let resolver = FieldResolver::new();
        let view = BoardView::from_record(&json!({}), 2, &resolver);
        assert_eq!(view.title, "#3");
        assert_eq!(view.meta, "—");
        assert_eq!(view.components, vec![ComponentLine::placeholder()]);
    }
}
