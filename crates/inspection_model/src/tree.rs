//! Component tree flattening
//!
//! Board components are stored in one of three positional encodings:
//!
//! - nested `children` arrays,
//! - a `parentId`/`parent` back-reference with an optional order key,
//! - an already flat list with an explicit `level`/`depth` field.
//!
//! The encoding is detected once per dataset. The two tree encodings are
//! turned into a common adjacency structure which is walked depth-first in
//! pre-order; flat lists take their depth from the level field, capped at
//! one below the preceding record.

use crate::form::{lookup, value_text};
use serde_json::Value;
use std::collections::HashMap;

/// Field holding nested child records
pub const CHILDREN_FIELD: &str = "children";
/// Identifier field names
pub const ID_FIELDS: &[&str] = &["id", "komponentaId", "_id"];
/// Parent reference field names
pub const PARENT_FIELDS: &[&str] = &["parentId", "parent_id", "parent"];
/// Sibling order field names
pub const ORDER_FIELDS: &[&str] = &["order", "poradi", "index"];
/// Explicit depth field names
pub const LEVEL_FIELDS: &[&str] = &["uroven", "level", "depth"];

/// Positional encoding detected for a component list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEncoding {
    /// At least one record carries a non-empty `children` array
    ExplicitChildren,
    /// At least one record carries a parent reference
    ParentReference,
    /// Neither; depth comes from a level field
    FlatWithLevel,
}

/// A component record with its resolved depth
#[derive(Debug, Clone, PartialEq)]
pub struct FlatComponent {
    /// The record, without its nested children
    pub record: Value,
    /// Zero for roots, parent depth + 1 otherwise
    pub depth: usize,
}

/// Detect the positional encoding of a component list
pub fn classify(items: &[Value]) -> TreeEncoding {
    if items.iter().any(|item| !nested_children(item).is_empty()) {
        TreeEncoding::ExplicitChildren
    } else if items.iter().any(|item| parent_key(item).is_some()) {
        TreeEncoding::ParentReference
    } else {
        TreeEncoding::FlatWithLevel
    }
}

/// Flatten a component list into depth-annotated document order
pub fn flatten(items: &[Value]) -> Vec<FlatComponent> {
    let encoding = classify(items);
    let flat: Vec<FlatComponent> = match encoding {
        TreeEncoding::ExplicitChildren => Adjacency::from_nested(items).walk(),
        TreeEncoding::ParentReference => Adjacency::from_parent_refs(items).walk(),
        TreeEncoding::FlatWithLevel => {
            // A level may go at most one below the previous record
            let mut previous: Option<usize> = None;
            items
                .iter()
                .map(|item| {
                    let limit = previous.map_or(0, |depth| depth.saturating_add(1));
                    let depth = level_of(item).min(limit);
                    previous = Some(depth);
                    FlatComponent {
                        record: item.clone(),
                        depth,
                    }
                })
                .collect()
        }
    };

    tracing::debug!(
        ?encoding,
        input = items.len(),
        output = flat.len(),
        "flattened component list"
    );
    flat
}

/// Nodes plus parent → children edges, siblings already ordered
struct Adjacency<'a> {
    nodes: Vec<&'a Value>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl<'a> Adjacency<'a> {
    fn from_nested(items: &'a [Value]) -> Self {
        let mut adjacency = Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            children: Vec::new(),
        };
        let roots = adjacency.push_nested(items);
        adjacency.roots = roots;
        adjacency
    }

    fn push_nested(&mut self, items: &'a [Value]) -> Vec<usize> {
        let mut indices: Vec<usize> = Vec::with_capacity(items.len());
        for item in items {
            let index = self.nodes.len();
            self.nodes.push(item);
            self.children.push(Vec::new());
            let kids = self.push_nested(nested_children(item));
            self.children[index] = kids;
            indices.push(index);
        }
        sort_siblings(&mut indices, &self.nodes);
        indices
    }

    fn from_parent_refs(items: &'a [Value]) -> Self {
        let nodes: Vec<&Value> = items.iter().collect();

        let mut by_id: HashMap<String, usize> = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(id) = id_of(item) {
                by_id.entry(id).or_insert(index);
            }
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); items.len()];
        for (index, item) in items.iter().enumerate() {
            match parent_key(item).and_then(|key| by_id.get(&key).copied()) {
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        sort_siblings(&mut roots, &nodes);
        for kids in children.iter_mut() {
            sort_siblings(kids, &nodes);
        }

        Self {
            nodes,
            roots,
            children,
        }
    }

    /// Pre-order depth-first walk. Nodes unreachable from any root (parent
    /// cycles) are walked afterwards as extra roots, in input order.
    fn walk(&self) -> Vec<FlatComponent> {
        let mut visited = vec![false; self.nodes.len()];
        let mut out = Vec::with_capacity(self.nodes.len());

        self.walk_from(&self.roots, &mut visited, &mut out);
        for index in 0..self.nodes.len() {
            if !visited[index] {
                self.walk_from(&[index], &mut visited, &mut out);
            }
        }
        out
    }

    fn walk_from(&self, start: &[usize], visited: &mut [bool], out: &mut Vec<FlatComponent>) {
        let mut stack: Vec<(usize, usize)> = start.iter().rev().map(|&i| (i, 0)).collect();
        while let Some((index, depth)) = stack.pop() {
            if visited[index] {
                continue;
            }
            visited[index] = true;
            out.push(FlatComponent {
                record: without_children(self.nodes[index]),
                depth,
            });
            for &child in self.children[index].iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

/// Stable sort by explicit order key, falling back to node position
fn sort_siblings(indices: &mut [usize], nodes: &[&Value]) {
    indices.sort_by(|&a, &b| {
        let ka = order_of(nodes[a]).unwrap_or(a as f64);
        let kb = order_of(nodes[b]).unwrap_or(b as f64);
        ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn nested_children(item: &Value) -> &[Value] {
    match item.get(CHILDREN_FIELD) {
        Some(Value::Array(kids)) => kids.as_slice(),
        _ => &[],
    }
}

fn without_children(item: &Value) -> Value {
    match item {
        Value::Object(map) if map.contains_key(CHILDREN_FIELD) => {
            let mut map = map.clone();
            map.remove(CHILDREN_FIELD);
            Value::Object(map)
        }
        other => other.clone(),
    }
}

fn first_present<'a>(item: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .find_map(|field| lookup(item, field).filter(|v| !v.is_null()))
}

fn id_of(item: &Value) -> Option<String> {
    first_present(item, ID_FIELDS).and_then(value_text)
}

fn parent_key(item: &Value) -> Option<String> {
    first_present(item, PARENT_FIELDS).and_then(value_text)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replacen(',', ".", 1).parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn order_of(item: &Value) -> Option<f64> {
    first_present(item, ORDER_FIELDS).and_then(numeric)
}

fn level_of(item: &Value) -> usize {
    first_present(item, LEVEL_FIELDS)
        .and_then(numeric)
        .map(|n| n.floor().max(0.0) as usize)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn names(flat: &[FlatComponent]) -> Vec<(String, usize)> {
        flat.iter()
            .map(|c| {
                (
                    c.record.get("name").and_then(Value::as_str).unwrap_or("?").to_string(),
                    c.depth,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(flatten(&[]).is_empty());
        assert_eq!(classify(&[]), TreeEncoding::FlatWithLevel);
    }

    #[test]
    fn test_explicit_children() {
        let items = vec![
            json!({ "name": "Hlavní vypínač", "children": [
                { "name": "RCD", "children": [ { "name": "B16" }, { "name": "B10" } ] },
                { "name": "C25" }
            ]}),
            json!({ "name": "Přepěťová ochrana" }),
        ];
        assert_eq!(classify(&items), TreeEncoding::ExplicitChildren);

        let flat = flatten(&items);
        assert_eq!(
            names(&flat),
            vec![
                ("Hlavní vypínač".into(), 0),
                ("RCD".into(), 1),
                ("B16".into(), 2),
                ("B10".into(), 2),
                ("C25".into(), 1),
                ("Přepěťová ochrana".into(), 0),
            ]
        );
        assert!(flat[0].record.get("children").is_none());
    }

    #[test]
    fn test_parent_reference_with_order() {
        let items = vec![
            json!({ "id": 3, "name": "B10", "parentId": 2, "order": 2 }),
            json!({ "id": 2, "name": "RCD", "parentId": 1 }),
            json!({ "id": 4, "name": "B16", "parent_id": "2", "poradi": 1 }),
            json!({ "id": 1, "name": "Hlavní vypínač" }),
        ];
        assert_eq!(classify(&items), TreeEncoding::ParentReference);
        assert_eq!(
            names(&flatten(&items)),
            vec![
                ("Hlavní vypínač".into(), 0),
                ("RCD".into(), 1),
                ("B16".into(), 2),
                ("B10".into(), 2),
            ]
        );
    }

    #[test]
    fn test_unknown_parent_is_root() {
        let items = vec![
            json!({ "id": "a", "name": "A" }),
            json!({ "id": "b", "name": "B", "parent": "zzz" }),
            json!({ "id": "c", "name": "C", "parent": "a" }),
        ];
        assert_eq!(
            names(&flatten(&items)),
            vec![("A".into(), 0), ("C".into(), 1), ("B".into(), 0)]
        );
    }

    #[test]
    fn test_parent_cycle_keeps_every_record() {
        let items = vec![
            json!({ "id": 1, "name": "X", "parentId": 2 }),
            json!({ "id": 2, "name": "Y", "parentId": 1 }),
            json!({ "id": 3, "name": "Z" }),
        ];
        let flat = flatten(&items);
        assert_eq!(flat.len(), 3);
        assert_eq!(names(&flat)[0], ("Z".into(), 0));
        assert_eq!(names(&flat)[1], ("X".into(), 0));
        assert_eq!(names(&flat)[2], ("Y".into(), 1));
    }

    #[test]
    fn test_flat_with_level() {
        let items = vec![
            json!({ "name": "A", "uroven": 0 }),
            json!({ "name": "B", "level": "1" }),
            json!({ "name": "C", "depth": 2.7 }),
            json!({ "name": "D", "level": -3 }),
            json!({ "name": "E" }),
        ];
        assert_eq!(classify(&items), TreeEncoding::FlatWithLevel);
        assert_eq!(
            names(&flatten(&items)),
            vec![
                ("A".into(), 0),
                ("B".into(), 1),
                ("C".into(), 2),
                ("D".into(), 0),
                ("E".into(), 0),
            ]
        );
    }

    #[test]
    fn test_level_jumps_are_capped() {
        let items = vec![
            json!({ "name": "A", "level": 1e20 }),
            json!({ "name": "B", "level": 1_000_000_000 }),
            json!({ "name": "C", "level": "7" }),
            json!({ "name": "D", "level": 0 }),
        ];
        assert_eq!(
            names(&flatten(&items)),
            vec![
                ("A".into(), 0),
                ("B".into(), 1),
                ("C".into(), 2),
                ("D".into(), 0),
            ]
        );
    }

    #[test]
    fn test_children_take_priority_over_parent_refs() {
        let items = vec![
            json!({ "id": 1, "name": "A", "children": [ { "name": "B" } ] }),
            json!({ "id": 2, "name": "C", "parentId": 1 }),
        ];
        assert_eq!(classify(&items), TreeEncoding::ExplicitChildren);
        assert_eq!(
            names(&flatten(&items)),
            vec![("A".into(), 0), ("B".into(), 1), ("C".into(), 0)]
        );
    }

    /// Logical tree: `parents[i]` is the parent index of node `i` (always < i)
    fn tree_from_choices(choices: &[(bool, usize)]) -> Vec<Option<usize>> {
        choices
            .iter()
            .enumerate()
            .map(|(i, &(attach, pick))| if i > 0 && attach { Some(pick % i) } else { None })
            .collect()
    }

    fn expected_preorder(parents: &[Option<usize>]) -> Vec<(String, usize)> {
        fn visit(node: usize, depth: usize, parents: &[Option<usize>], out: &mut Vec<(String, usize)>) {
            out.push((format!("n{}", node), depth));
            for child in (0..parents.len()).filter(|&c| parents[c] == Some(node)) {
                visit(child, depth + 1, parents, out);
            }
        }
        let mut out = Vec::new();
        for root in (0..parents.len()).filter(|&r| parents[r].is_none()) {
            visit(root, 0, parents, &mut out);
        }
        out
    }

    fn nested_encoding(parents: &[Option<usize>]) -> Vec<Value> {
        fn build(node: usize, parents: &[Option<usize>]) -> Value {
            let kids: Vec<Value> = (0..parents.len())
                .filter(|&c| parents[c] == Some(node))
                .map(|c| build(c, parents))
                .collect();
            json!({ "name": format!("n{}", node), "children": kids })
        }
        (0..parents.len())
            .filter(|&r| parents[r].is_none())
            .map(|r| build(r, parents))
            .collect()
    }

    fn parent_encoding(parents: &[Option<usize>]) -> Vec<Value> {
        parents
            .iter()
            .enumerate()
            .map(|(i, parent)| json!({ "id": i, "name": format!("n{}", i), "parentId": parent, "order": i }))
            .collect()
    }

    fn level_encoding(parents: &[Option<usize>]) -> Vec<Value> {
        expected_preorder(parents)
            .into_iter()
            .map(|(name, depth)| json!({ "name": name, "level": depth }))
            .collect()
    }

    proptest! {
        #[test]
        fn prop_encodings_agree(choices in proptest::collection::vec((any::<bool>(), 0usize..64), 0..24)) {
            let parents = tree_from_choices(&choices);
            let expected = expected_preorder(&parents);

            prop_assert_eq!(names(&flatten(&nested_encoding(&parents))), expected.clone());
            prop_assert_eq!(names(&flatten(&parent_encoding(&parents))), expected.clone());
            prop_assert_eq!(names(&flatten(&level_encoding(&parents))), expected);
        }

        #[test]
        fn prop_child_depth_is_parent_plus_one(choices in proptest::collection::vec((any::<bool>(), 0usize..64), 1..24)) {
            let parents = tree_from_choices(&choices);
            let flat = flatten(&parent_encoding(&parents));
            let depth_of: HashMap<String, usize> = names(&flat).into_iter().collect();

            for (i, parent) in parents.iter().enumerate() {
                let depth = depth_of[&format!("n{}", i)];
                match parent {
                    Some(p) => prop_assert_eq!(depth, depth_of[&format!("n{}", p)] + 1),
                    None => prop_assert_eq!(depth, 0),
                }
            }
        }
    }
}
