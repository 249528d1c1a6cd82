//! Tabular triples format.
//!
//! Each row is a `parent,child,relationship` triple; the tree is transcribed
//! pre-order with one `contains` row per edge. Reading rebuilds the tree from
//! the triples, taking the first row's parent as the root.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{MindMap, Node};

const HEADER: &str = "parent,child,relationship";

/// Read a CSV triple file into a [`MindMap`].
///
/// The first data row's parent becomes the root. Rows with fewer than two
/// fields are skipped. The resulting map is titled "From CSV".
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::Parse(e.to_string()))?;
    parse_triples(&text).map_err(Error::into_parse)
}

fn parse_triples(text: &str) -> Result<MindMap> {
    let mut triples: Vec<(String, String)> = Vec::new();
    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        if fields.len() >= 2 {
            triples.push((fields[0].clone(), fields[1].clone()));
        }
    }

    let mut map = MindMap::new("From CSV");
    let Some((root_title, _)) = triples.first() else {
        return Ok(map);
    };
    let root_title = root_title.clone();

    // Title-keyed adjacency, preserving row order per parent.
    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    for (parent, child) in &triples {
        let children = children_of.entry(parent.clone()).or_default();
        if !children.contains(child) {
            children.push(child.clone());
        }
    }

    let mut on_path = HashSet::new();
    map.set_root(build_subtree(&root_title, &children_of, &mut on_path));
    Ok(map)
}

fn build_subtree(
    title: &str,
    children_of: &HashMap<String, Vec<String>>,
    on_path: &mut HashSet<String>,
) -> Node {
    let mut node = Node::new(title);
    if !on_path.insert(title.to_string()) {
        // Cyclic triples would otherwise recurse forever; break the cycle.
        return node;
    }
    if let Some(children) = children_of.get(title) {
        for child in children {
            node.add_child(build_subtree(child, children_of, on_path));
        }
    }
    on_path.remove(title);
    node
}

/// Write a [`MindMap`] as CSV triples.
pub fn write_csv<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    let mut out = String::from(HEADER);
    out.push('\n');

    if let Some(root) = &map.root {
        write_triples(root, &mut out);
    }

    std::fs::write(path, out).map_err(|e| Error::Converter(e.to_string()))
}

fn write_triples(parent: &Node, out: &mut String) {
    for child in &parent.children {
        out.push_str(&escape_field(&flatten_title(&parent.title)));
        out.push(',');
        out.push_str(&escape_field(&flatten_title(&child.title)));
        out.push_str(",contains\n");
        write_triples(child, out);
    }
}

/// Replace embedded line breaks with spaces. The reader is line-oriented, so
/// every row must stay on one physical line.
fn flatten_title(title: &str) -> String {
    title.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Quote a field when it contains a delimiter, quote, or newline (RFC 4180).
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV line into unquoted fields.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
