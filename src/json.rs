//! Structured-serialization format.
//!
//! A plain JSON rendering of the tree: `{ "name": ..., "root_node":
//! { "id", "title", "children": [...] } }`. The reader also accepts the
//! older form where the top-level object is the root node itself.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{MindMap, Node};

#[derive(Serialize, Deserialize)]
struct DocJson {
    #[serde(default)]
    name: Option<String>,
    root_node: Option<NodeJson>,
}

#[derive(Serialize, Deserialize)]
struct NodeJson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    children: Vec<NodeJson>,
}

/// Read a JSON mind map into a [`MindMap`].
///
/// Accepts both `{ "name", "root_node": ... }` documents and bare root-node
/// objects (the older format). An unnamed map is titled "From JSON".
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::Parse(e.to_string()))?;
    parse_document(&text).map_err(Error::into_parse)
}

fn parse_document(text: &str) -> Result<MindMap> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let (name, root) = if value.get("root_node").is_some() {
        let doc: DocJson = serde_json::from_value(value)?;
        (doc.name, doc.root_node)
    } else if value.get("title").is_some() {
        // Older format: the document is the root node itself.
        let node: NodeJson = serde_json::from_value(value)?;
        (None, Some(node))
    } else {
        (
            value
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::to_string),
            None,
        )
    };

    let mut map = MindMap::new(name.unwrap_or_else(|| "From JSON".to_string()));
    map.root = root.map(build_node);
    Ok(map)
}

fn build_node(json: NodeJson) -> Node {
    let mut node = match json.id {
        Some(id) => Node::with_id(id, &json.title),
        None => Node::new(&json.title),
    };
    for child in json.children {
        node.add_child(build_node(child));
    }
    node
}

/// Write a [`MindMap`] as a JSON document.
pub fn write_json<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    write_document(map, path.as_ref()).map_err(Error::into_converter)
}

fn write_document(map: &MindMap, path: &Path) -> Result<()> {
    let doc = DocJson {
        name: Some(map.title.clone()),
        root_node: map.root.as_ref().map(to_json),
    };
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}

fn to_json(node: &Node) -> NodeJson {
    NodeJson {
        id: Some(node.id.clone()),
        title: node.title.clone(),
        children: node.children.iter().map(to_json).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_form() {
        let map = parse_document(
            r#"{ "name": "Doc", "root_node": { "id": "r", "title": "Root",
                 "children": [ { "title": "A" } ] } }"#,
        )
        .unwrap();
        assert_eq!(map.title, "Doc");
        let root = map.root.as_ref().unwrap();
        assert_eq!(root.id, "r");
        assert_eq!(root.children[0].title, "A");
        // Generated id for the child that carried none.
        assert!(!root.children[0].id.is_empty());
    }

    #[test]
    fn test_parse_bare_root_form() {
        let map = parse_document(r#"{ "title": "Old Root", "children": [] }"#).unwrap();
        assert_eq!(map.title, "From JSON");
        assert_eq!(map.root.as_ref().unwrap().title, "Old Root");
    }

    #[test]
    fn test_parse_nameless_empty_document() {
        let map = parse_document("{}").unwrap();
        assert_eq!(map.title, "From JSON");
        assert!(map.root.is_none());
    }

    #[test]
    fn test_parse_malformed_fails() {
        assert!(matches!(
            parse_document("not json").map_err(Error::into_parse),
            Err(Error::Parse(_))
        ));
    }
}
