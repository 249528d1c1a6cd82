//! Hypertext format.
//!
//! The writer emits a self-contained page with an `h1` title and the tree as
//! nested `div.node` / `div.children` elements; the reader walks the same
//! structure back into a [`MindMap`].

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::model::{MindMap, Node};

/// Read a hypertext mind map into a [`MindMap`].
///
/// Expects the nested `div.node` structure this crate's writer produces.
/// The map title comes from the `h1` element, defaulting to "From HTML".
pub fn read_html<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::Parse(e.to_string()))?;
    parse_document(&text).map_err(Error::into_parse)
}

/// A `div.node` element whose title text and children are still being
/// collected.
struct NodeFrame {
    title_buf: String,
    title_done: bool,
    children: Vec<Node>,
}

fn parse_document(text: &str) -> Result<MindMap> {
    let mut reader = Reader::from_str(text);
    // Tolerate loose hypertext (unclosed void elements, stray end tags).
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut title: Option<String> = None;
    let mut root: Option<Node> = None;

    let mut in_h1 = false;
    let mut h1_buf = String::new();
    let mut div_classes: Vec<String> = Vec::new();
    let mut frames: Vec<NodeFrame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"h1" => {
                    in_h1 = true;
                    h1_buf.clear();
                }
                b"div" => {
                    let class = class_attr(&e)?;
                    if is_node_class(&class) {
                        frames.push(NodeFrame {
                            title_buf: String::new(),
                            title_done: false,
                            children: Vec::new(),
                        });
                    } else if class.contains("children")
                        && let Some(frame) = frames.last_mut()
                    {
                        frame.title_done = true;
                    }
                    div_classes.push(class);
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                if in_h1 {
                    h1_buf.push_str(&raw);
                } else if let Some(frame) = frames.last_mut()
                    && !frame.title_done
                {
                    frame.title_buf.push_str(&raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                let resolved = resolve_entity(&String::from_utf8_lossy(e.as_ref()));
                if in_h1 {
                    h1_buf.push_str(resolved);
                } else if let Some(frame) = frames.last_mut()
                    && !frame.title_done
                {
                    frame.title_buf.push_str(resolved);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"h1" => {
                    in_h1 = false;
                    let text = h1_buf.trim();
                    if !text.is_empty() {
                        title = Some(text.to_string());
                    }
                }
                b"div" => {
                    let class = div_classes.pop().unwrap_or_default();
                    if is_node_class(&class)
                        && let Some(frame) = frames.pop()
                    {
                        let mut node = Node::new(&frame.title_buf);
                        node.children = frame.children;
                        match frames.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => root = root.or(Some(node)),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    let mut map = MindMap::new(title.unwrap_or_else(|| "From HTML".to_string()));
    map.root = root;
    Ok(map)
}

fn is_node_class(class: &str) -> bool {
    class.contains("node") && !class.contains("children")
}

fn class_attr(e: &quick_xml::events::BytesStart) -> Result<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"class" {
            return Ok(String::from_utf8(attr.value.to_vec())?);
        }
    }
    Ok(String::new())
}

fn resolve_entity(entity: &str) -> &'static str {
    match entity {
        "apos" => "'",
        "quot" => "\"",
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        _ => "",
    }
}

/// Write a [`MindMap`] as a standalone hypertext page.
pub fn write_html<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    let mut out = String::new();
    let title = escape_html(&map.title);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\"/>\n");
    out.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n");
    out.push_str(&format!("    <title>{title}</title>\n"));
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("    <h1>{title}</h1>\n"));
    out.push_str("    <div class=\"mindmap\">\n");

    if let Some(root) = &map.root {
        write_node(root, 0, &mut out);
    }

    out.push_str("    </div>\n</body>\n</html>\n");
    std::fs::write(path, out).map_err(|e| Error::Converter(e.to_string()))
}

const STYLE: &str = "    <style>\n\
        body { font-family: Arial, sans-serif; line-height: 1.6; margin: 20px; }\n\
        .mindmap { margin: 20px 0; }\n\
        .node { margin: 10px 0; }\n\
        .children { margin-left: 20px; }\n\
        .root { font-size: 1.5em; font-weight: bold; }\n\
        .level-1 { font-size: 1.2em; font-weight: bold; }\n\
        .level-2 { font-size: 1.1em; font-weight: bold; }\n\
    </style>\n";

fn write_node(node: &Node, level: usize, out: &mut String) {
    let mut class = format!("node level-{level}");
    if level == 0 {
        class.push_str(" root");
    }

    out.push_str(&format!("    <div class=\"{class}\">\n"));
    out.push_str(&format!("        {}\n", escape_html(&node.title)));

    if !node.children.is_empty() {
        out.push_str("        <div class=\"children\">\n");
        for child in &node.children {
            write_node(child, level + 1, out);
        }
        out.push_str("        </div>\n");
    }

    out.push_str("    </div>\n");
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_nodes() {
        let html = r#"<!DOCTYPE html>
<html><head><title>ignored</title></head>
<body>
  <h1>Demo Map</h1>
  <div class="mindmap">
    <div class="node level-0 root">
      Root
      <div class="children">
        <div class="node level-1">A</div>
        <div class="node level-1">
          B
          <div class="children">
            <div class="node level-2">B1</div>
          </div>
        </div>
      </div>
    </div>
  </div>
</body></html>"#;
        let map = parse_document(html).unwrap();
        assert_eq!(map.title, "Demo Map");
        let root = map.root.as_ref().unwrap();
        assert_eq!(root.title, "Root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].title, "A");
        assert_eq!(root.children[1].children[0].title, "B1");
    }

    #[test]
    fn test_parse_entities_in_titles() {
        let html = r#"<html><body><h1>A &amp; B</h1>
<div class="mindmap"><div class="node root">Don&apos;t</div></div>
</body></html>"#;
        let map = parse_document(html).unwrap();
        assert_eq!(map.title, "A & B");
        assert_eq!(map.root.as_ref().unwrap().title, "Don't");
    }

    #[test]
    fn test_parse_no_nodes() {
        let map = parse_document("<html><body><h1>Empty</h1></body></html>").unwrap();
        assert_eq!(map.title, "Empty");
        assert!(map.root.is_none());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
    }
}
