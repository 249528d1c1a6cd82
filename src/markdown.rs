//! Headed-outline (Markdown) format.
//!
//! One `#`-prefixed heading per node; heading level is tree depth + 1.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{MindMap, Node};

/// Read a Markdown outline into a [`MindMap`].
///
/// Non-heading lines are ignored. A heading deeper than its predecessor
/// becomes a child; when several top-level headings exist the last one wins
/// as root. The resulting map is titled "From Markdown".
pub fn read_markdown<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::Parse(e.to_string()))?;
    parse_outline(&text).map_err(Error::into_parse)
}

fn parse_outline(text: &str) -> Result<MindMap> {
    let mut root: Option<Node> = None;
    let mut stack: Vec<(usize, Node)> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let Some((level, title)) = heading(line) else {
            continue;
        };

        // Everything at this level or deeper is finished; fold it into its
        // parent (or surface it as a candidate root).
        while stack.len() >= level {
            fold_top(&mut stack, &mut root);
        }
        stack.push((level, Node::new(title)));
    }

    while !stack.is_empty() {
        fold_top(&mut stack, &mut root);
    }

    let mut map = MindMap::new("From Markdown");
    map.root = root;
    Ok(map)
}

fn fold_top(stack: &mut Vec<(usize, Node)>, root: &mut Option<Node>) {
    if let Some((_, done)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(done),
            None => *root = Some(done),
        }
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    if !line.starts_with('#') {
        return None;
    }
    let level = line.chars().take_while(|&c| c == '#').count();
    Some((level, line[level..].trim()))
}

/// Write a [`MindMap`] as a Markdown outline.
pub fn write_markdown<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    let mut out = String::new();
    if let Some(root) = &map.root {
        root.traverse(&mut |node, depth| {
            out.push_str(&"#".repeat(depth + 1));
            out.push(' ');
            out.push_str(&node.title);
            out.push_str("\n\n");
        });
    }
    std::fs::write(path, out).map_err(|e| Error::Converter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading("# Root"), Some((1, "Root")));
        assert_eq!(heading("###   Deep  "), Some((3, "Deep")));
        assert_eq!(heading("plain text"), None);
    }

    #[test]
    fn test_parse_outline_nesting() {
        let map = parse_outline("# Root\n\n## A\n\n### A1\n\n## B\n").unwrap();
        let root = map.root.as_ref().unwrap();
        assert_eq!(root.title, "Root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].title, "A");
        assert_eq!(root.children[0].children[0].title, "A1");
        assert_eq!(root.children[1].title, "B");
        assert_eq!(map.title, "From Markdown");
    }

    #[test]
    fn test_parse_outline_last_top_level_wins() {
        let map = parse_outline("# First\n# Second\n## Child\n").unwrap();
        let root = map.root.as_ref().unwrap();
        assert_eq!(root.title, "Second");
        assert_eq!(root.children[0].title, "Child");
    }

    #[test]
    fn test_parse_outline_no_headings() {
        let map = parse_outline("just prose\n").unwrap();
        assert!(map.root.is_none());
    }
}
