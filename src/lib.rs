//! # mindconv
//!
//! A fast, lightweight library for converting mind maps between the XMind
//! archive format and plain-text interchange formats.
//!
//! ## Features
//!
//! - Read XMind archives in both the current JSON schema and the legacy XML schema
//! - Write XMind archives (content, metadata, manifest, thumbnail)
//! - Convert to and from CSV triples, Markdown outlines, HTML, and JSON
//! - Format-agnostic [`MindMap`] model with notes, labels, detached topics,
//!   and cross-tree relations
//!
//! ## Quick Start
//!
//! ```no_run
//! use mindconv::{read_xmind, write_markdown, read_csv, write_xmind};
//!
//! // Convert XMind to Markdown
//! let map = read_xmind("input.xmind")?;
//! write_markdown(&map, "output.md")?;
//!
//! // Convert CSV triples to XMind
//! let map = read_csv("input.csv")?;
//! write_xmind(&map, "output.xmind")?;
//! # Ok::<(), mindconv::Error>(())
//! ```
//!
//! ## Working with mind maps
//!
//! The [`MindMap`] struct is the central data type, representing a mind map
//! in a format-agnostic way:
//!
//! ```
//! use mindconv::{MindMap, Node, Relation};
//!
//! let mut root = Node::new("Project");
//! root.add_child(Node::new("Goals"));
//! root.add_child(Node::new("Tasks"));
//!
//! let mut map = MindMap::new("Planning");
//! map.set_root(root);
//! map.add_detached(Node::new("Parking lot"));
//!
//! let goals = map.root.as_ref().unwrap().children[0].id.clone();
//! let tasks = map.root.as_ref().unwrap().children[1].id.clone();
//! map.add_relation(Relation::new(goals, tasks, "drives"));
//! ```

pub mod convert;
pub mod csv;
pub mod error;
pub mod html;
pub mod json;
pub mod markdown;
pub mod model;
pub(crate) mod util;
pub mod xmind;

pub use convert::{Format, read_mindmap, write_mindmap};
pub use csv::{read_csv, write_csv};
pub use error::{Error, Result};
pub use html::{read_html, write_html};
pub use json::{read_json, write_json};
pub use markdown::{read_markdown, write_markdown};
pub use model::{MindMap, Node, Relation};
pub use xmind::{read_xmind, write_xmind};
