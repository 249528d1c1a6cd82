use std::fs::File;
use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use serde::Deserialize;
use tempfile::TempDir;
use zip::ZipArchive;

use super::{CONTENT_ENTRY, LEGACY_CONTENT_ENTRY};
use crate::error::{Error, Result};
use crate::model::{MindMap, Node, Relation, normalize_title};
use crate::util::uuid_v4;

/// Default title for relations whose source data carries none.
const DEFAULT_RELATION_TITLE: &str = "Relation";

/// Read an XMind file from disk into a [`MindMap`].
///
/// Supports both the current JSON schema (`content.json`) and the legacy XML
/// schema (`content.xml`); only the first sheet of a multi-sheet document is
/// used.
///
/// # Errors
///
/// - [`Error::NotFound`] if the path does not exist
/// - [`Error::Format`] if the file is not a valid zip container
/// - [`Error::Parse`] for anything that goes wrong after that, carrying the
///   underlying cause's message
///
/// # Example
///
/// ```no_run
/// use mindconv::read_xmind;
///
/// let map = read_xmind("path/to/map.xmind")?;
/// println!("Title: {}", map.title);
/// # Ok::<(), mindconv::Error>(())
/// ```
pub fn read_xmind<P: AsRef<Path>>(path: P) -> Result<MindMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }

    let file = File::open(path).map_err(|e| Error::Parse(e.to_string()))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|_| Error::Format(format!("not a valid XMind archive: {}", path.display())))?;

    read_archive(&mut archive).map_err(Error::into_parse)
}

fn read_archive(archive: &mut ZipArchive<File>) -> Result<MindMap> {
    // Extraction directory is removed on every exit path when the guard drops.
    let staging = TempDir::new()?;
    archive.extract(staging.path())?;

    let json_path = staging.path().join(CONTENT_ENTRY);
    if json_path.exists() {
        debug!("detected current schema ({CONTENT_ENTRY})");
        let text = std::fs::read_to_string(&json_path)?;
        return parse_content_json(&text);
    }

    let xml_path = staging.path().join(LEGACY_CONTENT_ENTRY);
    if xml_path.exists() {
        debug!("detected legacy schema ({LEGACY_CONTENT_ENTRY})");
        let text = std::fs::read_to_string(&xml_path)?;
        return parse_content_xml(&text);
    }

    Err(Error::Parse(format!(
        "archive contains neither {CONTENT_ENTRY} nor {LEGACY_CONTENT_ENTRY}"
    )))
}

// ---------------------------------------------------------------------------
// Current schema: content.json
// ---------------------------------------------------------------------------

/// Top-level payload: either a bare sheet list, or an object wrapping one
/// (emitted by some older producers of the JSON schema).
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentPayload {
    Sheets(Vec<SheetJson>),
    Wrapped { sheets: Vec<SheetJson> },
}

#[derive(Deserialize)]
struct SheetJson {
    title: Option<String>,
    #[serde(rename = "rootTopic")]
    root_topic: Option<TopicJson>,
    #[serde(default, rename = "detachedTopics")]
    detached_topics: Vec<TopicJson>,
    #[serde(default)]
    relationships: Vec<RelationshipJson>,
}

#[derive(Deserialize)]
struct TopicJson {
    id: Option<String>,
    #[serde(default)]
    title: String,
    notes: Option<NotesJson>,
    #[serde(default)]
    labels: Vec<String>,
    children: Option<ChildrenJson>,
}

#[derive(Deserialize)]
struct ChildrenJson {
    #[serde(default)]
    attached: Vec<TopicJson>,
}

/// Notes appear either as a bare string or wrapped in a plain-content
/// object. Anything else (e.g., rich-text-only notes) is treated as absent.
#[derive(Deserialize)]
#[serde(untagged)]
enum NotesJson {
    Text(String),
    Wrapped { plain: PlainJson },
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlainJson {
    Text(String),
    Content {
        #[serde(default)]
        content: String,
    },
    Other(serde_json::Value),
}

#[derive(Deserialize)]
struct RelationshipJson {
    id: Option<String>,
    #[serde(default, rename = "end1Id")]
    end1_id: String,
    #[serde(default, rename = "end2Id")]
    end2_id: String,
    title: Option<String>,
}

impl NotesJson {
    fn into_text(self) -> Option<String> {
        let text = match self {
            NotesJson::Text(s) => s,
            NotesJson::Wrapped { plain } => match plain {
                PlainJson::Text(s) => s,
                PlainJson::Content { content } => content,
                PlainJson::Other(_) => return None,
            },
            NotesJson::Other(_) => return None,
        };
        (!text.is_empty()).then_some(text)
    }
}

fn parse_content_json(text: &str) -> Result<MindMap> {
    let payload: ContentPayload = serde_json::from_str(text)?;
    let sheets = match payload {
        ContentPayload::Sheets(sheets) => sheets,
        ContentPayload::Wrapped { sheets } => sheets,
    };

    // Only the first sheet of a multi-sheet document is converted.
    let sheet = sheets
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse("no sheets found in content.json".into()))?;

    let root_topic = sheet
        .root_topic
        .ok_or_else(|| Error::Parse("sheet has no rootTopic".into()))?;

    let mut map = MindMap::new(sheet.title.unwrap_or_default());
    map.set_root(build_topic(root_topic));

    for topic in sheet.detached_topics {
        map.add_detached(build_topic(topic));
    }

    for rel in sheet.relationships {
        map.add_relation(Relation::with_id(
            rel.id.unwrap_or_else(uuid_v4),
            rel.end1_id,
            rel.end2_id,
            rel.title
                .unwrap_or_else(|| DEFAULT_RELATION_TITLE.to_string()),
        ));
    }

    Ok(map)
}

fn build_topic(topic: TopicJson) -> Node {
    let mut node = match topic.id {
        Some(id) => Node::with_id(id, &topic.title),
        None => Node::new(&topic.title),
    };
    node.note = topic.notes.and_then(NotesJson::into_text);
    // Labels are pushed raw on load; duplicates in source data survive.
    node.labels = topic.labels;
    if let Some(children) = topic.children {
        for child in children.attached {
            node.add_child(build_topic(child));
        }
    }
    node
}

// ---------------------------------------------------------------------------
// Legacy schema: content.xml
// ---------------------------------------------------------------------------

/// Which element's text is currently being captured for the innermost topic.
enum TextTarget {
    Title,
    Note,
    Label,
}

fn parse_content_xml(text: &str) -> Result<MindMap> {
    // Text is captured raw and trimmed at assignment, so whitespace around
    // entity references inside titles survives intact.
    let mut reader = Reader::from_str(text);

    let mut map_title: Option<String> = None;
    let mut root: Option<Node> = None;
    let mut detached: Vec<Node> = Vec::new();
    let mut relations: Vec<Relation> = Vec::new();

    let mut topic_stack: Vec<Node> = Vec::new();
    let mut in_first_sheet = false;
    let mut sheet_done = false;
    let mut in_detached = false;
    let mut text_target: Option<TextTarget> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"sheet" if !in_first_sheet && !sheet_done => {
                    in_first_sheet = true;
                    for attr in e.attributes().flatten() {
                        if local_name(attr.key.as_ref()) == b"title" {
                            map_title = Some(attr_text(attr.value.as_ref())?);
                        }
                    }
                }
                b"topic" if in_first_sheet && !sheet_done => {
                    topic_stack.push(topic_from_attrs(&e)?);
                }
                b"detached" => in_detached = true,
                b"title" if !topic_stack.is_empty() => {
                    text_target = Some(TextTarget::Title);
                    buf_text.clear();
                }
                b"plain" if !topic_stack.is_empty() => {
                    text_target = Some(TextTarget::Note);
                    buf_text.clear();
                }
                b"label" if !topic_stack.is_empty() => {
                    text_target = Some(TextTarget::Label);
                    buf_text.clear();
                }
                b"relationship" if in_first_sheet && !sheet_done => {
                    relations.push(relation_from_attrs(&e)?);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"topic" if in_first_sheet && !sheet_done => {
                    let node = topic_from_attrs(&e)?;
                    attach_topic(node, &mut topic_stack, &mut root, &mut detached, in_detached);
                }
                b"relationship" if in_first_sheet && !sheet_done => {
                    relations.push(relation_from_attrs(&e)?);
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if text_target.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                if text_target.is_some() {
                    buf_text.push_str(resolve_entity(&String::from_utf8_lossy(e.as_ref())));
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"sheet" => {
                    if in_first_sheet {
                        sheet_done = true;
                    }
                }
                b"topic" => {
                    if let Some(node) = topic_stack.pop() {
                        attach_topic(node, &mut topic_stack, &mut root, &mut detached, in_detached);
                    }
                }
                b"detached" => in_detached = false,
                b"title" | b"plain" | b"label" => {
                    if let (Some(target), Some(node)) = (text_target.take(), topic_stack.last_mut())
                    {
                        match target {
                            TextTarget::Title => node.title = normalize_title(&buf_text),
                            TextTarget::Note => {
                                let note = buf_text.trim();
                                if !note.is_empty() {
                                    node.note = Some(note.to_string());
                                }
                            }
                            // Raw push: duplicates in source data survive.
                            TextTarget::Label => node.labels.push(buf_text.trim().to_string()),
                        }
                    }
                    buf_text.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    let root = root.ok_or_else(|| Error::Parse("no root topic found in content.xml".into()))?;

    let mut map = MindMap::new(map_title.unwrap_or_default());
    map.set_root(root);
    map.detached = detached;
    map.relations = relations;
    Ok(map)
}

/// Finished topic attachment: nested topics become children of the topic
/// above them, top-level topics inside a `detached` wrapper join the
/// detached list, and the first remaining top-level topic is the root.
fn attach_topic(
    node: Node,
    stack: &mut Vec<Node>,
    root: &mut Option<Node>,
    detached: &mut Vec<Node>,
    in_detached: bool,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if in_detached {
        detached.push(node);
    } else if root.is_none() {
        *root = Some(node);
    }
}

/// Decode an attribute value, resolving entity references the same way text
/// content is resolved. Malformed escapes fall back to the raw value.
fn attr_text(value: &[u8]) -> Result<String> {
    let raw = String::from_utf8(value.to_vec())?;
    Ok(unescape(&raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.clone()))
}

fn topic_from_attrs(e: &quick_xml::events::BytesStart) -> Result<Node> {
    let mut node = Node::new("");
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == b"id" {
            node.id = attr_text(attr.value.as_ref())?;
        }
    }
    Ok(node)
}

fn relation_from_attrs(e: &quick_xml::events::BytesStart) -> Result<Relation> {
    let mut id = None;
    let mut end1 = String::new();
    let mut end2 = String::new();
    let mut title = None;

    for attr in e.attributes().flatten() {
        let value = attr_text(attr.value.as_ref())?;
        match local_name(attr.key.as_ref()) {
            b"id" => id = Some(value),
            b"end1Id" => end1 = value,
            b"end2Id" => end2 = value,
            b"title" => title = Some(value),
            _ => {}
        }
    }

    Ok(Relation::with_id(
        id.unwrap_or_else(uuid_v4),
        end1,
        end2,
        title.unwrap_or_else(|| DEFAULT_RELATION_TITLE.to_string()),
    ))
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

/// Extract local name from a potentially namespaced XML name.
///
/// The legacy schema's namespace declaration is inconsistently present
/// across producer versions, so both `xmap:topic` and `topic` must match.
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}
