use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use log::debug;
use serde_json::{Value, json};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::{CONTENT_ENTRY, MANIFEST_ENTRY, METADATA_ENTRY, THUMBNAIL_ENTRY};
use crate::error::{Error, Result};
use crate::model::{MindMap, Node, Relation};
use crate::util::uuid_v4;

/// Thumbnail placeholder dimensions. Consumers only require that the entry
/// exists and decodes; the pixels are a flat color.
const THUMBNAIL_SIZE: u32 = 100;

/// Write a [`MindMap`] to an XMind file on disk.
///
/// Produces the current JSON schema plus the auxiliary container entries
/// (`metadata.json`, `manifest.json`, and a placeholder thumbnail). All
/// staging happens in a scoped temporary directory; the target path only
/// receives a complete, openable archive.
///
/// # Errors
///
/// Any failure is reported as [`Error::Converter`] carrying the underlying
/// cause's message.
///
/// # Example
///
/// ```no_run
/// use mindconv::{MindMap, Node, write_xmind};
///
/// let mut map = MindMap::new("Plan");
/// map.set_root(Node::new("Plan"));
/// write_xmind(&map, "plan.xmind")?;
/// # Ok::<(), mindconv::Error>(())
/// ```
pub fn write_xmind<P: AsRef<Path>>(map: &MindMap, path: P) -> Result<()> {
    write_archive(map, path.as_ref()).map_err(Error::into_converter)
}

fn write_archive(map: &MindMap, path: &Path) -> Result<()> {
    // Staging directory is removed on every exit path when the guard drops.
    let staging = TempDir::new()?;

    let entries: [(&str, Vec<u8>); 4] = [
        (
            CONTENT_ENTRY,
            serde_json::to_vec_pretty(&build_content(map))?,
        ),
        (METADATA_ENTRY, serde_json::to_vec_pretty(&build_metadata())?),
        (MANIFEST_ENTRY, serde_json::to_vec_pretty(&build_manifest())?),
        (THUMBNAIL_ENTRY, thumbnail_png()?),
    ];

    // Stage every entry as a file first, then assemble the zip in the same
    // directory and copy the finished archive to its destination.
    for (name, bytes) in &entries {
        let staged = staging.path().join(name);
        if let Some(parent) = staged.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&staged, bytes)?;
    }

    let archive_path = staging.path().join("staged.xmind");
    let file = File::create(&archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, _) in &entries {
        let staged = staging.path().join(name);
        zip.start_file(*name, options)?;
        zip.write_all(&std::fs::read(&staged)?)?;
    }
    zip.finish()?;
    debug!("assembled archive with {} entries", entries.len());

    std::fs::copy(&archive_path, path)?;
    Ok(())
}

/// Build the content payload: a one-element sheet list in the current
/// schema. A map without a root topic yields an empty sheet list.
fn build_content(map: &MindMap) -> Value {
    let mut sheets = Vec::new();

    if let Some(root) = &map.root {
        sheets.push(json!({
            "id": uuid_v4(),
            "class": "sheet",
            "title": map.title,
            "rootTopic": topic_json(root, true),
            "detachedTopics": map
                .detached
                .iter()
                .map(|d| topic_json(d, false))
                .collect::<Vec<_>>(),
            "relationships": map
                .relations
                .iter()
                .map(relation_json)
                .collect::<Vec<_>>(),
        }));
    }

    Value::Array(sheets)
}

fn topic_json(node: &Node, is_root: bool) -> Value {
    let mut topic = json!({
        "id": node.id,
        "title": node.title,
    });

    // The top-level root additionally carries its structural classification:
    // a right-hanging logical tree.
    if is_root {
        topic["class"] = json!("topic");
        topic["structureClass"] = json!("org.xmind.ui.logic.right");
    }

    if let Some(note) = &node.note {
        topic["notes"] = json!({ "plain": { "content": note } });
    }
    if !node.labels.is_empty() {
        topic["labels"] = json!(node.labels);
    }

    topic["children"] = json!({
        "attached": node
            .children
            .iter()
            .map(|c| topic_json(c, false))
            .collect::<Vec<_>>(),
    });
    topic
}

fn relation_json(relation: &Relation) -> Value {
    json!({
        "id": relation.id,
        "end1Id": relation.source_id,
        "end2Id": relation.target_id,
        "title": relation.title,
    })
}

fn build_metadata() -> Value {
    json!({
        "dataStructureVersion": "2",
        "creator": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "layoutEngineVersion": "3",
    })
}

fn build_manifest() -> Value {
    json!({
        "file-entries": {
            CONTENT_ENTRY: {},
            METADATA_ENTRY: {},
            THUMBNAIL_ENTRY: {},
        }
    })
}

/// Synthesize a minimal flat-color PNG to stand in for the thumbnail.
fn thumbnail_png() -> Result<Vec<u8>> {
    let mut png = Vec::from(&b"\x89PNG\r\n\x1a\n"[..]);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&THUMBNAIL_SIZE.to_be_bytes());
    ihdr.extend_from_slice(&THUMBNAIL_SIZE.to_be_bytes());
    // 8-bit RGB, no interlace
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);

    // One filter byte per scanline followed by flat light-gray pixels.
    let mut raw = Vec::with_capacity((THUMBNAIL_SIZE * (1 + THUMBNAIL_SIZE * 3)) as usize);
    for _ in 0..THUMBNAIL_SIZE {
        raw.push(0);
        for _ in 0..THUMBNAIL_SIZE {
            raw.extend_from_slice(&[0xF0, 0xF2, 0xF5]);
        }
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let idat = encoder.finish()?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut crc = flate2::Crc::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_is_valid_png_shape() {
        let png = thumbnail_png().unwrap();
        assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]));
        // IHDR directly after the signature, with the fixed dimensions
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &THUMBNAIL_SIZE.to_be_bytes());
        assert_eq!(&png[20..24], &THUMBNAIL_SIZE.to_be_bytes());
        // IEND chunk closes the file
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_chunk_crc_known_value() {
        // CRC-32 of "IEND" with no data is a published constant.
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]);
        assert_eq!(out, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_root_topic_carries_structure_class() {
        let mut root = Node::new("Root");
        root.add_child(Node::new("Child"));
        let content = topic_json(&root, true);
        assert_eq!(content["class"], "topic");
        assert_eq!(content["structureClass"], "org.xmind.ui.logic.right");
        // Children never carry the structural classification.
        let child = &content["children"]["attached"][0];
        assert!(child.get("class").is_none());
    }

    #[test]
    fn test_content_empty_map_has_no_sheets() {
        let map = MindMap::new("Empty");
        assert_eq!(build_content(&map), Value::Array(Vec::new()));
    }

    #[test]
    fn test_manifest_lists_fixed_entries() {
        let manifest = build_manifest();
        let entries = manifest["file-entries"].as_object().unwrap();
        assert!(entries.contains_key(CONTENT_ENTRY));
        assert!(entries.contains_key(METADATA_ENTRY));
        assert!(entries.contains_key(THUMBNAIL_ENTRY));
        assert!(entries[CONTENT_ENTRY].as_object().unwrap().is_empty());
    }
}
