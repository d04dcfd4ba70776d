//! Message flattening and `.umc` emission (`spec.md` §4.4-§4.5).
//!
//! Flattening walks the parse tree depth-first to produce the flat message
//! list the lookup table and blob are built from; emission then writes the
//! signature, language, LCID, lookup table and blob in that fixed order.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::diagnostics::{Code, Diagnostic, Handler};
use crate::hash::hash_id;
use crate::tree::{Group, ParseTree};

/// One message after flattening: its fully-qualified id (group path plus
/// the raw `#id`) and its value, ready to be hashed and written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatMessage {
    pub id: String,
    pub value: String,
}

/// A symbol's on-disk locations: the absolute file offset of its lookup
/// entry, and the absolute file offset of its value within the blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolLocation {
    pub id: u64,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub location: SymbolLocation,
    pub id: String,
}

/// Flattens a parse tree into the message order the lookup table and blob
/// are emitted in: root messages first in source order, then each root
/// subgroup's flattened messages in source order; within a group, its own
/// messages precede its subgroups' (`spec.md` §4.5).
pub fn flatten(tree: &ParseTree) -> Vec<FlatMessage> {
    let mut out = Vec::with_capacity(tree.content.messages.len());
    for message in &tree.content.messages {
        out.push(FlatMessage {
            id: message.id.clone(),
            value: message.value.clone(),
        });
    }
    for group in &tree.content.groups {
        flatten_group(group, "", &mut out);
    }
    out
}

fn flatten_group(group: &Group, parent_path: &str, out: &mut Vec<FlatMessage>) {
    let path = if parent_path.is_empty() {
        group.name.clone()
    } else {
        format!("{}.{}", parent_path, group.name)
    };

    for message in &group.messages {
        out.push(FlatMessage {
            id: format!("{}{}", path, message.id),
            value: message.value.clone(),
        });
    }
    for child in &group.groups {
        flatten_group(child, &path, out);
    }
}

const SIGNATURE: [u8; 4] = [b'U', b'M', b'C', 0x00];
const LOOKUP_ENTRY_SIZE: u64 = 20;

/// Writes the `.umc` catalog for `tree` to `path`, returning the symbols
/// (lookup-entry and value offsets) for each message in emission order
/// when `want_symbols` is set. Returns `None` and records a diagnostic on
/// `handler` on any I/O failure (`E3000-E3004`), per `spec.md` §4.4.
pub fn write_catalog(
    path: &Path,
    tree: &ParseTree,
    want_symbols: bool,
    handler: &mut Handler<'_>,
) -> Option<Vec<Symbol>> {
    let messages = flatten(tree);

    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            handler.record(Diagnostic::error(
                Code::E3000CreateFailed,
                format!("failed to create '{}': {}", path.display(), e),
            ));
            return None;
        }
    };
    let mut out = io::BufWriter::new(file);
    let mut written: u64 = 0;

    macro_rules! write_or_fail {
        ($code:expr, $bytes:expr) => {
            match out.write_all($bytes) {
                Ok(()) => written += $bytes.len() as u64,
                Err(e) => {
                    handler.record(Diagnostic::error(
                        $code,
                        format!("failed to write '{}': {}", path.display(), e),
                    ));
                    return None;
                }
            }
        };
    }

    write_or_fail!(Code::E3002HeaderWriteFailed, &SIGNATURE);

    let language_bytes = tree.language.as_bytes();
    write_or_fail!(
        Code::E3002HeaderWriteFailed,
        &[language_bytes.len() as u8][..]
    );
    write_or_fail!(Code::E3002HeaderWriteFailed, language_bytes);
    write_or_fail!(Code::E3002HeaderWriteFailed, &tree.lcid.to_le_bytes());
    write_or_fail!(
        Code::E3002HeaderWriteFailed,
        &(messages.len() as u32).to_le_bytes()
    );

    let table_start = written;
    let mut offset: u64 = 0;
    let mut symbols = Vec::with_capacity(if want_symbols { messages.len() } else { 0 });
    for (index, message) in messages.iter().enumerate() {
        let hash = hash_id(&message.id);
        let length = message.value.len() as u32;
        let entry_offset = table_start + index as u64 * LOOKUP_ENTRY_SIZE;

        write_or_fail!(Code::E3003TableWriteFailed, &hash.to_le_bytes());
        write_or_fail!(Code::E3003TableWriteFailed, &offset.to_le_bytes());
        write_or_fail!(Code::E3003TableWriteFailed, &length.to_le_bytes());

        if want_symbols {
            symbols.push(Symbol {
                location: SymbolLocation {
                    id: entry_offset,
                    value: 0, // filled in below once the blob's start is known
                },
                id: message.id.clone(),
            });
        }
        offset += length as u64;
    }

    let blob_start = written;
    for (index, message) in messages.iter().enumerate() {
        let bytes = message.value.as_bytes();
        write_or_fail!(Code::E3004BlobWriteFailed, bytes);
        if want_symbols {
            let prior: u64 = messages[..index].iter().map(|m| m.value.len() as u64).sum();
            symbols[index].location.value = blob_start + prior;
        }
    }

    if let Err(e) = out.flush() {
        handler.record(Diagnostic::error(
            Code::E3004BlobWriteFailed,
            format!("failed to flush '{}': {}", path.display(), e),
        ));
        return None;
    }

    Some(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorModel;
    use crate::tree::{Message, RootGroup};
    use tempfile::tempdir;

    fn minimal_tree() -> ParseTree {
        ParseTree {
            language: "en".into(),
            lcid: 1033,
            content: RootGroup {
                messages: vec![Message {
                    id: "#hello".into(),
                    value: "Hello".into(),
                }],
                groups: vec![],
            },
        }
    }

    #[test]
    fn flattens_grouped_pack_in_expected_order() {
        let mut tree = minimal_tree();
        let mut ui = Group::new("ui");
        ui.messages.push(Message {
            id: "#ok".into(),
            value: "OK".into(),
        });
        ui.messages.push(Message {
            id: "#cancel".into(),
            value: "Cancel".into(),
        });
        tree.content.messages.push(Message {
            id: "#bye".into(),
            value: "Bye".into(),
        });
        tree.content.groups.push(ui);

        let flat = flatten(&tree);
        let ids: Vec<&str> = flat.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["#hello", "#bye", "ui#ok", "ui#cancel"]);
    }

    #[test]
    fn nested_group_path_is_dotted() {
        let mut tree = minimal_tree();
        tree.content.messages.clear();
        let mut outer = Group::new("g1");
        let mut inner = Group::new("g2");
        inner.messages.push(Message {
            id: "#m".into(),
            value: "v".into(),
        });
        outer.groups.push(inner);
        tree.content.groups.push(outer);

        let flat = flatten(&tree);
        assert_eq!(flat[0].id, "g1.g2#m");
    }

    #[test]
    fn writes_minimal_catalog_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pack.umc");
        let tree = minimal_tree();
        let sink = |_: &str| {};
        let mut handler = Handler::new(ErrorModel::Soft, &sink);

        let symbols = write_catalog(&path, &tree, true, &mut handler).unwrap();
        assert_eq!(handler.counters().errors, 0);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], &SIGNATURE);
        assert_eq!(bytes[4], 2); // language length
        assert_eq!(&bytes[5..7], b"en");
        assert_eq!(u32::from_le_bytes(bytes[7..11].try_into().unwrap()), 1033);
        assert_eq!(u32::from_le_bytes(bytes[11..15].try_into().unwrap()), 1);

        let hash = u64::from_le_bytes(bytes[15..23].try_into().unwrap());
        assert_eq!(hash, hash_id("#hello"));
        let offset = u64::from_le_bytes(bytes[23..31].try_into().unwrap());
        assert_eq!(offset, 0);
        let length = u32::from_le_bytes(bytes[31..35].try_into().unwrap());
        assert_eq!(length, 5);
        assert_eq!(&bytes[35..40], b"Hello");

        assert_eq!(bytes.len(), 13 + 2 + 20 + 5);
        assert_eq!(symbols[0].location.id, 15);
        assert_eq!(symbols[0].location.value, 35);
    }

    #[test]
    fn empty_content_produces_header_only_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.umc");
        let tree = ParseTree {
            language: "en".into(),
            lcid: 1,
            content: RootGroup::default(),
        };
        let sink = |_: &str| {};
        let mut handler = Handler::new(ErrorModel::Soft, &sink);
        write_catalog(&path, &tree, false, &mut handler).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 13 + 2);
    }
}
