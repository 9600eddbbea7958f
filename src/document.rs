//! Document traversal seam
//!
//! The orchestrator does not define a path query language; it consumes the
//! three primitives below from a collaborator. [`JsonPointerAccess`] is the
//! provided implementation, backed by `serde_json`'s own JSON Pointer
//! support (RFC 6901), creating intermediate objects on write.

use serde_json::{Map, Value};

/// Read/write/remove primitives over a JSON document.
///
/// Implementations decide what a path means; the core only hands paths
/// through from the configured field mappings.
pub trait DocumentAccess {
    /// Resolve `path` in `document`, or `None` if absent.
    fn read<'a>(&self, document: &'a Value, path: &str) -> Option<&'a Value>;

    /// Place `value` at `path`, creating intermediate objects as needed.
    /// Returns false if the path cannot be written (e.g. traverses a scalar
    /// or names an out-of-range array index).
    fn write(&self, document: &mut Value, path: &str, value: Value) -> bool;

    /// Remove the value at `path`, returning it if it was present.
    fn remove(&self, document: &mut Value, path: &str) -> Option<Value>;
}

/// JSON Pointer implementation of [`DocumentAccess`].
///
/// Paths are RFC 6901 pointers (`"/data/field1"`; `""` is the whole
/// document). Writes materialize missing intermediate segments as objects;
/// a trailing `-` token appends to an existing array. Array elements are
/// never created beyond the current length otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPointerAccess;

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

impl DocumentAccess for JsonPointerAccess {
    fn read<'a>(&self, document: &'a Value, path: &str) -> Option<&'a Value> {
        document.pointer(path)
    }

    fn write(&self, document: &mut Value, path: &str, value: Value) -> bool {
        if path.is_empty() {
            *document = value;
            return true;
        }
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        let mut current = document;
        let mut tokens = rest.split('/').map(unescape).peekable();
        while let Some(token) = tokens.next() {
            let last = tokens.peek().is_none();
            match current {
                Value::Object(map) => {
                    if last {
                        map.insert(token, value);
                        return true;
                    }
                    current = map
                        .entry(token)
                        .or_insert_with(|| Value::Object(Map::new()));
                }
                Value::Array(items) => {
                    if last && token == "-" {
                        items.push(value);
                        return true;
                    }
                    let Ok(index) = token.parse::<usize>() else {
                        return false;
                    };
                    if index >= items.len() {
                        return false;
                    }
                    if last {
                        items[index] = value;
                        return true;
                    }
                    current = &mut items[index];
                }
                _ => return false,
            }
        }
        false
    }

    fn remove(&self, document: &mut Value, path: &str) -> Option<Value> {
        if path.is_empty() {
            return Some(std::mem::replace(document, Value::Null));
        }
        let (parent_path, token) = path.rsplit_once('/')?;
        let token = unescape(token);
        match document.pointer_mut(parent_path)? {
            Value::Object(map) => map.remove(&token),
            Value::Array(items) => {
                let index = token.parse::<usize>().ok()?;
                if index < items.len() {
                    Some(items.remove(index))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
