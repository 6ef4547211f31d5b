//! Record extraction: raw catalog entries to validated sound items
//!
//! Extraction runs in two steps per raw item:
//!
//! 1. **Validation** checks the shape of the entry and collects every
//!    violated field into a single [`ValidationFailure`]. A bad entry never
//!    stops the rest of the page.
//! 2. **Normalization** rewrites the relative paths of a valid entry into
//!    absolute URLs. `link` is always rewritten; `pianoDownloads` only when
//!    the entry also carries a non-empty `download`.

use crate::url::{absolutize, resolve_bare_link};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Image attached to a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub title: String,
    pub url: String,
}

/// A validated and normalized catalog entry
///
/// Serializes with the field names of the source catalog. Unset optional
/// fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub image: Image,
    /// Absolute URL of the entry's page
    pub link: String,
    pub download: Option<String>,
    /// Opaque player payload, passed through untouched
    pub player_data: Option<String>,
    /// Absolute when `download` is set, otherwise exactly as received
    pub piano_downloads: Option<String>,
}

/// The two shapes `link` arrives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLink {
    /// `{ "href": "/path" }`
    Href(String),
    /// `"/path"` or `"https://..."`
    Bare(String),
}

/// What is wrong with one field of a raw item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("field required")]
    Missing,

    #[error("must not be empty")]
    Empty,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

/// A violated field, addressed by its dotted path (`image.url`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.violation)
    }
}

/// A raw item that could not be turned into a [`SoundItem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Position of the item on its page
    pub index: usize,

    /// The item's `id`, when it had a usable one
    pub item_id: Option<String>,

    /// Every violated field, in check order
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.violations.len();
        write!(
            f,
            "{} validation error{} for sound item #{}",
            count,
            if count == 1 { "" } else { "s" },
            self.index
        )?;
        if let Some(id) = &self.item_id {
            write!(f, " (id {})", id)?;
        }
        for (i, violation) in self.violations.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// A raw item that passed validation but is not yet normalized
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckedItem {
    id: String,
    title: String,
    kind: String,
    text: String,
    image: Image,
    link: RawLink,
    download: Option<String>,
    player_data: Option<String>,
    piano_downloads: Option<String>,
}

/// Extracts sound items from the raw items of one page
///
/// Yields exactly one result per raw item, in page order. The iterator is
/// lazy and single-use.
///
/// # Example
///
/// ```
/// use nord_sound_crawler::crawler::extract;
/// use serde_json::json;
///
/// let raw = vec![
///     json!({
///         "id": "1", "title": "Grand", "type": "piano", "text": "A grand piano",
///         "image": { "title": "Grand", "url": "/img/grand.png" },
///         "link": { "href": "/x" }
///     }),
///     json!({ "title": "no id" }),
/// ];
///
/// let results: Vec<_> = extract(&raw, "https://www.nordkeyboards.com").collect();
/// assert_eq!(results[0].as_ref().unwrap().link, "https://www.nordkeyboards.com/x");
/// assert!(results[1].is_err());
/// ```
pub fn extract<'a>(
    raw_items: &'a [Value],
    origin: &'a str,
) -> impl Iterator<Item = Result<SoundItem, ValidationFailure>> + 'a {
    raw_items
        .iter()
        .enumerate()
        .map(move |(index, raw)| check_item(index, raw).map(|item| item.normalize(origin)))
}

/// Validates and normalizes a single raw item
pub fn extract_one(index: usize, raw: &Value, origin: &str) -> Result<SoundItem, ValidationFailure> {
    check_item(index, raw).map(|item| item.normalize(origin))
}

impl CheckedItem {
    fn normalize(self, origin: &str) -> SoundItem {
        let link = match self.link {
            RawLink::Href(path) => absolutize(origin, &path),
            RawLink::Bare(link) => resolve_bare_link(origin, &link),
        };

        let has_download = self.download.as_deref().is_some_and(|d| !d.is_empty());
        let piano_downloads = if has_download {
            self.piano_downloads.map(|path| absolutize(origin, &path))
        } else {
            self.piano_downloads
        };

        SoundItem {
            id: self.id,
            title: self.title,
            kind: self.kind,
            text: self.text,
            image: self.image,
            link,
            download: self.download,
            player_data: self.player_data,
            piano_downloads,
        }
    }
}

fn check_item(index: usize, raw: &Value) -> Result<CheckedItem, ValidationFailure> {
    let mut violations = Vec::new();

    let Some(fields) = raw.as_object() else {
        return Err(ValidationFailure {
            index,
            item_id: None,
            violations: vec![FieldViolation {
                field: "item".to_string(),
                violation: Violation::WrongType {
                    expected: "object",
                    found: type_name(raw),
                },
            }],
        });
    };

    let id = required_text(fields, "id", "", &mut violations);
    let title = required_text(fields, "title", "", &mut violations);
    let kind = required_text(fields, "type", "", &mut violations);
    let text = required_text(fields, "text", "", &mut violations);
    let image = image(fields, &mut violations);
    let link = link(fields, &mut violations);
    let download = optional_text(fields, "download", &mut violations);
    let player_data = optional_text(fields, "playerData", &mut violations);
    let piano_downloads = optional_text(fields, "pianoDownloads", &mut violations);

    match (id, title, kind, text, image, link) {
        (Some(id), Some(title), Some(kind), Some(text), Some(image), Some(link))
            if violations.is_empty() =>
        {
            Ok(CheckedItem {
                id,
                title,
                kind,
                text,
                image,
                link,
                download,
                player_data,
                piano_downloads,
            })
        }
        _ => Err(ValidationFailure {
            index,
            item_id: fields.get("id").and_then(|id| text_value(id).ok().flatten()),
            violations,
        }),
    }
}

/// Reads a required, non-empty text field
fn required_text(
    fields: &Map<String, Value>,
    key: &str,
    prefix: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let text = present_text(fields, key, prefix, violations)?;
    if text.trim().is_empty() {
        violations.push(violation(prefix, key, Violation::Empty));
        return None;
    }
    Some(text)
}

/// Reads a required text field that may be empty
fn present_text(
    fields: &Map<String, Value>,
    key: &str,
    prefix: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match fields.get(key).map(text_value) {
        Some(Ok(Some(text))) => Some(text),
        None | Some(Ok(None)) => {
            violations.push(violation(prefix, key, Violation::Missing));
            None
        }
        Some(Err(found)) => {
            violations.push(violation(
                prefix,
                key,
                Violation::WrongType {
                    expected: "string",
                    found,
                },
            ));
            None
        }
    }
}

/// Reads an optional text field; `null` and absence both mean unset
fn optional_text(
    fields: &Map<String, Value>,
    key: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match fields.get(key).map(text_value) {
        Some(Ok(text)) => text,
        None => None,
        Some(Err(found)) => {
            violations.push(violation(
                "",
                key,
                Violation::WrongType {
                    expected: "string",
                    found,
                },
            ));
            None
        }
    }
}

fn image(fields: &Map<String, Value>, violations: &mut Vec<FieldViolation>) -> Option<Image> {
    let image = match fields.get("image") {
        None | Some(Value::Null) => {
            violations.push(violation("", "image", Violation::Missing));
            return None;
        }
        Some(Value::Object(image)) => image,
        Some(other) => {
            violations.push(violation(
                "",
                "image",
                Violation::WrongType {
                    expected: "object",
                    found: type_name(other),
                },
            ));
            return None;
        }
    };

    let title = present_text(image, "title", "image", violations);
    let url = present_text(image, "url", "image", violations);
    Some(Image {
        title: title?,
        url: url?,
    })
}

fn link(fields: &Map<String, Value>, violations: &mut Vec<FieldViolation>) -> Option<RawLink> {
    match fields.get("link") {
        None | Some(Value::Null) => {
            violations.push(violation("", "link", Violation::Missing));
            None
        }
        Some(Value::String(link)) => Some(RawLink::Bare(link.clone())),
        Some(Value::Object(link)) => match link.get("href") {
            Some(Value::String(href)) => Some(RawLink::Href(href.clone())),
            None | Some(Value::Null) => {
                violations.push(violation("link", "href", Violation::Missing));
                None
            }
            Some(other) => {
                violations.push(violation(
                    "link",
                    "href",
                    Violation::WrongType {
                        expected: "string",
                        found: type_name(other),
                    },
                ));
                None
            }
        },
        Some(other) => {
            violations.push(violation(
                "",
                "link",
                Violation::WrongType {
                    expected: "object or string",
                    found: type_name(other),
                },
            ));
            None
        }
    }
}

/// Text view of a scalar: strings as-is, numbers rendered, `null` unset
fn text_value(value: &Value) -> Result<Option<String>, &'static str> {
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        other => Err(type_name(other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn violation(prefix: &str, key: &str, violation: Violation) -> FieldViolation {
    let field = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    };
    FieldViolation { field, violation }
}
