//! Reads compiled artifacts back into records.
//!
//! The decoder is the inverse of the encoder as far as the format goes. It
//! does not rebuild an [`Adventure`](acl_core::Adventure); references stay
//! numeric IDs.

use std::collections::BTreeMap;

use acl_core::{AclError, AclResult, ArgumentType, Direction, Keyword, ObjectId, SupportedVersion, Version};

use crate::tags::{self, Tag};

/// A decoded artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Version of the compiler that wrote the artifact.
    pub compiler_version: Version,
    /// Runtime versions able to load the artifact.
    pub runtimes: SupportedVersion,
    /// ID of the room the player starts in.
    pub starting_room: ObjectId,
    /// Adventure title.
    pub name: String,
    /// Text shown when the game starts.
    pub starting_text: String,
    /// One record per game object, in file order.
    pub records: Vec<Record>,
}

impl Artifact {
    /// Find a record by ID.
    pub fn record(&self, id: ObjectId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// Type marker of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A room.
    Room,
    /// A standalone description block.
    Descriptions,
    /// An item.
    Item,
    /// A verb.
    Verb,
    /// A verb argument.
    Argument,
    /// A code statement.
    Code,
    /// A pre-rendered body with no type marker.
    Rendered,
}

impl RecordKind {
    fn from_marker(tag: Tag) -> Option<Self> {
        Some(match tag {
            tags::ROOM_TYPE => Self::Room,
            tags::DESCRIPTIONS_TYPE => Self::Descriptions,
            tags::ITEM_TYPE => Self::Item,
            tags::VERB_TYPE => Self::Verb,
            tags::ARGUMENT_TYPE => Self::Argument,
            tags::CODE_TYPE => Self::Code,
            _ => return None,
        })
    }
}

/// One entry of the lookup region.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The object's ID.
    pub id: ObjectId,
    /// What kind of object the record describes.
    pub kind: RecordKind,
    /// Typed fields as raw payloads, in file order.
    pub fields: Vec<(Tag, Vec<u8>)>,
    /// Property pairs, in file order.
    pub properties: Vec<(String, String)>,
    /// Body text of a rendered record.
    pub rendering: Option<String>,
}

impl Record {
    /// Raw payload of the field with `tag`.
    pub fn field(&self, tag: Tag) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, payload)| payload.as_slice())
    }

    /// Payload of a text field.
    pub fn text(&self, tag: Tag) -> Option<&str> {
        self.field(tag).and_then(|p| std::str::from_utf8(p).ok())
    }

    /// Elements of an ordered list field. A missing field is an empty list.
    pub fn list(&self, tag: Tag) -> AclResult<Vec<String>> {
        let payload = self.field(tag).unwrap_or_default();
        tags::split_on(payload, tags::SEP)
            .into_iter()
            .map(utf8)
            .collect()
    }

    /// Entries of a `key SET value` mapping field, in file order.
    pub fn pairs(&self, tag: Tag) -> AclResult<Vec<(String, String)>> {
        let payload = self.field(tag).unwrap_or_default();
        split_pairs(payload)
    }

    /// Elements of a list field that holds IDs.
    pub fn ids(&self, tag: Tag) -> AclResult<Vec<ObjectId>> {
        self.list(tag)?.iter().map(|s| parse_id(s)).collect()
    }

    /// A direction-keyed mapping such as exits or exit descriptions.
    pub fn directions(&self, tag: Tag) -> AclResult<BTreeMap<Direction, ObjectId>> {
        self.pairs(tag)?
            .iter()
            .map(|(code, id)| {
                let dir = code
                    .parse::<u8>()
                    .ok()
                    .and_then(Direction::from_code)
                    .ok_or_else(|| AclError::Format(format!("bad direction code \"{code}\"")))?;
                Ok((dir, parse_id(id)?))
            })
            .collect()
    }

    /// Keyword of a code record.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.field(tags::CODE_KEYWORD)? {
            [tags::KEYWORD_PREFIX, code] => Keyword::from_code(*code),
            _ => None,
        }
    }

    /// Kind of an argument record.
    pub fn argument_type(&self) -> Option<ArgumentType> {
        match self.field(tags::ARGUMENT_TYPEOF)? {
            [tags::ARGUMENT_TYPE_PREFIX, code] => ArgumentType::from_code(*code),
            _ => None,
        }
    }
}

/// Decode a complete artifact.
pub fn decode(bytes: &[u8]) -> AclResult<Artifact> {
    let mut r = Reader { bytes, pos: 0 };

    r.expect_bytes(tags::MAGIC)?;
    let compiler_version: Version = utf8(r.read_until(tags::VERSION_RUNTIME_SEP)?)?.parse()?;
    let runtimes: SupportedVersion = utf8(r.read_until(tags::END_RUNTIME)?)?.parse()?;

    r.expect(tags::STARTING_ROOM)?;
    let starting_room = parse_id(&utf8(r.read_until(tags::END_RECORD)?)?)?;
    r.expect(tags::ADVENTURE_NAME)?;
    let name = utf8(r.read_until(tags::END_RECORD)?)?;
    r.expect(tags::ADVENTURE_START_TEXT)?;
    let starting_text = utf8(r.read_until(tags::END_RECORD)?)?;

    r.expect(tags::BEGIN_LOOKUP)?;
    let mut records = Vec::new();
    loop {
        if r.peek() == Some(tags::END_LOOKUP) {
            r.pos += 2;
            break;
        }
        records.push(r.record()?);
    }
    if r.pos != bytes.len() {
        return Err(AclError::Format(format!(
            "{} trailing bytes after lookup region",
            bytes.len() - r.pos
        )));
    }

    tracing::debug!(records = records.len(), "decoded artifact");
    Ok(Artifact {
        compiler_version,
        runtimes,
        starting_room,
        name,
        starting_text,
        records,
    })
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<Tag> {
        match self.bytes.get(self.pos..self.pos + 2) {
            Some([a, b]) => Some([*a, *b]),
            _ => None,
        }
    }

    fn take(&mut self, n: usize) -> AclResult<&'a [u8]> {
        let chunk = self
            .bytes
            .get(self.pos..self.pos + n)
            .ok_or_else(|| AclError::Format(format!("unexpected end of artifact at byte {}", self.pos)))?;
        self.pos += n;
        Ok(chunk)
    }

    fn expect_bytes(&mut self, expected: &[u8]) -> AclResult<()> {
        let at = self.pos;
        if self.take(expected.len())? != expected {
            return Err(AclError::Format(format!("expected {expected:02X?} at byte {at}")));
        }
        Ok(())
    }

    fn expect(&mut self, tag: Tag) -> AclResult<()> {
        self.expect_bytes(&tag)
    }

    /// Consume up to and including the next `tag`, returning what came before.
    ///
    /// Any lead byte starts a two-byte tag, so other tags are stepped over whole.
    fn read_until(&mut self, tag: Tag) -> AclResult<&'a [u8]> {
        let start = self.pos;
        let mut i = start;
        while i + 1 < self.bytes.len() {
            if tags::is_tag_lead(self.bytes[i]) {
                if self.bytes[i..i + 2] == tag {
                    self.pos = i + 2;
                    return Ok(&self.bytes[start..i]);
                }
                i += 2;
            } else {
                i += 1;
            }
        }
        Err(AclError::Format(format!(
            "missing {tag:02X?} after byte {start}"
        )))
    }

    fn record(&mut self) -> AclResult<Record> {
        self.expect(tags::ID)?;
        let id = parse_id(&utf8(self.read_until(tags::END_FIELD)?)?)?;
        self.expect(tags::TYPE)?;

        let marker = self.peek().and_then(RecordKind::from_marker);
        let mut fields = Vec::new();
        let mut rendering = None;
        let kind = match marker {
            Some(kind) => {
                self.pos += 2;
                while let Some(tag) = self.peek() {
                    if tag == tags::PROPS {
                        break;
                    }
                    self.pos += 2;
                    let payload = if tag == tags::CODE_KEYWORD || tag == tags::ARGUMENT_TYPEOF {
                        let fixed = self.take(2)?;
                        self.expect(tags::END_FIELD)?;
                        fixed
                    } else {
                        self.read_until(tags::END_FIELD)?
                    };
                    fields.push((tag, payload.to_vec()));
                }
                self.expect(tags::PROPS)?;
                kind
            }
            None => {
                rendering = Some(utf8(self.read_until(tags::PROPS)?)?);
                RecordKind::Rendered
            }
        };

        let properties = split_pairs(self.read_until(tags::END_FIELD)?)?;
        self.expect(tags::END_RECORD)?;
        tracing::trace!(%id, ?kind, "decoded record");
        Ok(Record {
            id,
            kind,
            fields,
            properties,
            rendering,
        })
    }
}

fn utf8(bytes: &[u8]) -> AclResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| AclError::Format(format!("payload is not UTF-8: {e}")))
}

fn parse_id(s: &str) -> AclResult<ObjectId> {
    s.parse()
        .map(ObjectId)
        .map_err(|_| AclError::Format(format!("bad object ID \"{s}\"")))
}

fn split_pairs(payload: &[u8]) -> AclResult<Vec<(String, String)>> {
    tags::split_on(payload, tags::SEP)
        .into_iter()
        .map(|entry| match tags::split_on(entry, tags::SET).as_slice() {
            [key, value] => Ok((utf8(key)?, utf8(value)?)),
            _ => Err(AclError::Format("mapping entry without a single SET".to_string())),
        })
        .collect()
}
