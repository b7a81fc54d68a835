//! Structural tags of the compiled artifact format.
//!
//! Every tag is two bytes whose first byte is `0x00` or `0x01`. Payload text
//! must never contain those lead bytes, which keeps printable text, newlines
//! and multi-byte UTF-8 usable in payloads.

/// A two-byte structural delimiter.
pub type Tag = [u8; 2];

/// Magic string at the start of every artifact.
pub const MAGIC: &[u8] = b"ACLANG";

/// Separates the compiler version from the runtime range in the header.
pub const VERSION_RUNTIME_SEP: Tag = [0x00, 0x00];
/// Ends the runtime header.
pub const END_RUNTIME: Tag = [0x00, 0x01];

/// Starting-room record marker.
pub const STARTING_ROOM: Tag = [0x01, 0x00];
/// Opens the lookup region holding one record per game object.
pub const BEGIN_LOOKUP: Tag = [0x01, 0x01];
/// Closes the lookup region.
pub const END_LOOKUP: Tag = [0x01, 0x02];
/// Ends a record.
pub const END_RECORD: Tag = [0x01, 0x03];
/// Adventure name record marker.
pub const ADVENTURE_NAME: Tag = [0x01, 0x04];
/// Adventure start-text record marker.
pub const ADVENTURE_START_TEXT: Tag = [0x01, 0x05];
/// Room title field.
pub const ROOM_NAME: Tag = [0x01, 0x06];
/// Ends a field.
pub const END_FIELD: Tag = [0x01, 0x07];
/// Room description-block reference field.
pub const DESCRIPTION: Tag = [0x01, 0x08];
/// Precedes the type marker of a record.
pub const TYPE: Tag = [0x01, 0x09];
/// Room type marker.
pub const ROOM_TYPE: Tag = [0x01, 0x0A];
/// Descriptions type marker.
pub const DESCRIPTIONS_TYPE: Tag = [0x01, 0x0B];
/// First-visit text field.
pub const DESCS_FIRST_ENTRY: Tag = [0x01, 0x0C];
/// Default text field.
pub const DESCS_DEFAULT: Tag = [0x01, 0x0D];
/// Item-ID to picked-up text pairs.
pub const DESCS_PICKED_UP: Tag = [0x01, 0x0E];
/// Custom-key to text pairs.
pub const DESCS_CUSTOM: Tag = [0x01, 0x0F];
/// Separates a key from its value inside a list element.
pub const SET: Tag = [0x01, 0x10];
/// Separates list elements.
pub const SEP: Tag = [0x01, 0x11];
/// Direction to room-ID pairs.
pub const ROOM_EXITS: Tag = [0x01, 0x12];
/// Direction to description-block-ID pairs.
pub const ROOM_EXIT_DESCS: Tag = [0x01, 0x13];
/// Index to item-ID pairs.
pub const ROOM_ITEMS: Tag = [0x01, 0x14];
/// Property section of a record.
pub const PROPS: Tag = [0x01, 0x15];
/// Item type marker.
pub const ITEM_TYPE: Tag = [0x01, 0x16];
/// Item name field.
pub const ITEM_NAME: Tag = [0x01, 0x17];
/// Verb type marker.
pub const VERB_TYPE: Tag = [0x01, 0x18];
/// Verb name field.
pub const VERB_NAME: Tag = [0x01, 0x19];
/// Ordered argument IDs of a verb.
pub const VERB_ARGS: Tag = [0x01, 0x1A];
/// Ordered body statement IDs of a verb.
pub const VERB_CODE: Tag = [0x01, 0x1B];
/// Argument type marker.
pub const ARGUMENT_TYPE: Tag = [0x01, 0x1C];
/// Argument kind field (holds a two-byte argument-type tag).
pub const ARGUMENT_TYPEOF: Tag = [0x01, 0x1D];
/// Argument name field.
pub const ARGUMENT_NAME: Tag = [0x01, 0x1E];
/// Code type marker.
pub const CODE_TYPE: Tag = [0x01, 0x1F];
/// Code keyword field (holds a two-byte keyword tag).
pub const CODE_KEYWORD: Tag = [0x01, 0x80];
/// Ordered raw arguments of a code statement.
pub const CODE_ARGUMENTS: Tag = [0x01, 0x81];
/// Ordered child statement IDs of a code statement.
pub const CODE_CHILDREN: Tag = [0x01, 0x82];
/// Record ID field.
pub const ID: Tag = [0x01, 0x83];

/// Lead byte of keyword tags.
pub const KEYWORD_PREFIX: u8 = 0xC0;
/// Lead byte of argument-type tags.
pub const ARGUMENT_TYPE_PREFIX: u8 = 0xA0;

/// Record type markers, in wire order.
pub const TYPE_MARKERS: [Tag; 6] = [
    ROOM_TYPE,
    DESCRIPTIONS_TYPE,
    ITEM_TYPE,
    VERB_TYPE,
    ARGUMENT_TYPE,
    CODE_TYPE,
];

/// Whether `byte` may start a structural tag.
pub fn is_tag_lead(byte: u8) -> bool {
    byte == 0x00 || byte == 0x01
}

/// Split `bytes` on every occurrence of `tag`. Empty input yields no parts.
pub fn split_on(bytes: &[u8], tag: Tag) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i..i + 2] == tag {
            parts.push(&bytes[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&bytes[start..]);
    parts
}
