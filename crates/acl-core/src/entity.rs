use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::error::{AclError, AclResult};

/// Identifier assigned to a game object right before serialization.
///
/// `0` and `u32::MAX` are never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a game object inside its adventure's arena.
///
/// All references between game objects are handles; they are turned into
/// [`ObjectId`]s only when the adventure is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub usize);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Compass direction of a room exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// North.
    North,
    /// South.
    South,
    /// East.
    East,
    /// West.
    West,
    /// Up.
    Up,
    /// Down.
    Down,
}

impl Direction {
    /// All directions in wire order.
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Numeric code written into compiled artifacts.
    pub fn code(self) -> u8 {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
            Self::Up => 4,
            Self::Down => 5,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Direction {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string() == s.to_lowercase())
            .ok_or_else(|| AclError::Format(format!("unknown direction \"{s}\"")))
    }
}

/// Statement keyword of a [`Code`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    /// Conditional; children form the body.
    If,
    /// Print text to the player.
    Say,
    /// End the game as a failure.
    EndFail,
    /// End the game as a success.
    EndSuccess,
    /// Remove an item from the world.
    DeleteItem,
    /// Put an item into the world.
    CreateItem,
    /// Move the player to another room.
    Teleport,
}

impl Keyword {
    /// All keywords in wire order.
    pub const ALL: [Keyword; 7] = [
        Keyword::If,
        Keyword::Say,
        Keyword::EndFail,
        Keyword::EndSuccess,
        Keyword::DeleteItem,
        Keyword::CreateItem,
        Keyword::Teleport,
    ];

    /// Low byte of the keyword's wire tag.
    pub fn code(self) -> u8 {
        match self {
            Self::If => 0x00,
            Self::Say => 0x01,
            Self::EndFail => 0x02,
            Self::EndSuccess => 0x03,
            Self::DeleteItem => 0x04,
            Self::CreateItem => 0x05,
            Self::Teleport => 0x06,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Source spelling of the keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Say => "say",
            Self::EndFail => "endfail",
            Self::EndSuccess => "endsuccess",
            Self::DeleteItem => "deleteitem",
            Self::CreateItem => "createitem",
            Self::Teleport => "teleport",
        }
    }
}

impl FromStr for Keyword {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AclError::Format(format!("unknown keyword \"{s}\"")))
    }
}

/// What kind of value a verb argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    /// An item in scope.
    Item,
    /// Free text.
    String,
    /// A filler word that carries no value.
    Placeholder,
    /// A room.
    Room,
    /// A direction.
    Direction,
}

impl ArgumentType {
    /// All argument types in wire order.
    pub const ALL: [ArgumentType; 5] = [
        ArgumentType::Item,
        ArgumentType::String,
        ArgumentType::Placeholder,
        ArgumentType::Room,
        ArgumentType::Direction,
    ];

    /// Low byte of the argument type's wire tag.
    pub fn code(self) -> u8 {
        match self {
            Self::Item => 0x00,
            Self::String => 0x01,
            Self::Placeholder => 0x02,
            Self::Room => 0x03,
            Self::Direction => 0x04,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

/// A value in a game object's property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Text.
    String(String),
    /// A signed integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// An ordered list of values.
    List(Vec<PropertyValue>),
    /// Another game object, written as its ID.
    Object(Handle),
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Handle> for PropertyValue {
    fn from(h: Handle) -> Self {
        Self::Object(h)
    }
}

/// Texts shown for a room or an exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptions {
    /// Shown the first time the player enters.
    pub first_entry: String,
    /// Shown on every later visit.
    pub default: String,
    /// Shown once the given item has been picked up.
    pub when_picked_up: BTreeMap<Handle, String>,
    /// Author-defined texts by key.
    pub custom: BTreeMap<String, String>,
}

/// A location the player can be in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Title shown on entry.
    pub title: String,
    /// The room's own description block, identified by the room's ID.
    pub descriptions: Descriptions,
    /// Adjoining rooms.
    pub exits: BTreeMap<Direction, Handle>,
    /// Description blocks for individual exits.
    pub exit_descriptions: BTreeMap<Direction, Handle>,
    /// Items lying in the room, in order.
    pub items: Vec<Handle>,
}

/// Something the player can pick up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display name.
    pub name: String,
}

/// A typed parameter of a verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// What the argument accepts.
    pub kind: ArgumentType,
    /// Name used inside the verb's body.
    pub name: String,
}

/// A statement in a verb body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    /// The statement keyword.
    pub keyword: Keyword,
    /// Raw arguments, in order.
    pub arguments: Vec<String>,
    /// Nested statements, e.g. the body of an `if`.
    pub children: Vec<Handle>,
}

/// A player command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verb {
    /// The word the player types.
    pub name: String,
    /// Parameters, in order.
    pub arguments: Vec<Handle>,
    /// Statements run when the verb is used.
    pub body: Vec<Handle>,
}

/// The shape of a game object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// See [`Room`].
    Room(Room),
    /// See [`Item`].
    Item(Item),
    /// See [`Descriptions`].
    Descriptions(Descriptions),
    /// See [`Argument`].
    Argument(Argument),
    /// See [`Code`].
    Code(Code),
    /// See [`Verb`].
    Verb(Verb),
    /// A user-defined shape. Only encodable with an explicit rendering.
    Custom {
        /// Name of the user-defined kind.
        kind: String,
    },
}

impl EntityKind {
    /// Short name of the kind, used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Room(_) => "room",
            Self::Item(_) => "item",
            Self::Descriptions(_) => "descriptions",
            Self::Argument(_) => "argument",
            Self::Code(_) => "code",
            Self::Verb(_) => "verb",
            Self::Custom { kind } => kind,
        }
    }

    /// Every handle this shape refers to, in field order.
    pub fn references(&self) -> Vec<Handle> {
        match self {
            Self::Room(room) => room
                .descriptions
                .when_picked_up
                .keys()
                .chain(room.exits.values())
                .chain(room.exit_descriptions.values())
                .chain(room.items.iter())
                .copied()
                .collect(),
            Self::Descriptions(descs) => descs.when_picked_up.keys().copied().collect(),
            Self::Code(code) => code.children.clone(),
            Self::Verb(verb) => verb.arguments.iter().chain(verb.body.iter()).copied().collect(),
            Self::Item(_) | Self::Argument(_) | Self::Custom { .. } => Vec::new(),
        }
    }
}

/// A compiled domain object: room, item, verb, and so on.
///
/// Created through the factory functions with no ID; the ID is assigned when
/// the owning adventure is compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    id: Option<ObjectId>,
    /// Free-form properties written after the typed fields.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Pre-rendered record body. When set, it replaces field-by-field encoding.
    pub rendering: Option<String>,
    /// The object's shape.
    pub kind: EntityKind,
}

impl GameObject {
    fn with_kind(kind: EntityKind) -> Self {
        Self {
            id: None,
            properties: BTreeMap::new(),
            rendering: None,
            kind,
        }
    }

    /// A room with the given title.
    pub fn room(title: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Room(Room {
            title: title.into(),
            ..Default::default()
        }))
    }

    /// A room with the given title and default description.
    pub fn room_described(title: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Room(Room {
            title: title.into(),
            descriptions: Descriptions {
                default: default.into(),
                ..Default::default()
            },
            ..Default::default()
        }))
    }

    /// An item with the given name.
    pub fn item(name: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Item(Item { name: name.into() }))
    }

    /// A description block with the given default text.
    pub fn descriptions(default: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Descriptions(Descriptions {
            default: default.into(),
            ..Default::default()
        }))
    }

    /// A verb argument.
    pub fn argument(kind: ArgumentType, name: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Argument(Argument {
            kind,
            name: name.into(),
        }))
    }

    /// A code statement with raw arguments and no children.
    pub fn code<I, S>(keyword: Keyword, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(EntityKind::Code(Code {
            keyword,
            arguments: arguments.into_iter().map(Into::into).collect(),
            children: Vec::new(),
        }))
    }

    /// A verb with no arguments or body.
    pub fn verb(name: impl Into<String>) -> Self {
        Self::with_kind(EntityKind::Verb(Verb {
            name: name.into(),
            ..Default::default()
        }))
    }

    /// A user-defined object that renders itself.
    pub fn custom(kind: impl Into<String>, rendering: Option<String>) -> Self {
        let mut obj = Self::with_kind(EntityKind::Custom { kind: kind.into() });
        obj.rendering = rendering;
        obj
    }

    /// The assigned ID, if any.
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// Whether an ID has been assigned.
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    /// Set a property, replacing any previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Builder form of [`set_property`](Self::set_property).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Builder form of setting [`rendering`](Self::rendering).
    pub fn with_rendering(mut self, rendering: impl Into<String>) -> Self {
        self.rendering = Some(rendering.into());
        self
    }

    /// Borrow as a room, if it is one.
    pub fn as_room(&self) -> Option<&Room> {
        match &self.kind {
            EntityKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Mutably borrow as a room, if it is one.
    pub fn as_room_mut(&mut self) -> Option<&mut Room> {
        match &mut self.kind {
            EntityKind::Room(room) => Some(room),
            _ => None,
        }
    }

    /// Mutably borrow as a description block, if it is one.
    pub fn as_descriptions_mut(&mut self) -> Option<&mut Descriptions> {
        match &mut self.kind {
            EntityKind::Descriptions(descs) => Some(descs),
            _ => None,
        }
    }

    /// Mutably borrow as a code statement, if it is one.
    pub fn as_code_mut(&mut self) -> Option<&mut Code> {
        match &mut self.kind {
            EntityKind::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Mutably borrow as a verb, if it is one.
    pub fn as_verb_mut(&mut self) -> Option<&mut Verb> {
        match &mut self.kind {
            EntityKind::Verb(verb) => Some(verb),
            _ => None,
        }
    }

    /// Every handle this object refers to, including object-valued properties.
    pub fn references(&self) -> Vec<Handle> {
        let mut refs = self.kind.references();
        refs.extend(property_references(&self.properties));
        refs
    }

    /// Content fingerprint for change detection and deduplication.
    ///
    /// The shape, properties and rendering are written as canonical JSON and
    /// hashed with SHA-512. The assigned ID is not part of the content.
    pub fn content_hash(&self) -> AclResult<String> {
        #[derive(Serialize)]
        struct HashView<'a> {
            kind: &'a EntityKind,
            properties: &'a BTreeMap<String, PropertyValue>,
            rendering: &'a Option<String>,
        }

        let view = HashView {
            kind: &self.kind,
            properties: &self.properties,
            rendering: &self.rendering,
        };
        let canonical = serde_json::to_vec(&view)
            .map_err(|e| AclError::Format(format!("cannot render object for hashing: {e}")))?;
        Ok(hex::encode(Sha512::digest(&canonical)))
    }
}

/// Handles named by object-valued properties, nested lists included.
pub(crate) fn property_references(properties: &BTreeMap<String, PropertyValue>) -> Vec<Handle> {
    let mut refs = Vec::new();
    for value in properties.values() {
        collect_property_refs(value, &mut refs);
    }
    refs
}

fn collect_property_refs(value: &PropertyValue, out: &mut Vec<Handle>) {
    match value {
        PropertyValue::Object(h) => out.push(*h),
        PropertyValue::List(items) => {
            for item in items {
                collect_property_refs(item, out);
            }
        }
        _ => {}
    }
}
