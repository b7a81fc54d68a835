use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sha2::{Digest, Sha512};

use crate::entity::{EntityKind, GameObject, Handle, ObjectId, PropertyValue, property_references};
use crate::error::{AclError, AclResult};
use crate::id::IdAllocator;
use crate::version::SupportedVersion;

/// A complete game: metadata plus the arena of every game object in it.
///
/// The arena is the reachable set. It never contains the adventure itself.
/// Registration is append-only; objects are not removed.
#[derive(Debug, Clone)]
pub struct Adventure {
    /// Title of the adventure.
    pub name: String,
    /// Text shown when the game starts.
    pub starting_text: String,
    /// Compiler versions this adventure may be compiled with.
    pub supported_versions: SupportedVersion,
    /// Free-form properties of the adventure itself. They are validated and
    /// hashed but have no field in the artifact header.
    pub properties: BTreeMap<String, PropertyValue>,
    id: Option<ObjectId>,
    starting_room: Option<Handle>,
    objects: Vec<GameObject>,

    // Indexes
    rooms: Vec<Handle>,
    items: Vec<Handle>,
    verbs: Vec<Handle>,
    rooms_by_id: HashMap<ObjectId, Handle>,
}

impl Adventure {
    /// An empty adventure.
    pub fn new(name: impl Into<String>, supported_versions: SupportedVersion) -> Self {
        Self {
            name: name.into(),
            starting_text: String::new(),
            supported_versions,
            properties: BTreeMap::new(),
            id: None,
            starting_room: None,
            objects: Vec::new(),
            rooms: Vec::new(),
            items: Vec::new(),
            verbs: Vec::new(),
            rooms_by_id: HashMap::new(),
        }
    }

    /// Builder form of setting [`starting_text`](Self::starting_text).
    pub fn with_starting_text(mut self, text: impl Into<String>) -> Self {
        self.starting_text = text.into();
        self
    }

    // -----------------------------------------------------------------------
    // Registration and lookup
    // -----------------------------------------------------------------------

    /// Add a game object to the reachable set. Returns its handle.
    pub fn register(&mut self, obj: GameObject) -> Handle {
        let handle = Handle(self.objects.len());
        match &obj.kind {
            EntityKind::Room(_) => self.rooms.push(handle),
            EntityKind::Item(_) => self.items.push(handle),
            EntityKind::Verb(_) => self.verbs.push(handle),
            _ => {}
        }
        if let (EntityKind::Room(_), Some(id)) = (&obj.kind, obj.id()) {
            self.rooms_by_id.entry(id).or_insert(handle);
        }
        tracing::debug!(%handle, kind = obj.kind.name(), "registered game object");
        self.objects.push(obj);
        handle
    }

    /// Get a game object by handle.
    pub fn get(&self, handle: Handle) -> Option<&GameObject> {
        self.objects.get(handle.0)
    }

    /// Get a mutable game object by handle.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut GameObject> {
        self.objects.get_mut(handle.0)
    }

    /// All game objects with their handles, in registration order.
    pub fn objects(&self) -> impl Iterator<Item = (Handle, &GameObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (Handle(i), o))
    }

    /// Number of game objects in the reachable set.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Handles of all registered rooms.
    pub fn rooms(&self) -> &[Handle] {
        &self.rooms
    }

    /// Handles of all registered items.
    pub fn items(&self) -> &[Handle] {
        &self.items
    }

    /// Handles of all registered verbs.
    pub fn verbs(&self) -> &[Handle] {
        &self.verbs
    }

    /// Find a room by its assigned ID.
    pub fn room_by_id(&self, id: ObjectId) -> Option<Handle> {
        self.rooms_by_id.get(&id).copied()
    }

    /// The ID assigned to the object behind `handle`.
    pub fn id_of(&self, handle: Handle) -> Option<ObjectId> {
        self.get(handle).and_then(GameObject::id)
    }

    // -----------------------------------------------------------------------
    // Adventure identity
    // -----------------------------------------------------------------------

    /// The adventure's own ID, if assigned.
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// Whether the adventure itself has an ID.
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Declare where the player starts. The handle must point at a room.
    pub fn set_starting_room(&mut self, room: Handle) -> AclResult<()> {
        match self.get(room).map(|o| &o.kind) {
            Some(EntityKind::Room(_)) => {
                self.starting_room = Some(room);
                Ok(())
            }
            Some(other) => Err(AclError::Referential {
                from: None,
                reason: format!("starting room {room} is a {}, not a room", other.name()),
            }),
            None => Err(AclError::Referential {
                from: None,
                reason: format!("starting room {room} is not registered"),
            }),
        }
    }

    /// Handle of the starting room, if declared.
    pub fn starting_room(&self) -> Option<Handle> {
        self.starting_room
    }

    // -----------------------------------------------------------------------
    // Compilation support
    // -----------------------------------------------------------------------

    /// Give an ID to the adventure and then to every object that lacks one,
    /// in registration order. Objects that already have an ID keep it.
    ///
    /// The IDs are reserved as one block, so on exhaustion nothing is
    /// assigned. Returns the number of IDs handed out.
    pub fn assign_ids(&mut self, ids: &IdAllocator) -> AclResult<usize> {
        let needed = usize::from(self.id.is_none())
            + self.objects.iter().filter(|o| !o.has_id()).count();
        let mut block = ids.allocate_block(needed)?;

        if self.id.is_none() {
            self.id = block.next();
        }
        for (index, obj) in self.objects.iter_mut().enumerate() {
            if !obj.has_id() {
                if let Some(id) = block.next() {
                    obj.set_id(id);
                }
            }
            if let (EntityKind::Room(_), Some(id)) = (&obj.kind, obj.id()) {
                self.rooms_by_id.entry(id).or_insert(Handle(index));
            }
        }

        tracing::info!(assigned = needed, total = self.objects.len() + 1, "assigned IDs to game objects");
        Ok(needed)
    }

    /// Check that every reference stays inside the reachable set and points
    /// at an object of the expected kind, and that no two objects carry the
    /// same ID.
    pub fn validate(&self) -> AclResult<()> {
        let start = self.starting_room.ok_or_else(|| AclError::Referential {
            from: None,
            reason: "no starting room declared".to_string(),
        })?;
        self.expect_kind(None, start, Expected::Room, "starting room")?;
        for target in property_references(&self.properties) {
            self.expect_registered(None, target)?;
        }

        let mut seen: HashMap<ObjectId, Option<Handle>> = HashMap::new();
        if let Some(id) = self.id {
            seen.insert(id, None);
        }

        for (handle, obj) in self.objects() {
            let from = Some(handle);
            let duplicate = obj
                .id()
                .and_then(|id| seen.insert(id, from).map(|first| (id, first)));
            if let Some((id, first)) = duplicate {
                let owner = first.map_or_else(|| "the adventure".to_string(), |h| h.to_string());
                return Err(AclError::Referential {
                    from,
                    reason: format!("ID {id} is already used by {owner}"),
                });
            }

            match &obj.kind {
                EntityKind::Room(room) => {
                    for item in room.descriptions.when_picked_up.keys() {
                        self.expect_kind(from, *item, Expected::Item, "picked-up text")?;
                    }
                    for target in room.exits.values() {
                        self.expect_kind(from, *target, Expected::Room, "exit")?;
                    }
                    for descs in room.exit_descriptions.values() {
                        self.expect_kind(from, *descs, Expected::Descriptions, "exit description")?;
                    }
                    for item in &room.items {
                        self.expect_kind(from, *item, Expected::Item, "room item")?;
                    }
                }
                EntityKind::Descriptions(descs) => {
                    for item in descs.when_picked_up.keys() {
                        self.expect_kind(from, *item, Expected::Item, "picked-up text")?;
                    }
                }
                EntityKind::Code(code) => {
                    for child in &code.children {
                        self.expect_kind(from, *child, Expected::Code, "code child")?;
                    }
                }
                EntityKind::Verb(verb) => {
                    for arg in &verb.arguments {
                        self.expect_kind(from, *arg, Expected::Argument, "verb argument")?;
                    }
                    for stmt in &verb.body {
                        self.expect_kind(from, *stmt, Expected::Code, "verb body")?;
                    }
                }
                EntityKind::Item(_) | EntityKind::Argument(_) | EntityKind::Custom { .. } => {}
            }

            for target in obj.references() {
                self.expect_registered(from, target)?;
            }
        }
        Ok(())
    }

    /// Content fingerprint of the adventure's own fields.
    ///
    /// Covers the name, starting text, supported versions and properties, the
    /// same way [`GameObject::content_hash`] covers an object. Registered
    /// objects and the assigned ID are not part of it.
    pub fn content_hash(&self) -> AclResult<String> {
        #[derive(Serialize)]
        struct HashView<'a> {
            name: &'a str,
            starting_text: &'a str,
            supported_versions: &'a SupportedVersion,
            properties: &'a BTreeMap<String, PropertyValue>,
        }

        let view = HashView {
            name: &self.name,
            starting_text: &self.starting_text,
            supported_versions: &self.supported_versions,
            properties: &self.properties,
        };
        let canonical = serde_json::to_vec(&view)
            .map_err(|e| AclError::Format(format!("cannot render adventure for hashing: {e}")))?;
        Ok(hex::encode(Sha512::digest(&canonical)))
    }

    fn expect_registered(&self, from: Option<Handle>, target: Handle) -> AclResult<()> {
        match self.get(target) {
            Some(_) => Ok(()),
            None => Err(AclError::Referential {
                from,
                reason: format!("{target} is not part of the adventure"),
            }),
        }
    }

    fn expect_kind(
        &self,
        from: Option<Handle>,
        target: Handle,
        expected: Expected,
        role: &str,
    ) -> AclResult<()> {
        match self.get(target) {
            Some(obj) if expected.accepts(&obj.kind) => Ok(()),
            Some(obj) => Err(AclError::Referential {
                from,
                reason: format!(
                    "{role} {target} is a {}, expected {}",
                    describe(&obj.kind),
                    expected.name()
                ),
            }),
            None => Err(AclError::Referential {
                from,
                reason: format!("{role} {target} is not part of the adventure"),
            }),
        }
    }
}

/// Built-in shape a reference must point at. Custom objects never qualify,
/// whatever their kind name.
#[derive(Debug, Clone, Copy)]
enum Expected {
    Room,
    Item,
    Descriptions,
    Argument,
    Code,
}

impl Expected {
    fn accepts(self, kind: &EntityKind) -> bool {
        matches!(
            (self, kind),
            (Self::Room, EntityKind::Room(_))
                | (Self::Item, EntityKind::Item(_))
                | (Self::Descriptions, EntityKind::Descriptions(_))
                | (Self::Argument, EntityKind::Argument(_))
                | (Self::Code, EntityKind::Code(_))
        )
    }

    fn name(self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Item => "item",
            Self::Descriptions => "descriptions",
            Self::Argument => "argument",
            Self::Code => "code",
        }
    }
}

fn describe(kind: &EntityKind) -> String {
    match kind {
        EntityKind::Custom { kind } => format!("custom \"{kind}\" object"),
        other => other.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::entity::{Direction, Keyword};
    use crate::version::Version;

    fn adventure() -> Adventure {
        Adventure::new("test", SupportedVersion::or_higher(Version::new(0, 1, 0)))
    }

    #[test]
    fn register_fills_typed_indexes() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("Hall"));
        let item = adv.register(GameObject::item("Lamp"));
        let verb = adv.register(GameObject::verb("look"));
        adv.register(GameObject::descriptions("Dusty."));

        assert_eq!(adv.rooms(), &[room]);
        assert_eq!(adv.items(), &[item]);
        assert_eq!(adv.verbs(), &[verb]);
        assert_eq!(adv.object_count(), 4);
    }

    #[test]
    fn assign_ids_gives_adventure_the_first_id() {
        let mut adv = adventure();
        let a = adv.register(GameObject::room("A"));
        let b = adv.register(GameObject::room("B"));
        let ids = IdAllocator::new();

        assert_eq!(adv.assign_ids(&ids).unwrap(), 3);
        assert_eq!(adv.id(), Some(ObjectId(1)));
        assert_eq!(adv.id_of(a), Some(ObjectId(2)));
        assert_eq!(adv.id_of(b), Some(ObjectId(3)));
    }

    #[test]
    fn assign_ids_is_idempotent() {
        let mut adv = adventure();
        adv.register(GameObject::item("Lamp"));
        let ids = IdAllocator::new();
        adv.assign_ids(&ids).unwrap();
        assert_eq!(adv.assign_ids(&ids).unwrap(), 0);
        assert_eq!(ids.peek(), Some(ObjectId(3)));
    }

    #[test]
    fn assign_ids_are_unique_across_adventures() {
        let ids = IdAllocator::new();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            let mut adv = adventure();
            let handles: Vec<_> = (0..5).map(|i| adv.register(GameObject::item(format!("i{i}")))).collect();
            adv.assign_ids(&ids).unwrap();
            assert!(seen.insert(adv.id().unwrap()));
            for h in handles {
                assert!(seen.insert(adv.id_of(h).unwrap()));
            }
        }
    }

    #[test]
    fn rooms_are_indexed_by_id_after_assignment() {
        let mut adv = adventure();
        adv.register(GameObject::item("Lamp"));
        let room = adv.register(GameObject::room("Hall"));
        adv.assign_ids(&IdAllocator::new()).unwrap();

        let id = adv.id_of(room).unwrap();
        assert_eq!(adv.room_by_id(id), Some(room));
    }

    #[test]
    fn exhaustion_assigns_nothing() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("Hall"));
        let item = adv.register(GameObject::item("Lamp"));
        let ids = IdAllocator::starting_at(u32::MAX - 2);

        assert!(matches!(
            adv.assign_ids(&ids),
            Err(AclError::ResourceExhausted { .. })
        ));
        assert!(!adv.has_id());
        assert_eq!(adv.id_of(room), None);
        assert_eq!(adv.id_of(item), None);
        assert_eq!(adv.room_by_id(ObjectId(u32::MAX - 1)), None);
        assert_eq!(ids.peek(), Some(ObjectId(u32::MAX - 2)));
    }

    #[test]
    fn assign_ids_fills_the_last_free_ids() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("Hall"));
        let ids = IdAllocator::starting_at(u32::MAX - 2);
        assert_eq!(adv.assign_ids(&ids).unwrap(), 2);
        assert_eq!(adv.id_of(room), Some(ObjectId(u32::MAX - 1)));
    }

    #[test]
    fn starting_room_must_be_a_room() {
        let mut adv = adventure();
        let item = adv.register(GameObject::item("Lamp"));
        assert!(adv.set_starting_room(item).is_err());
        assert!(adv.set_starting_room(Handle(42)).is_err());
        let room = adv.register(GameObject::room("Hall"));
        adv.set_starting_room(room).unwrap();
        assert_eq!(adv.starting_room(), Some(room));
    }

    #[test]
    fn validate_requires_starting_room() {
        let mut adv = adventure();
        adv.register(GameObject::room("Hall"));
        let err = adv.validate().unwrap_err();
        assert!(err.to_string().contains("no starting room"));
    }

    #[test]
    fn validate_accepts_cyclic_exits() {
        let mut adv = adventure();
        let a = adv.register(GameObject::room("A"));
        let b = adv.register(GameObject::room("B"));
        adv.get_mut(a).unwrap().as_room_mut().unwrap().exits.insert(Direction::North, b);
        adv.get_mut(b).unwrap().as_room_mut().unwrap().exits.insert(Direction::South, a);
        adv.set_starting_room(a).unwrap();
        adv.validate().unwrap();
    }

    #[test]
    fn validate_rejects_dangling_and_mistyped_references() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("A"));
        adv.set_starting_room(room).unwrap();
        adv.get_mut(room).unwrap().as_room_mut().unwrap().items.push(Handle(9));
        let err = adv.validate().unwrap_err();
        assert!(matches!(err, AclError::Referential { from: Some(h), .. } if h == room));

        let mut adv = adventure();
        let say = adv.register(GameObject::code(Keyword::Say, ["hi"]));
        let verb = adv.register(GameObject::verb("shout"));
        let room = adv.register(GameObject::room("A"));
        adv.set_starting_room(room).unwrap();
        adv.get_mut(verb).unwrap().as_verb_mut().unwrap().arguments.push(say);
        let err = adv.validate().unwrap_err();
        assert!(err.to_string().contains("expected argument"));
    }

    #[test]
    fn validate_rejects_a_copied_object_with_the_same_id() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("Hall"));
        adv.set_starting_room(room).unwrap();
        adv.assign_ids(&IdAllocator::new()).unwrap();
        adv.validate().unwrap();

        let copy = adv.get(room).unwrap().clone();
        let dup = adv.register(copy);
        let err = adv.validate().unwrap_err();
        assert!(matches!(err, AclError::Referential { from: Some(h), .. } if h == dup));
        assert!(err.to_string().contains("ID 2 is already used by"));
    }

    #[test]
    fn validate_rejects_an_object_sharing_the_adventure_id() {
        let mut adv = adventure();
        let lamp = adv.register(GameObject::item("Lamp"));
        adv.assign_ids(&IdAllocator::new()).unwrap();
        let room = adv.register(GameObject::room("Hall"));
        adv.set_starting_room(room).unwrap();
        adv.get_mut(room).unwrap().set_id(ObjectId(1));

        let err = adv.validate().unwrap_err();
        assert!(err.to_string().contains("already used by the adventure"));
        assert_eq!(adv.id_of(lamp), Some(ObjectId(2)));
    }

    #[test]
    fn custom_objects_do_not_stand_in_for_built_in_kinds() {
        let mut adv = adventure();
        let hall = adv.register(GameObject::room("Hall"));
        let fake = adv.register(GameObject::custom("room", Some("portal".to_string())));
        adv.set_starting_room(hall).unwrap();
        adv.get_mut(hall).unwrap().as_room_mut().unwrap().exits.insert(Direction::North, fake);

        let err = adv.validate().unwrap_err();
        assert!(err.to_string().contains("custom \"room\" object, expected room"), "{err}");

        let mut adv = adventure();
        let fake = adv.register(GameObject::custom("room", None));
        assert!(adv.set_starting_room(fake).is_err());
    }

    #[test]
    fn validate_checks_adventure_properties() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("Hall"));
        adv.set_starting_room(room).unwrap();
        adv.properties.insert("home".into(), PropertyValue::Object(room));
        adv.validate().unwrap();

        adv.properties.insert("lost".into(), PropertyValue::List(vec![Handle(7).into()]));
        let err = adv.validate().unwrap_err();
        assert!(matches!(err, AclError::Referential { from: None, .. }));
    }

    #[test]
    fn adventure_hash_tracks_its_own_fields_only() {
        let mut adv = adventure().with_starting_text("Welcome.");
        let before = adv.content_hash().unwrap();
        assert_eq!(before.len(), 128);

        adv.register(GameObject::room("Hall"));
        adv.assign_ids(&IdAllocator::new()).unwrap();
        assert_eq!(adv.content_hash().unwrap(), before);

        adv.properties.insert("difficulty".into(), PropertyValue::from(3i64));
        assert_ne!(adv.content_hash().unwrap(), before);
    }

    #[test]
    fn validate_checks_object_properties() {
        let mut adv = adventure();
        let room = adv.register(GameObject::room("A"));
        adv.set_starting_room(room).unwrap();
        adv.register(GameObject::item("Key").with_property("opens", Handle(99)));
        assert!(adv.validate().is_err());
    }
}
