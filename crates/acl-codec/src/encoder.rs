use acl_core::{
    Adventure, AclError, AclResult, Descriptions, EntityKind, GameObject, Handle, IdAllocator,
    ObjectId, PropertyValue,
};

use crate::config::CompilerConfig;
use crate::tags::{self, Tag};

/// Compile an adventure with the default configuration and the process-wide
/// ID allocator.
pub fn compile(adventure: &mut Adventure) -> AclResult<Vec<u8>> {
    Compiler::default().compile(adventure, IdAllocator::global())
}

/// Encode the record of a single game object.
///
/// Every object the record refers to must already have an ID.
pub fn encode_entity(adventure: &Adventure, handle: Handle) -> AclResult<Vec<u8>> {
    let obj = adventure.get(handle).ok_or_else(|| AclError::Referential {
        from: None,
        reason: format!("{handle} is not part of the adventure"),
    })?;
    let mut encoder = Encoder::new(adventure);
    encoder.record(handle, obj)?;
    Ok(encoder.out)
}

/// Turns an [`Adventure`] into the binary artifact format.
///
/// Compilation happens in two phases:
/// 1. **Checks and ID assignment**: version range, references and payloads
///    are verified, then the adventure and every object without an ID get one
/// 2. **Serialization**: header, adventure fields, and one record per object
///    in registration order
///
/// Nothing is mutated when a check fails, and no output is produced on error.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// A compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The compiler's configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `adventure`, drawing new IDs from `ids`.
    ///
    /// The adventure must not be modified elsewhere while this runs.
    pub fn compile(&self, adventure: &mut Adventure, ids: &IdAllocator) -> AclResult<Vec<u8>> {
        tracing::info!(version = %self.config.version, "ACLang");

        if !adventure.supported_versions.matches(&self.config.version) {
            return Err(AclError::VersionMismatch {
                compiler: self.config.version.to_string(),
                supported: adventure.supported_versions.to_string(),
            });
        }
        adventure.validate()?;
        preflight(adventure)?;

        // Phase 1: every forward reference resolves once all IDs exist.
        adventure.assign_ids(ids)?;

        // Phase 2
        let adventure: &Adventure = adventure;
        let mut encoder = Encoder::new(adventure);
        encoder.header(&self.config)?;
        encoder.tag(tags::BEGIN_LOOKUP);
        for (handle, obj) in adventure.objects() {
            encoder.record(handle, obj)?;
        }
        encoder.tag(tags::END_LOOKUP);

        tracing::info!(
            name = %adventure.name,
            records = adventure.object_count(),
            bytes = encoder.out.len(),
            "compiled adventure"
        );
        Ok(encoder.out)
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Reject payload text that contains a tag lead byte.
pub fn check_payload(text: &str) -> AclResult<()> {
    match text.bytes().find(|b| tags::is_tag_lead(*b)) {
        Some(byte) => Err(AclError::ReservedPayload {
            text: text.to_string(),
            byte,
        }),
        None => Ok(()),
    }
}

fn check_descriptions(descs: &Descriptions) -> AclResult<()> {
    check_payload(&descs.first_entry)?;
    check_payload(&descs.default)?;
    for text in descs.when_picked_up.values() {
        check_payload(text)?;
    }
    for (key, text) in &descs.custom {
        check_payload(key)?;
        check_payload(text)?;
    }
    Ok(())
}

fn check_property(value: &PropertyValue) -> AclResult<()> {
    match value {
        PropertyValue::String(s) => check_payload(s),
        PropertyValue::List(items) => items.iter().try_for_each(check_property),
        _ => Ok(()),
    }
}

/// Verify every payload and object shape before anything is mutated.
fn preflight(adventure: &Adventure) -> AclResult<()> {
    check_payload(&adventure.name)?;
    check_payload(&adventure.starting_text)?;
    for (key, value) in &adventure.properties {
        check_payload(key)?;
        check_property(value)?;
    }

    for (handle, obj) in adventure.objects() {
        for (key, value) in &obj.properties {
            check_payload(key)?;
            check_property(value)?;
        }
        if let Some(rendering) = &obj.rendering {
            check_payload(rendering)?;
            continue;
        }
        match &obj.kind {
            EntityKind::Room(room) => {
                check_payload(&room.title)?;
                check_descriptions(&room.descriptions)?;
            }
            EntityKind::Item(item) => check_payload(&item.name)?,
            EntityKind::Descriptions(descs) => check_descriptions(descs)?,
            EntityKind::Argument(arg) => check_payload(&arg.name)?,
            EntityKind::Code(code) => {
                for arg in &code.arguments {
                    check_payload(arg)?;
                }
            }
            EntityKind::Verb(verb) => check_payload(&verb.name)?,
            EntityKind::Custom { kind } => {
                return Err(AclError::UnknownEntity {
                    handle,
                    kind: kind.clone(),
                });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

struct Encoder<'a> {
    adventure: &'a Adventure,
    out: Vec<u8>,
}

impl<'a> Encoder<'a> {
    fn new(adventure: &'a Adventure) -> Self {
        Self {
            adventure,
            out: Vec::new(),
        }
    }

    fn tag(&mut self, tag: Tag) {
        self.out.extend_from_slice(&tag);
    }

    fn text(&mut self, text: &str) {
        self.out.extend_from_slice(text.as_bytes());
    }

    fn field(&mut self, tag: Tag, payload: &str) {
        self.tag(tag);
        self.text(payload);
        self.tag(tags::END_FIELD);
    }

    fn fixed_field(&mut self, tag: Tag, prefix: u8, code: u8) {
        self.tag(tag);
        self.out.extend_from_slice(&[prefix, code]);
        self.tag(tags::END_FIELD);
    }

    /// Ordered values joined by `SEP`.
    fn list_field(&mut self, tag: Tag, values: &[String]) {
        self.tag(tag);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.tag(tags::SEP);
            }
            self.text(value);
        }
        self.tag(tags::END_FIELD);
    }

    /// `key SET value` pairs joined by `SEP`.
    fn pairs_field(&mut self, tag: Tag, pairs: &[(String, String)]) {
        self.tag(tag);
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                self.tag(tags::SEP);
            }
            self.text(key);
            self.tag(tags::SET);
            self.text(value);
        }
        self.tag(tags::END_FIELD);
    }

    fn resolve(&self, from: Option<Handle>, target: Handle) -> AclResult<ObjectId> {
        self.adventure
            .id_of(target)
            .ok_or_else(|| AclError::Referential {
                from,
                reason: format!("{target} has no ID or is not part of the adventure"),
            })
    }

    fn resolve_all(&self, from: Handle, targets: &[Handle]) -> AclResult<Vec<String>> {
        targets
            .iter()
            .map(|t| self.resolve(Some(from), *t).map(|id| id.to_string()))
            .collect()
    }

    fn render_property(&self, from: Handle, value: &PropertyValue) -> AclResult<String> {
        Ok(match value {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Integer(n) => n.to_string(),
            PropertyValue::Float(n) => n.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::List(items) => {
                let parts = items
                    .iter()
                    .map(|v| self.render_property(from, v))
                    .collect::<AclResult<Vec<_>>>()?;
                format!("[{}]", parts.join(", "))
            }
            PropertyValue::Object(target) => self.resolve(Some(from), *target)?.to_string(),
        })
    }

    fn header(&mut self, config: &CompilerConfig) -> AclResult<()> {
        let start = self
            .adventure
            .starting_room()
            .ok_or_else(|| AclError::Referential {
                from: None,
                reason: "no starting room declared".to_string(),
            })?;
        let start_id = self.resolve(None, start)?;

        self.out.extend_from_slice(tags::MAGIC);
        self.text(&config.version.to_string());
        self.tag(tags::VERSION_RUNTIME_SEP);
        self.text(&config.runtimes.to_string());
        self.tag(tags::END_RUNTIME);

        self.tag(tags::STARTING_ROOM);
        self.text(&start_id.to_string());
        self.tag(tags::END_RECORD);

        self.tag(tags::ADVENTURE_NAME);
        self.text(&self.adventure.name);
        self.tag(tags::END_RECORD);

        self.tag(tags::ADVENTURE_START_TEXT);
        self.text(&self.adventure.starting_text);
        self.tag(tags::END_RECORD);
        Ok(())
    }

    fn descriptions_fields(&mut self, from: Handle, descs: &Descriptions) -> AclResult<()> {
        self.field(tags::DESCS_FIRST_ENTRY, &descs.first_entry);
        self.field(tags::DESCS_DEFAULT, &descs.default);

        let picked_up = descs
            .when_picked_up
            .iter()
            .map(|(item, text)| Ok((self.resolve(Some(from), *item)?.to_string(), text.clone())))
            .collect::<AclResult<Vec<_>>>()?;
        self.pairs_field(tags::DESCS_PICKED_UP, &picked_up);

        let custom: Vec<_> = descs
            .custom
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.pairs_field(tags::DESCS_CUSTOM, &custom);
        Ok(())
    }

    fn record(&mut self, handle: Handle, obj: &GameObject) -> AclResult<()> {
        let id = self.resolve(None, handle)?;
        tracing::debug!(%handle, %id, kind = obj.kind.name(), "encoding record");

        self.field(tags::ID, &id.to_string());
        self.tag(tags::TYPE);

        if let Some(rendering) = &obj.rendering {
            self.text(rendering);
        } else {
            match &obj.kind {
                EntityKind::Room(room) => {
                    self.tag(tags::ROOM_TYPE);
                    self.field(tags::ROOM_NAME, &room.title);
                    // A room's own description block is addressed by the room's ID.
                    self.field(tags::DESCRIPTION, &id.to_string());
                    self.descriptions_fields(handle, &room.descriptions)?;

                    let exits = room
                        .exits
                        .iter()
                        .map(|(dir, target)| {
                            Ok((dir.code().to_string(), self.resolve(Some(handle), *target)?.to_string()))
                        })
                        .collect::<AclResult<Vec<_>>>()?;
                    self.pairs_field(tags::ROOM_EXITS, &exits);

                    let exit_descs = room
                        .exit_descriptions
                        .iter()
                        .map(|(dir, descs)| {
                            Ok((dir.code().to_string(), self.resolve(Some(handle), *descs)?.to_string()))
                        })
                        .collect::<AclResult<Vec<_>>>()?;
                    self.pairs_field(tags::ROOM_EXIT_DESCS, &exit_descs);

                    let items = self
                        .resolve_all(handle, &room.items)?
                        .into_iter()
                        .enumerate()
                        .map(|(i, id)| (i.to_string(), id))
                        .collect::<Vec<_>>();
                    self.pairs_field(tags::ROOM_ITEMS, &items);
                }
                EntityKind::Argument(arg) => {
                    self.tag(tags::ARGUMENT_TYPE);
                    self.fixed_field(
                        tags::ARGUMENT_TYPEOF,
                        tags::ARGUMENT_TYPE_PREFIX,
                        arg.kind.code(),
                    );
                    self.field(tags::ARGUMENT_NAME, &arg.name);
                }
                EntityKind::Code(code) => {
                    self.tag(tags::CODE_TYPE);
                    self.fixed_field(tags::CODE_KEYWORD, tags::KEYWORD_PREFIX, code.keyword.code());
                    self.list_field(tags::CODE_ARGUMENTS, &code.arguments);
                    let children = self.resolve_all(handle, &code.children)?;
                    self.list_field(tags::CODE_CHILDREN, &children);
                }
                EntityKind::Item(item) => {
                    self.tag(tags::ITEM_TYPE);
                    self.field(tags::ITEM_NAME, &item.name);
                }
                EntityKind::Verb(verb) => {
                    self.tag(tags::VERB_TYPE);
                    self.field(tags::VERB_NAME, &verb.name);
                    let args = self.resolve_all(handle, &verb.arguments)?;
                    self.list_field(tags::VERB_ARGS, &args);
                    let body = self.resolve_all(handle, &verb.body)?;
                    self.list_field(tags::VERB_CODE, &body);
                }
                EntityKind::Descriptions(descs) => {
                    self.tag(tags::DESCRIPTIONS_TYPE);
                    self.descriptions_fields(handle, descs)?;
                }
                EntityKind::Custom { kind } => {
                    return Err(AclError::UnknownEntity {
                        handle,
                        kind: kind.clone(),
                    });
                }
            }
        }

        let props = obj
            .properties
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.render_property(handle, value)?)))
            .collect::<AclResult<Vec<_>>>()?;
        self.pairs_field(tags::PROPS, &props);
        self.tag(tags::END_RECORD);
        Ok(())
    }
}
