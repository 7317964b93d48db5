//! Record → [`Data`] field-tree extraction and tag resolution

use super::ExtractorConfig;
use crate::error::{Error, Result};
use crate::ir::{Data, Field, FieldKind, Role, Serialization};
use crate::reflect::{FieldInfo, Shape, Tags, TypeInfo};

const ALLOWED_KINDS: [&str; 8] = [
    "bool", "string", "int", "uint", "array", "slice", "record", "map",
];
const ALLOWED_MAP_KEYS: [&str; 2] = ["string", "int"];
const WIRE_NAME_CHARSET: &str = "lowercase a-z, '-' and '_'";
const ROLE_TAG_SHAPE: &str = "<serialization_name>,(path|query|header|cookie)";
const NAME_TAG_SHAPE: &str = "<serialization_name>,...";

/// Schema of a request or response record
pub(super) fn data(ty: &TypeInfo, config: &ExtractorConfig) -> Result<Data> {
    if !ty.is_record() {
        return Err(Error::InvalidParam {
            got: ty.to_string(),
            want: "record".to_string(),
        });
    }
    let record = FieldWalker { config }.field(ty)?;
    Ok(Data {
        name: ty.name.clone(),
        import: ty.module.clone(),
        fields: record.subfields,
    })
}

struct FieldWalker<'a> {
    config: &'a ExtractorConfig,
}

impl FieldWalker<'_> {
    /// Kind and subfields of one type; names and tags are filled by the caller
    fn field(&self, ty: &TypeInfo) -> Result<Field> {
        let ty = resolve(ty)?;
        match &ty.shape {
            Shape::Bool => Ok(leaf("", FieldKind::Bool)),
            Shape::String => Ok(leaf("", FieldKind::String)),
            Shape::Int(int) => Ok(leaf("", FieldKind::Integer(*int))),
            Shape::Slice(elem) | Shape::Array(elem, _) => {
                let element = self.field(elem)?;
                Ok(Field {
                    subfields: vec![element],
                    ..leaf("", FieldKind::Array)
                })
            }
            Shape::Record(members) => self.record(&ty.name, members),
            Shape::Map(key, value) => self.map(key, value),
            // resolve() only lets allowed kinds through
            _ => Err(Error::Unreachable("field kind dispatch")),
        }
    }

    fn record(&self, name: &str, members: &[FieldInfo]) -> Result<Field> {
        let mut flat = Vec::with_capacity(members.len());
        flatten(members, &mut flat);

        let subfields = flat
            .into_iter()
            .map(|member| self.member(member))
            .collect::<Result<Vec<_>>>()?;
        Ok(Field {
            subfields,
            ..leaf(name, FieldKind::Record)
        })
    }

    fn member(&self, member: &FieldInfo) -> Result<Field> {
        let (serialization, validation) = self
            .tags(&member.tags)
            .map_err(|e| e.failed_on("parse field tag", &member.name))?;
        let inner = self
            .field(&member.ty)
            .map_err(|e| e.failed_on("parse body field", &member.name))?;
        Ok(Field {
            name: member.name.clone(),
            kind: inner.kind,
            serialization: Some(serialization),
            validation,
            subfields: inner.subfields,
        })
    }

    fn map(&self, key: &TypeInfo, value: &TypeInfo) -> Result<Field> {
        let key_kind = match key.shape {
            Shape::String => FieldKind::String,
            Shape::Int(int) if int.is_signed() => FieldKind::Integer(int),
            _ => {
                return Err(Error::not_allowed(
                    "map key type",
                    key,
                    &ALLOWED_MAP_KEYS,
                ))
            }
        };
        let value = Field {
            name: "value".to_string(),
            ..self.field(value)?
        };
        Ok(Field {
            subfields: vec![leaf("key", key_kind), value],
            ..leaf("", FieldKind::Map)
        })
    }

    fn tags(&self, tags: &Tags) -> Result<(Serialization, Vec<String>)> {
        let serialization = self
            .serialization(tags)
            .map_err(|e| e.failed("parse serialization"))?;
        let validation = tags
            .get(&self.config.validate_tag)
            .map(|v| v.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        Ok((serialization, validation))
    }

    /// Explicit role tag first, then the conventional name tag as JSON
    fn serialization(&self, tags: &Tags) -> Result<Serialization> {
        let role_tag = &self.config.role_tag;
        if let Some(value) = tags.get(role_tag) {
            return role_tag_value(value)
                .map_err(|e| e.failed_on_wanting("parse tag", role_tag, ROLE_TAG_SHAPE));
        }

        let name_tag = &self.config.name_tag;
        name_tag_value(tags.get(name_tag))
            .map_err(|e| e.failed_on_wanting("parse tag", name_tag, NAME_TAG_SHAPE))
    }
}

fn role_tag_value(value: &str) -> Result<Serialization> {
    let parts: Vec<&str> = value.split(',').collect();
    let [name, role] = parts.as_slice() else {
        return Err(Error::bad_value("number of tag values", parts.len(), 2));
    };
    check_wire_name(name)?;

    let upper = role.to_ascii_uppercase();
    let role = Role::parse(&upper)
        .filter(|r| Role::EXPLICIT.contains(r))
        .ok_or_else(|| Error::not_allowed("serialization type", &upper, &Role::EXPLICIT))?;
    Ok(Serialization {
        role,
        name: name.to_string(),
    })
}

fn name_tag_value(value: Option<&str>) -> Result<Serialization> {
    let Some(value) = value else {
        return Err(Error::bad_value("tag value", "", "serialization_name"));
    };
    let name = value.split(',').next().unwrap_or(value);
    check_wire_name(name)?;
    Ok(Serialization {
        role: Role::Json,
        name: name.to_string(),
    })
}

fn check_wire_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::BadFormat {
            got: name.to_string(),
            want: WIRE_NAME_CHARSET.to_string(),
        })
    }
}

/// Splice anonymous embedded records into the parent's member list
fn flatten<'a>(members: &'a [FieldInfo], out: &mut Vec<&'a FieldInfo>) {
    for member in members {
        match &member.ty.shape {
            Shape::Record(inner) if member.embedded => flatten(inner, out),
            _ => out.push(member),
        }
    }
}

/// Strip at most one pointer and reject disallowed kinds
fn resolve(ty: &TypeInfo) -> Result<&TypeInfo> {
    let mut current = ty;
    let mut level = 0;
    while let Shape::Pointer(inner) = &current.shape {
        level += 1;
        if level == 2 {
            return Err(Error::SinglePointerRequired(ty.to_string()));
        }
        current = inner;
    }

    match current.shape {
        Shape::Float => Err(Error::FloatNotAllowed(current.to_string())),
        Shape::Bool
        | Shape::String
        | Shape::Int(_)
        | Shape::Slice(_)
        | Shape::Array(..)
        | Shape::Record(_)
        | Shape::Map(..) => Ok(current),
        _ => Err(Error::not_allowed("type", current, &ALLOWED_KINDS)),
    }
}

fn leaf(name: &str, kind: FieldKind) -> Field {
    Field {
        name: name.to_string(),
        kind,
        serialization: None,
        validation: Vec::new(),
        subfields: Vec::new(),
    }
}
