//! Data shaping: reduce a resource to the fields a caller asked for.
//!
//! Each shapeable type publishes a static [`FieldTable`] listing its fields in
//! declared order. A `fields` query such as `"name, age"` is resolved against
//! that table once per request into a [`FieldSpec`], and every record is then
//! projected into an ordered [`Record`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::links::Link;

/// Ordered field name to value mapping produced by shaping.
pub type Record = Map<String, Value>;

/// Declared fields of a resource type, in output order.
#[derive(Debug)]
pub struct FieldTable {
    id_field: &'static str,
    fields: &'static [&'static str],
}

impl FieldTable {
    /// # Panics
    ///
    /// Panics when `id_field` is not one of `fields`. Shaped output must always
    /// carry the identifier, so a table without it is a programming error.
    pub fn new(id_field: &'static str, fields: &'static [&'static str]) -> Self {
        assert!(
            fields.contains(&id_field),
            "field table must declare its identifier field '{}'",
            id_field
        );
        Self { id_field, fields }
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Case-insensitive lookup returning the declared spelling.
    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .copied()
            .find(|field| field.eq_ignore_ascii_case(name))
    }
}

/// The resolved set of fields for one request, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    fields: Vec<&'static str>,
}

impl FieldSpec {
    /// Parse a comma-separated field list. Blank input selects every declared
    /// field; unknown names are dropped. The identifier is always selected.
    pub fn parse(query: Option<&str>, table: &FieldTable) -> Self {
        let requested: Vec<&'static str> = query
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| table.lookup(token))
            .collect();

        let blank = query.map_or(true, |q| q.trim().is_empty());
        if blank {
            return Self { fields: table.fields().to_vec() };
        }

        let fields = table
            .fields()
            .iter()
            .copied()
            .filter(|field| *field == table.id_field() || requested.contains(field))
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

/// A resource type that can be projected field by field.
pub trait Shapeable {
    fn field_table() -> &'static FieldTable;

    fn id(&self) -> Uuid;

    /// Value of a declared field. Called only with names from [`Self::field_table`].
    fn field_value(&self, field: &str) -> Value;
}

/// A shaped record plus the hypermedia links attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedEntity {
    pub id: Uuid,
    pub entity: Record,
    pub links: Vec<Link>,
}

impl ShapedEntity {
    pub fn new(id: Uuid, entity: Record) -> Self {
        Self { id, entity, links: Vec::new() }
    }

    /// Case-insensitive field lookup.
    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&Value> {
        get_field(&self.entity, field)
    }
}

// Links are rendered as a trailing `links` key, and only when present.
impl Serialize for ShapedEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(!self.links.is_empty());
        let mut map = serializer.serialize_map(Some(self.entity.len() + extra))?;
        for (key, value) in &self.entity {
            map.serialize_entry(key, value)?;
        }
        if !self.links.is_empty() {
            map.serialize_entry("links", &self.links)?;
        }
        map.end()
    }
}

/// Case-insensitive lookup in a record.
#[cfg(test)]
fn get_field<'a>(record: &'a Record, name: &str) -> Option<&'a Value> {
    record.get(name).or_else(|| {
        record
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Shape one entity against an already resolved field spec.
pub fn shape_entity<T: Shapeable>(entity: &T, spec: &FieldSpec) -> ShapedEntity {
    let mut record = Record::new();
    for field in spec.fields() {
        record.insert((*field).to_string(), entity.field_value(field));
    }
    ShapedEntity::new(entity.id(), record)
}

/// Shape a collection, preserving input order.
pub fn shape<T: Shapeable>(entities: &[T], fields_query: Option<&str>) -> Vec<ShapedEntity> {
    let spec = FieldSpec::parse(fields_query, T::field_table());
    entities.iter().map(|entity| shape_entity(entity, &spec)).collect()
}
