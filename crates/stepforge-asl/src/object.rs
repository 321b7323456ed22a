use crate::{ASL_FIELDS, AslResult, FieldName, SerializeConfig};
use serde_json::{Map, Value};

/// Ordered string-keyed mapping produced by serialization.
pub type FieldMap = Map<String, Value>;

/// Which absent or empty attribute values `to_fields` drops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OmitOptions {
    /// Unset attributes.
    pub exclude_none: bool,
    pub exclude_empty_string: bool,
    /// Empty arrays and objects.
    pub exclude_empty_collection: bool,
}

impl Default for OmitOptions {
    fn default() -> Self {
        Self {
            exclude_none: true,
            exclude_empty_string: true,
            exclude_empty_collection: true,
        }
    }
}

impl OmitOptions {
    pub fn keep_all() -> Self {
        Self {
            exclude_none: false,
            exclude_empty_string: false,
            exclude_empty_collection: false,
        }
    }

    pub fn omits(&self, value: Option<&Value>) -> bool {
        match value {
            None => self.exclude_none,
            Some(Value::String(inner)) => self.exclude_empty_string && inner.is_empty(),
            Some(Value::Array(inner)) => self.exclude_empty_collection && inner.is_empty(),
            Some(Value::Object(inner)) => self.exclude_empty_collection && inner.is_empty(),
            Some(_) => false,
        }
    }
}

/// Shared contract of everything that becomes ASL JSON.
///
/// `serialize_with` runs: `validate_before_serialize` -> `build_fields` ->
/// `reorder` -> `validate_after_serialize`. The default `build_fields` is
/// `to_wire_names(to_fields(..))`; composites (parallel, map, choice,
/// workflow) override it to splice in nested serializations.
pub trait AslObject {
    /// Every attribute this entity can emit, in declaration order. Unset
    /// values are `None`. Bookkeeping such as a state's id never appears here.
    fn attributes(&self) -> Vec<(FieldName, Option<Value>)>;

    fn alias_table(&self) -> &'static [FieldName] {
        ASL_FIELDS
    }

    /// Canonical wire order. Keys not listed are dropped by `reorder`.
    fn field_order(&self) -> Option<&'static [FieldName]> {
        None
    }

    fn to_fields(&self, omit: OmitOptions) -> FieldMap {
        let mut fields = FieldMap::new();
        for (name, value) in self.attributes() {
            if omit.omits(value.as_ref()) {
                continue;
            }
            fields.insert(name.attr.to_string(), value.unwrap_or(Value::Null));
        }
        fields
    }

    fn to_wire_names(&self, fields: FieldMap) -> FieldMap {
        let table = self.alias_table();
        fields
            .into_iter()
            .map(|(key, value)| {
                let wire = table
                    .iter()
                    .find(|name| name.attr == key)
                    .map(|name| name.wire.to_string())
                    .unwrap_or(key);
                (wire, value)
            })
            .collect()
    }

    fn reorder(&self, mut fields: FieldMap) -> FieldMap {
        let Some(order) = self.field_order() else {
            return fields;
        };
        let mut ordered = FieldMap::new();
        for name in order {
            if let Some(value) = fields.remove(name.wire) {
                ordered.insert(name.wire.to_string(), value);
            }
        }
        ordered
    }

    fn validate_before_serialize(&self, _config: &SerializeConfig) -> AslResult<()> {
        Ok(())
    }

    fn validate_after_serialize(
        &self,
        _config: &SerializeConfig,
        _output: &FieldMap,
    ) -> AslResult<()> {
        Ok(())
    }

    fn build_fields(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        Ok(self.to_wire_names(self.to_fields(config.omit)))
    }

    fn serialize_with(&self, config: &SerializeConfig) -> AslResult<FieldMap> {
        self.validate_before_serialize(config)?;
        let data = self.build_fields(config)?;
        let data = self.reorder(data);
        self.validate_after_serialize(config, &data)?;
        Ok(data)
    }

    fn serialize(&self) -> AslResult<FieldMap> {
        self.serialize_with(&SerializeConfig::default())
    }
}

pub(crate) fn string_value(value: &Option<String>) -> Option<Value> {
    value.clone().map(Value::String)
}
