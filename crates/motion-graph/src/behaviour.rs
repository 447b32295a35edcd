// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plugin behaviours: typed property bags attached to states and machines.

use serde::{Deserialize, Serialize};

use crate::ident::NodeId;

/// Value of one behaviour field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    String(String),
    /// Enum variant by name.
    Enum(String),
    /// 2-component vector.
    Vector2([f32; 2]),
    /// 3-component vector.
    Vector3([f32; 3]),
    /// 4-component vector.
    Vector4([f32; 4]),
    /// RGBA color.
    Color([f32; 4]),
    /// Name of a parameter in the owning graph's table.
    ParameterRef(String),
    /// Handle of another node in the owning graph.
    NodeRef(Option<NodeId>),
    /// A field whose type the tooling does not understand.
    Unsupported {
        /// Declared type name, kept for diagnostics.
        type_name: String,
    },
}

impl FieldValue {
    /// Short type label used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Enum(_) => "enum",
            FieldValue::Vector2(_) => "vector2",
            FieldValue::Vector3(_) => "vector3",
            FieldValue::Vector4(_) => "vector4",
            FieldValue::Color(_) => "color",
            FieldValue::ParameterRef(_) => "parameter",
            FieldValue::NodeRef(_) => "node",
            FieldValue::Unsupported { type_name } => type_name,
        }
    }
}

/// Named field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Field name, unique within its behaviour by convention.
    pub name: String,
    /// Field value.
    pub value: FieldValue,
}

/// A plugin behaviour instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Behaviour {
    /// Plugin type identifier.
    pub type_name: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Behaviour {
    /// Behaviour of `type_name` with no fields.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field append.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }

    /// Value of the first field named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}
