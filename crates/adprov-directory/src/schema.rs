//! Field schema exposed to the host runtime.
//!
//! Every field forces a replacement on change: the distinguished name derived
//! from the declared fields is the object's identity, so an in-place update
//! can never be expressed. Consequently the resource registers no update
//! entry point.

use serde::Serialize;
use serde_json::{json, Value};

/// Metadata for a single resource input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Field name as the host sees it.
    pub name: &'static str,
    /// Whether the host must supply a value.
    pub required: bool,
    /// Default applied when the field is omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether a change forces destroy and recreate.
    pub force_new: bool,
}

impl FieldSchema {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
            force_new: true,
        }
    }

    fn optional(name: &'static str, default: Option<Value>) -> Self {
        Self {
            name,
            required: false,
            default,
            force_new: true,
        }
    }
}

/// Schema of the directory user resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchema {
    /// Resource type name registered with the host.
    pub resource_type: &'static str,
    /// Input fields in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    /// Returns the schema of the directory user resource.
    #[must_use]
    pub fn user() -> Self {
        Self {
            resource_type: "directory_user",
            fields: vec![
                FieldSchema::required("first_name"),
                FieldSchema::required("last_name"),
                FieldSchema::required("domain"),
                FieldSchema::required("ou_distinguished_name"),
                FieldSchema::required("logon_name"),
                FieldSchema::required("password"),
                FieldSchema::optional("description", None),
                FieldSchema::optional("must_change_pw", Some(json!(true))),
                FieldSchema::optional("cannot_change_pw", Some(json!(false))),
                FieldSchema::optional("password_not_expire", Some(json!(false))),
            ],
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}
