//! Header view of a compiled class file.
//!
//! Only what the resolver and prober need is kept: names, super types and the
//! method table. Bytecode is never looked at.

use cafebabe::descriptors::{FieldDescriptor, FieldType};
use cafebabe::{ClassAccessFlags, MethodAccessFlags};
use serde::Serialize;

use crate::naming::internal_to_qualified;

pub const ENTRY_POINT_NAME: &str = "main";
pub const ENTRY_POINT_PARAMETER: &str = "java.lang.String[]";

#[derive(Debug, Clone, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub parameters: Vec<String>,
}

impl MethodSig {
    /// `public static main(String[])`; the return type is not constrained.
    pub fn is_entry_point(&self) -> bool {
        self.is_public
            && self.is_static
            && self.name == ENTRY_POINT_NAME
            && self.parameters.len() == 1
            && self.parameters[0] == ENTRY_POINT_PARAMETER
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitHeader {
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub is_interface: bool,
    pub is_module: bool,
    pub major_version: u16,
    pub methods: Vec<MethodSig>,
}

impl UnitHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        let class = cafebabe::parse_class(bytes).map_err(|e| format!("{e:?}"))?;

        let methods = class
            .methods
            .iter()
            .map(|m| MethodSig {
                name: m.name.to_string(),
                is_public: m.access_flags.contains(MethodAccessFlags::PUBLIC),
                is_static: m.access_flags.contains(MethodAccessFlags::STATIC),
                parameters: m.descriptor.parameters.iter().map(render_parameter).collect(),
            })
            .collect();

        Ok(Self {
            name: internal_to_qualified(&class.this_class),
            super_class: class.super_class.as_deref().map(internal_to_qualified),
            interfaces: class
                .interfaces
                .iter()
                .map(|i| internal_to_qualified(i))
                .collect(),
            is_interface: class.access_flags.contains(ClassAccessFlags::INTERFACE),
            is_module: class.access_flags.contains(ClassAccessFlags::MODULE),
            major_version: class.major_version,
            methods,
        })
    }

    pub fn declares_entry_point(&self) -> bool {
        self.methods.iter().any(MethodSig::is_entry_point)
    }
}

fn render_parameter(desc: &FieldDescriptor) -> String {
    let base = match &desc.field_type {
        FieldType::Byte => "byte".to_string(),
        FieldType::Char => "char".to_string(),
        FieldType::Double => "double".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::Integer => "int".to_string(),
        FieldType::Long => "long".to_string(),
        FieldType::Short => "short".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Object(name) => internal_to_qualified(&name.to_string()),
    };
    format!("{base}{}", "[]".repeat(desc.dimensions as usize))
}
