use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const PUBLIC: u32 = 0x0001;
const FINAL: u32 = 0x0010;
const STATIC: u32 = 0x0008;
const ABSTRACT: u32 = 0x0400;

/// Name of the member kind used for constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Annotation,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Method,
    Constructor,
}

/// An annotation instance attached to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationInfo {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl AnnotationInfo {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Matches by fully-qualified or simple type name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.type_name == name || simple_name(&self.type_name) == name
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A method or constructor declared by a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberInfo {
    pub name: String,

    #[serde(default)]
    pub kind: MemberKind,

    #[serde(default)]
    pub modifiers: u32,

    #[serde(default)]
    pub parameters: Vec<String>,

    #[serde(default = "default_return_type")]
    pub return_type: String,

    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl MemberInfo {
    #[must_use]
    pub fn method(name: impl Into<String>, modifiers: u32, parameters: &[&str], return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            modifiers,
            parameters: parameters.iter().map(ToString::to_string).collect(),
            return_type: return_type.into(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn constructor(modifiers: u32, parameters: &[&str]) -> Self {
        Self {
            kind: MemberKind::Constructor,
            ..Self::method(CONSTRUCTOR_NAME, modifiers, parameters, "void")
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationInfo) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Parameter types joined with `,` and no spaces, e.g. `int,java.lang.String`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.parameters.join(",")
    }

    /// Stable identity of the member within its declaring type: `name(signature)`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}({})", self.name, self.signature())
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.modifiers & STATIC != 0
    }

    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.kind == MemberKind::Method && self.return_type != "void"
    }

    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&AnnotationInfo> {
        self.annotations.iter().find(|a| a.matches(name))
    }
}

/// A type known to the universe: its hierarchy, annotations, and declared members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeInfo {
    pub name: String,

    #[serde(default)]
    pub kind: TypeKind,

    /// Access flags; public when omitted.
    #[serde(default = "default_type_modifiers")]
    pub modifiers: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub annotations: Vec<AnnotationInfo>,

    #[serde(default)]
    pub members: Vec<MemberInfo>,

    /// Defining loader; `None` is the bootstrap loader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
}

const fn default_type_modifiers() -> u32 {
    PUBLIC
}

impl TypeInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: default_type_modifiers(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            loader: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: u32) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationInfo) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = Some(loader.into());
        self
    }

    #[must_use]
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// The declaring package, empty for the default package.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(package, _)| package)
    }

    /// Whether no other type can extend or implement this one.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        match self.kind {
            TypeKind::Class => self.modifiers & FINAL != 0 && self.modifiers & ABSTRACT == 0,
            TypeKind::Enum => true,
            TypeKind::Interface | TypeKind::Annotation => false,
        }
    }

    /// Direct supertypes: superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass.iter().chain(&self.interfaces).map(String::as_str)
    }

    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&AnnotationInfo> {
        self.annotations.iter().find(|a| a.matches(name))
    }

    #[must_use]
    pub fn member(&self, key: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.key() == key)
    }

    /// `name` at `loader`, used as a display and cache identity.
    #[must_use]
    pub fn identity(&self) -> String {
        match &self.loader {
            Some(loader) => format!("{}@{loader}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Strips any package or outer-type qualification from a type name.
#[must_use]
pub fn simple_name(name: &str) -> &str {
    let name = name.rsplit_once('.').map_or(name, |(_, simple)| simple);
    name.rsplit_once('$').map_or(name, |(_, simple)| simple)
}

/// A classloader and its parent in the delegation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl LoaderInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_package_and_outer_type() {
        assert_eq!(simple_name("java.lang.Object"), "Object");
        assert_eq!(simple_name("com.acme.Outer$Inner"), "Inner");
        assert_eq!(simple_name("Plain"), "Plain");
    }

    #[test]
    fn package_name_of_default_package_is_empty() {
        assert_eq!(TypeInfo::new("Plain", TypeKind::Class).package_name(), "");
        assert_eq!(TypeInfo::new("com.acme.Plain", TypeKind::Class).package_name(), "com.acme");
    }

    #[test]
    fn member_signature_and_key() {
        let member = MemberInfo::method("put", 0x0001, &["java.lang.String", "int"], "void");
        assert_eq!(member.signature(), "java.lang.String,int");
        assert_eq!(member.key(), "put(java.lang.String,int)");
        assert!(!member.returns_value());
    }

    #[test]
    fn interfaces_are_never_final() {
        let iface = TypeInfo::new("com.acme.Api", TypeKind::Interface).with_modifiers(0x0001 | 0x0010);
        assert!(!iface.is_final());

        let class = TypeInfo::new("com.acme.Impl", TypeKind::Class).with_modifiers(0x0001 | 0x0010);
        assert!(class.is_final());
    }

    #[test]
    fn annotation_matches_simple_or_qualified_name() {
        let annotation = AnnotationInfo::new("com.acme.Timed").with_attribute("value", "fast");
        assert!(annotation.matches("Timed"));
        assert!(annotation.matches("com.acme.Timed"));
        assert!(!annotation.matches("acme.Timed"));
        assert_eq!(annotation.attribute("value"), Some("fast"));
    }

    #[test]
    fn deserialize_with_defaults() {
        let json = r#"{"name": "com.acme.Service", "members": [{"name": "run"}]}"#;
        let info: TypeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.kind, TypeKind::Class);
        assert_eq!(info.members[0].return_type, "void");
        assert_eq!(info.modifiers, 0x0001);
        assert_eq!(info.members[0].kind, MemberKind::Method);
        assert!(info.loader.is_none());
    }

    #[test]
    fn loaded_and_built_types_agree_on_defaults() {
        let loaded: TypeInfo = serde_json::from_str(r#"{"name": "com.acme.Job"}"#).unwrap();
        assert_eq!(loaded, TypeInfo::new("com.acme.Job", TypeKind::Class));

        let loaded: TypeInfo = toml::from_str("name = \"com.acme.Job\"\nmodifiers = 17").unwrap();
        assert!(loaded.is_final());
    }
}
