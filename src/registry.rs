//! Explicit content type registry.
//!
//! A process can hold any number of registries; nothing here is global.
//! Construct one where lookup is needed and inject it: compilation and
//! validation are correct without it.

use std::collections::BTreeMap;

use log::debug;

use crate::content::ContentType;
use crate::errors::{ConformResult, Error};

/// Name-keyed collection of compiled content types.
#[derive(Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, ContentType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled type under its own name. Names are unique;
    /// re-registering is an error.
    pub fn register(&mut self, ty: ContentType) -> ConformResult<()> {
        let name = ty.name().to_string();
        if self.types.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }
        debug!("registered content type '{}'", name);
        self.types.insert(name, ty);
        Ok(())
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<ContentType> {
        self.types.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All registered types, ordered by name.
    pub fn types(&self) -> impl Iterator<Item = &ContentType> {
        self.types.values()
    }

    /// Removes and returns a registered type.
    pub fn unregister(&mut self, name: &str) -> ConformResult<ContentType> {
        self.types
            .remove(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;

    fn compile(name: &str) -> ContentType {
        let schema = SchemaNode::mapping("thing").child(SchemaNode::string("label"));
        ContentType::compile(&schema, name).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = Registry::new();
        registry.register(compile("Person")).unwrap();

        assert!(registry.contains("Person"));
        assert_eq!(registry.get("Person").unwrap().name(), "Person");
        assert!(registry.get("Nonexistent").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::new();
        registry.register(compile("Person")).unwrap();
        let err = registry.register(compile("Person")).unwrap_err();
        assert!(matches!(err, Error::DuplicateType(_)));
    }

    #[test]
    fn test_types_ordered_by_name() {
        let mut registry = Registry::new();
        registry.register(compile("Zebra")).unwrap();
        registry.register(compile("Aardvark")).unwrap();

        let names: Vec<&str> = registry.types().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Aardvark", "Zebra"]);
    }

    #[test]
    fn test_unregister() {
        let mut registry = Registry::new();
        registry.register(compile("Person")).unwrap();

        let removed = registry.unregister("Person").unwrap();
        assert_eq!(removed.name(), "Person");
        assert!(registry.is_empty());
        assert!(matches!(
            registry.unregister("Person"),
            Err(Error::UnknownType(_))
        ));
    }
}
