//! The schema-to-type compiler.
//!
//! `ContentType::compile` walks a mapping schema once and synthesizes a
//! type: one property descriptor per top-level child, a constructor with
//! all-or-nothing field validation, and serialize/deserialize entry points.
//! A `ContentType` is a cheap-to-clone handle over immutable shared
//! configuration; everything mutable lives on instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::errors::{ConformResult, Error};
use crate::properties::{MappingProperty, Property};
use crate::schema::SchemaNode;
use crate::value::Value;

use super::instance::Instance;

type BaseFactory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

struct TypeInner {
    name: String,
    schema: SchemaNode,
    root: MappingProperty,
    base_factory: Option<BaseFactory>,
}

/// A runtime type compiled from a mapping schema.
///
/// The settable attribute names of every instance are exactly the schema's
/// top-level child names, fixed for the type's lifetime. Cloning the handle
/// shares the compiled configuration; it never re-compiles.
#[derive(Clone)]
pub struct ContentType {
    inner: Arc<TypeInner>,
}

impl ContentType {
    /// Compiles `schema` into a content type named `name`.
    ///
    /// The schema root must be a mapping; any other shape fails before any
    /// property is created. The schema is cloned on entry, so later
    /// mutation of the caller's schema cannot affect the compiled type.
    pub fn compile(schema: &SchemaNode, name: &str) -> ConformResult<Self> {
        Self::build(schema, name, None)
    }

    /// Compiles `schema` with an attached base object type.
    ///
    /// Each instance owns one `B`, created by `B::default()` at
    /// construction time and retrievable through [`Instance::base`]. The
    /// `Default` bound is the no-argument-construction requirement, checked
    /// statically.
    pub fn compile_with_base<B>(schema: &SchemaNode, name: &str) -> ConformResult<Self>
    where
        B: Default + Any + Send + Sync,
    {
        Self::build(
            schema,
            name,
            Some(Arc::new(|| {
                Box::new(B::default()) as Box<dyn Any + Send + Sync>
            })),
        )
    }

    fn build(
        schema: &SchemaNode,
        name: &str,
        base_factory: Option<BaseFactory>,
    ) -> ConformResult<Self> {
        if !schema.is_mapping() {
            return Err(Error::NotAMapping {
                actual: schema.kind(),
            });
        }
        let schema = schema.clone();
        let root = match Property::for_node(&schema)? {
            Property::Mapping(p) => p,
            _ => {
                return Err(Error::NotAMapping {
                    actual: schema.kind(),
                });
            }
        };
        debug!(
            "compiled content type '{}' with {} fields",
            name,
            root.children().len()
        );
        Ok(Self {
            inner: Arc::new(TypeInner {
                name: name.to_string(),
                schema,
                root,
                base_factory,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The compiled type's own copy of the schema.
    pub fn schema(&self) -> &SchemaNode {
        &self.inner.schema
    }

    /// Top-level field names, in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.root.children().iter().map(|p| p.name())
    }

    /// The property descriptor for a top-level field.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.inner.root.children().iter().find(|p| p.name() == name)
    }

    /// Constructs an instance from keyword arguments (a mapping of field
    /// name to raw application value; null stands for "no keywords").
    ///
    /// Every schema field absent from the keywords is treated as missing,
    /// letting defaults apply or "Required" fail. All field failures are
    /// aggregated into one error; unrecognized keyword names are rejected
    /// only after field validation succeeds.
    pub fn construct(&self, kwargs: Value) -> ConformResult<Instance> {
        let record = self.inner.root.build(kwargs)?;
        let base = self.inner.base_factory.as_ref().map(|factory| factory());
        Ok(Instance::new(self.clone(), record, base))
    }

    /// Constructs an instance from name/value pairs.
    pub fn construct_from<K, I>(&self, pairs: I) -> ConformResult<Instance>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let entries = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.construct(Value::Mapping(entries))
    }

    /// Deserializes a wire value into an instance: the schema's own
    /// deserialize turns wire into validated application values, then
    /// construction proceeds from those: wire coercion and object
    /// construction stay cleanly separated.
    pub fn deserialize(&self, cstruct: &Value) -> ConformResult<Instance> {
        let appstruct = self.inner.schema.deserialize(cstruct)?;
        self.construct(appstruct)
    }
}

impl fmt::Debug for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentType")
            .field("name", &self.inner.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}
