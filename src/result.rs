//! `SchemaResult`, the value a schema-builder callable produces.
//!
//! Grounded on `internal/native/result.go`: a result is nothing but an
//! identity (which schema built it) plus an ordered field map. We keep it as
//! a first-class Starlark value (rather than converting straight to a plain
//! dict) because the loader and `Object` field type-checks both need to ask
//! "is this the result of schema X" after the fact, which a dict can't answer.

use std::fmt;

use allocative::Allocative;
use indexmap::IndexMap;
use starlark::values::{starlark_value, NoSerialize, ProvidesStaticType, StarlarkValue, Trace, Value};

use crate::descriptor::SchemaDescriptor;

#[derive(Debug, Clone, Trace, NoSerialize, Allocative, ProvidesStaticType)]
pub struct SchemaResult<'v> {
    pub schema_descriptor: SchemaDescriptor<'v>,
    pub evaluated: IndexMap<String, Value<'v>>,
}

impl<'v> SchemaResult<'v> {
    pub fn new(schema_descriptor: SchemaDescriptor<'v>, evaluated: IndexMap<String, Value<'v>>) -> Self {
        Self {
            schema_descriptor,
            evaluated,
        }
    }

    pub fn get(&self, field: &str) -> Option<Value<'v>> {
        self.evaluated.get(field).copied()
    }
}

impl<'v> fmt::Display for SchemaResult<'v> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SchemaResult {}>", self.schema_descriptor.sku())
    }
}

#[starlark_value(type = "SchemaResult")]
impl<'v> StarlarkValue<'v> for SchemaResult<'v> {
    type Canonical = Self;

    fn get_type_starlark_repr() -> starlark::typing::Ty {
        starlark::typing::Ty::any()
    }
}
