use allocative::Allocative;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::list::resolve_inner;
use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind, SchemaDescriptor};
use crate::error::{StarfigError, StarfigResult};

/// `Object(inner, required = False, validations = [...])`, a single nested
/// schema instance. Grounded on `internal/native/object.go`; unlike `List`,
/// `inner` must resolve to a `Schema`, never a primitive.
#[derive(Debug, Clone, Trace, Allocative)]
pub struct ObjectDescriptor<'v> {
    sku: String,
    inner: Box<SchemaDescriptor<'v>>,
    required: bool,
    validations: Vec<Value<'v>>,
}

impl<'v> Descriptor<'v> for ObjectDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        self.inner.default_value(heap)
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        let result = self.inner.evaluate(eval, value)?;
        run_validations(eval, result, &self.validations)?;
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        "ObjectDescriptor"
    }
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares a nested-schema schema field.
    #[allow(non_snake_case)]
    fn Object<'v>(
        #[starlark(require = pos, default = starlark::values::none::NoneType)] inner: Value<'v>,
        #[starlark(require = named, default = false)] required: bool,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        if inner.is_none() {
            return Err(StarfigError::interpreter(
                "Object requires a schema type. i.e. Object(Foo).",
            )
            .into());
        }
        let resolved = resolve_inner(inner, eval)?;
        let schema = match resolved {
            DescriptorKind::Schema(schema) => schema,
            other => {
                return Err(StarfigError::interpreter(format!(
                    "Object requires a schema type, but got {}. i.e. Object(Foo).",
                    other.type_name()
                ))
                .into())
            }
        };

        let validations = match validations {
            Some(v) => extract_validations(v, "Object")?,
            None => Vec::new(),
        };
        let descriptor = ObjectDescriptor {
            sku: new_sku("object"),
            inner: Box::new(schema),
            required,
            validations,
        };
        Ok(eval.heap().alloc(DescriptorKind::from(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_defaults_to_false() {
        let descriptor = ObjectDescriptor {
            sku: new_sku("object"),
            inner: Box::new(SchemaDescriptor::for_test()),
            required: false,
            validations: Vec::new(),
        };
        assert!(!descriptor.is_required());
    }
}
