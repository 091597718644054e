use allocative::Allocative;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::values::list::{AllocList, ListRef};
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind};
use crate::error::{StarfigError, StarfigResult};

/// `List(inner, validations = [...])`, a homogeneous sequence of `inner`.
/// Grounded on `internal/native/list.go`; never `required` (a missing list
/// field simply defaults to empty), matching the original's omission of a
/// `required` parameter from `List`'s signature entirely.
#[derive(Debug, Clone, Trace, Allocative)]
pub struct ListDescriptor<'v> {
    sku: String,
    inner: Box<DescriptorKind<'v>>,
    validations: Vec<Value<'v>>,
}

impl<'v> Descriptor<'v> for ListDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        heap.alloc(AllocList(Vec::<Value<'v>>::new()))
    }

    fn is_required(&self) -> bool {
        false
    }

    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        let list = ListRef::from_value(value)
            .ok_or_else(|| StarfigError::interpreter(format!("Expected list type but got {value}.")))?;
        let mut evaluated = Vec::with_capacity(list.len());
        for item in list.iter() {
            evaluated.push(self.inner.evaluate(eval, item)?);
        }
        let result = eval.heap().alloc(AllocList(evaluated));
        run_validations(eval, result, &self.validations)?;
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        "ListDescriptor"
    }
}

/// Resolve an `inner`/schema-typed argument (as used by both `List` and
/// `Object`) to the descriptor it refers to.
///
/// A bare schema-builder reference (`Foo`, never called) already *is* a
/// `DescriptorKind::Schema` heap value, so it downcasts directly. A bare
/// primitive builtin (`Bool`, `Int`, `Float`, `String`, likewise never
/// called) is a plain native function; calling it with no arguments is
/// exactly how its own builtin would build the all-defaults descriptor a
/// bare reference is meant to denote.
pub fn resolve_inner<'v>(inner: Value<'v>, eval: &mut Evaluator<'v, '_>) -> StarfigResult<DescriptorKind<'v>> {
    if let Some(descriptor) = inner.downcast_ref::<DescriptorKind<'v>>() {
        return Ok(descriptor.clone());
    }
    let called = inner
        .invoke_pos(&[], eval)
        .map_err(|_| StarfigError::interpreter(format!("Unable to find {inner}.")))?;
    called
        .downcast_ref::<DescriptorKind<'v>>()
        .cloned()
        .ok_or_else(|| StarfigError::interpreter(format!("Unable to find {inner}.")))
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares a homogeneous list schema field.
    #[allow(non_snake_case)]
    fn List<'v>(
        #[starlark(require = pos, default = starlark::values::none::NoneType)] inner: Value<'v>,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        if inner.is_none() {
            return Err(StarfigError::interpreter(
                "List requires a type. i.e. List(String), List(Foo).",
            )
            .into());
        }
        let inner = resolve_inner(inner, eval)?;

        let validations = match validations {
            Some(v) => extract_validations(v, "List")?,
            None => Vec::new(),
        };
        let descriptor = ListDescriptor {
            sku: new_sku("list"),
            inner: Box::new(inner),
            validations,
        };
        Ok(eval.heap().alloc(DescriptorKind::from(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::StringDescriptor;
    use starlark::values::Heap;

    #[test]
    fn default_is_empty_list() {
        let heap = Heap::new();
        let descriptor = ListDescriptor {
            sku: new_sku("list"),
            inner: Box::new(DescriptorKind::String(StringDescriptor::for_test())),
            validations: Vec::new(),
        };
        let value = descriptor.default_value(&heap);
        assert_eq!(ListRef::from_value(value).unwrap().len(), 0);
        assert!(!descriptor.is_required());
    }
}
