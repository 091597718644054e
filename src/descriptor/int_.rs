use allocative::Allocative;
use num_bigint::BigInt;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::values::types::int_or_big::StarlarkIntOrBig;
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind};
use crate::error::{StarfigError, StarfigResult};

#[derive(Debug, Clone, Trace, Allocative)]
pub struct IntDescriptor<'v> {
    sku: String,
    #[allocative(skip)]
    default: BigInt,
    required: bool,
    validations: Vec<Value<'v>>,
}

impl<'v> Descriptor<'v> for IntDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        heap.alloc(StarlarkIntOrBig::from(self.default.clone()))
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        if value_as_bigint(value).is_none() {
            return Err(StarfigError::interpreter(format!("Expected int type but got {value}.")));
        }
        run_validations(eval, value, &self.validations)?;
        Ok(value)
    }

    fn type_name(&self) -> &'static str {
        "IntDescriptor"
    }
}

/// Best-effort extraction of an arbitrary-precision int out of a Starlark value.
pub fn value_as_bigint(value: Value<'_>) -> Option<BigInt> {
    if let Some(small) = value.unpack_i32() {
        return Some(BigInt::from(small));
    }
    StarlarkIntOrBig::from_value(value).map(|v| v.to_big_int())
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares an arbitrary-precision integer schema field.
    #[allow(non_snake_case)]
    fn Int<'v>(
        #[starlark(require = named)] default: Option<Value<'v>>,
        #[starlark(require = named, default = false)] required: bool,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let default = match default {
            Some(v) => value_as_bigint(v)
                .ok_or_else(|| StarfigError::interpreter(format!("Expected default to be an int but got {v}.")))?,
            None => BigInt::from(0),
        };
        let validations = match validations {
            Some(v) => extract_validations(v, "Int")?,
            None => Vec::new(),
        };
        let descriptor = IntDescriptor {
            sku: new_sku("int"),
            default,
            required,
            validations,
        };
        Ok(eval.heap().alloc(DescriptorKind::from(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlark::values::Heap;

    #[test]
    fn default_is_zero_when_unset() {
        let heap = Heap::new();
        let descriptor = IntDescriptor {
            sku: new_sku("int"),
            default: BigInt::from(0),
            required: false,
            validations: Vec::new(),
        };
        let value = descriptor.default_value(&heap);
        assert_eq!(value_as_bigint(value), Some(BigInt::from(0)));
    }
}
