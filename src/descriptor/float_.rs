use allocative::Allocative;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind};
use crate::error::{StarfigError, StarfigResult};

#[derive(Debug, Clone, Trace, Allocative)]
pub struct FloatDescriptor<'v> {
    sku: String,
    default: f64,
    required: bool,
    validations: Vec<Value<'v>>,
}

impl<'v> Descriptor<'v> for FloatDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        heap.alloc(self.default)
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        if value.unpack_f64().is_none() {
            return Err(StarfigError::interpreter(format!("Expected float type but got {value}.")));
        }
        run_validations(eval, value, &self.validations)?;
        Ok(value)
    }

    fn type_name(&self) -> &'static str {
        "FloatDescriptor"
    }
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares a floating point schema field.
    #[allow(non_snake_case)]
    fn Float<'v>(
        #[starlark(require = named, default = 0.0f64)] default: f64,
        #[starlark(require = named, default = false)] required: bool,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let validations = match validations {
            Some(v) => extract_validations(v, "Float")?,
            None => Vec::new(),
        };
        let descriptor = FloatDescriptor {
            sku: new_sku("float"),
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
        let descriptor = FloatDescriptor {
            sku: new_sku("float"),
            default: 0.0,
            required: false,
            validations: Vec::new(),
        };
        assert_eq!(descriptor.default_value(&heap).unpack_f64(), Some(0.0));
    }
}
