use allocative::Allocative;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind};
use crate::error::{StarfigError, StarfigResult};

#[derive(Debug, Clone, Trace, Allocative)]
pub struct StringDescriptor<'v> {
    sku: String,
    default: String,
    required: bool,
    validations: Vec<Value<'v>>,
}

impl<'v> Descriptor<'v> for StringDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        heap.alloc_str(&self.default).to_value()
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        if value.unpack_str().is_none() {
            return Err(StarfigError::interpreter(format!("Expected string type but got {value}.")));
        }
        run_validations(eval, value, &self.validations)?;
        Ok(value)
    }

    fn type_name(&self) -> &'static str {
        "StringDescriptor"
    }
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares a string schema field.
    #[allow(non_snake_case)]
    fn String<'v>(
        #[starlark(require = named, default = "")] default: &str,
        #[starlark(require = named, default = false)] required: bool,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let validations = match validations {
            Some(v) => extract_validations(v, "String")?,
            None => Vec::new(),
        };
        let descriptor = StringDescriptor {
            sku: new_sku("string"),
            default: default.to_owned(),
            required,
            validations,
        };
        Ok(eval.heap().alloc(DescriptorKind::from(descriptor)))
    }
}

#[cfg(test)]
impl<'v> StringDescriptor<'v> {
    pub fn for_test() -> StringDescriptor<'static> {
        StringDescriptor {
            sku: new_sku("string"),
            default: String::new(),
            required: false,
            validations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlark::values::Heap;

    #[test]
    fn default_is_empty_when_unset() {
        let heap = Heap::new();
        let descriptor = StringDescriptor {
            sku: new_sku("string"),
            default: String::new(),
            required: false,
            validations: Vec::new(),
        };
        assert_eq!(descriptor.default_value(&heap).unpack_str(), Some(""));
    }
}
