use allocative::Allocative;
use indexmap::IndexMap;
use starlark::environment::GlobalsBuilder;
use starlark::eval::{Arguments, Evaluator};
use starlark::values::dict::DictRef;
use starlark::values::{Heap, Trace, Value, ValueLike};
use starlark_derive::starlark_module;

use super::{extract_validations, new_sku, run_validations, Descriptor, DescriptorKind};
use crate::context::SchemaRegistry;
use crate::error::{StarfigError, StarfigResult};
use crate::interp::eval_context;
use crate::result::SchemaResult;

/// A `Schema(fields = {...})` descriptor. Unlike the scalar kinds, calling the
/// value `Schema(...)` returns is itself a Starlark operation (instantiation,
/// spec.md §4.2) rather than a plain type check, so most of this file is
/// `instantiate`, not `evaluate`.
#[derive(Debug, Clone, Trace, Allocative)]
pub struct SchemaDescriptor<'v> {
    sku: String,
    fields: IndexMap<String, DescriptorKind<'v>>,
    validations: Vec<Value<'v>>,
}

impl<'v> SchemaDescriptor<'v> {
    /// The reconciled, user-visible name if the registry has bound one yet,
    /// falling back to the SKU for descriptors still mid-definition.
    pub fn display_name(&self, registry: &SchemaRegistry) -> String {
        registry.display_name(&self.sku).unwrap_or_else(|| self.sku.clone())
    }

    /// Instantiate this schema: `me` is the callable value the user wrote as
    /// `Foo(...)`, `args` its call arguments. Mirrors `schema.go`'s
    /// `CallInternal`: reject positional args, fill/validate every declared
    /// field (defaulting the missing optional ones), reject unknown keywords,
    /// then run the schema's own validators against the built result.
    pub fn instantiate(
        &self,
        args: &Arguments<'v, '_>,
        eval: &mut Evaluator<'v, '_>,
    ) -> StarfigResult<Value<'v>> {
        let ctx = eval_context(eval);
        let name = self.display_name(&ctx.registry);

        let positions: Vec<Value<'v>> = args
            .positions(eval.heap())
            .map_err(|e| StarfigError::interpreter(format!("Invalid arguments in {name}: {e}")))?
            .collect();
        if !positions.is_empty() {
            let rendered = positions.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
            return Err(StarfigError::interpreter(format!("Invalid positional arguments {rendered} in {name}.")));
        }
        let provided = args
            .names_map()
            .map_err(|e| StarfigError::interpreter(format!("Invalid arguments in {name}: {e}")))?;

        let mut evaluated = IndexMap::with_capacity(self.fields.len());
        for (field_name, field_descriptor) in &self.fields {
            let value = match provided.get(field_name.as_str()) {
                Some(value) => *value,
                None => {
                    if field_descriptor.is_required() {
                        return Err(StarfigError::interpreter(format!(
                            "Missing required field {field_name} in {name}."
                        )));
                    }
                    field_descriptor.default_value(eval.heap())
                }
            };
            let evaluated_value = field_descriptor
                .evaluate(eval, value)
                .map_err(|e| StarfigError::interpreter(format!("Invalid field {field_name} in {name}: {e}")))?;
            evaluated.insert(field_name.clone(), evaluated_value);
        }

        for key in provided.keys() {
            if !self.fields.contains_key(*key) {
                return Err(StarfigError::interpreter(format!("Unknown keyword {key} in {name}.")));
            }
        }

        let result_value = eval.heap().alloc(SchemaResult::new(self.clone(), evaluated));
        run_validations(eval, result_value, &self.validations)?;
        Ok(result_value)
    }
}

impl<'v> Descriptor<'v> for SchemaDescriptor<'v> {
    fn sku(&self) -> &str {
        &self.sku
    }

    /// Only reachable when a schema is nested (via `Object`) and the field
    /// carrying it is left unset; builds a result out of every field's own default.
    fn default_value(&self, heap: &'v Heap) -> Value<'v> {
        let evaluated = self
            .fields
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.default_value(heap)))
            .collect();
        heap.alloc(SchemaResult::new(self.clone(), evaluated))
    }

    fn is_required(&self) -> bool {
        false
    }

    /// Used when a schema descriptor is reached indirectly (through `List`/
    /// `Object`): `value` must already be a `SchemaResult` built by this exact
    /// schema, not a fresh instantiation. Identity is checked through the
    /// registry, not by raw SKU: the same `.star` file loaded more than once
    /// mints a fresh SKU per re-execution, so only the reconciled
    /// `(file, name)` behind each SKU can tell two schemas apart.
    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>> {
        let registry = &eval_context(eval).registry;
        let name = self.display_name(registry);
        let result = value
            .downcast_ref::<SchemaResult<'v>>()
            .ok_or_else(|| StarfigError::interpreter(format!("Expected {name} type but got {value}.")))?;
        if !registry.equal(&self.sku, result.schema_descriptor.sku()) {
            let provided = result.schema_descriptor.display_name(registry);
            return Err(StarfigError::interpreter(format!("Expected {name} but got {provided}.")));
        }
        Ok(value)
    }

    fn type_name(&self) -> &'static str {
        "SchemaDescriptor"
    }
}

#[starlark_module]
pub fn register(builder: &mut GlobalsBuilder) {
    /// Declares a schema: a named collection of fields, each a descriptor
    /// returned by one of the other six builtins.
    #[allow(non_snake_case)]
    fn Schema<'v>(
        #[starlark(require = named)] fields: Value<'v>,
        #[starlark(require = named)] validations: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let dict = DictRef::from_value(fields)
            .ok_or_else(|| StarfigError::interpreter(format!("Expected fields to be a dict but got {fields}.")))?;
        let mut field_map = IndexMap::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let field_name = key
                .unpack_str()
                .ok_or_else(|| StarfigError::interpreter(format!("Expected field name to be a string but got {key}.")))?
                .to_owned();
            let descriptor = value
                .downcast_ref::<DescriptorKind<'v>>()
                .ok_or_else(|| {
                    StarfigError::interpreter(format!(
                        "Expected field {field_name} to be a descriptor but got {value}."
                    ))
                })?
                .clone();
            field_map.insert(field_name, descriptor);
        }

        let validations = match validations {
            Some(v) => extract_validations(v, "Schema")?,
            None => Vec::new(),
        };

        let descriptor = SchemaDescriptor {
            sku: new_sku("schema"),
            fields: field_map,
            validations,
        };
        Ok(eval.heap().alloc(DescriptorKind::from(descriptor)))
    }
}

#[cfg(test)]
impl<'v> SchemaDescriptor<'v> {
    pub fn for_test() -> SchemaDescriptor<'static> {
        SchemaDescriptor {
            sku: new_sku("schema"),
            fields: IndexMap::new(),
            validations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlark::values::Heap;

    #[test]
    fn default_value_builds_result_from_field_defaults() {
        let heap = Heap::new();
        let descriptor = SchemaDescriptor::for_test();
        let value = descriptor.default_value(&heap);
        let result = value.downcast_ref::<SchemaResult<'_>>().unwrap();
        assert!(result.evaluated.is_empty());
    }
}
