//! The descriptor object model (spec.md §3, §4.1).
//!
//! `DescriptorKind` is the tagged sum type over {Bool, Int, Float, String,
//! List, Object, Schema}; `Descriptor` is the trait every case implements.
//! This is a direct transplant of the teacher's `CombinedValidator` /
//! `Validator` split (`src/validators/mod.rs`): one `enum_dispatch` enum
//! carrying per-kind structs, one trait dispatched over it by macro rather
//! than hand-written `match`. The original Go tool expresses the same shape
//! with a `Descriptor` interface implemented by seven structs
//! (`internal/native/{bool,int,float,string,list,object,schema}.go`); each of
//! those files has a direct sibling here.

pub mod bool_;
pub mod float_;
pub mod int_;
pub mod list;
pub mod object;
pub mod schema;
pub mod string_;

use std::fmt;

use allocative::Allocative;
use enum_dispatch::enum_dispatch;
use starlark::environment::GlobalsBuilder;
use starlark::eval::{Arguments, Evaluator};
use starlark::values::{
    starlark_value, Heap, NoSerialize, ProvidesStaticType, StarlarkValue, Trace, Value, ValueLike,
};
use uuid::Uuid;

use crate::error::{StarfigError, StarfigResult};

pub use bool_::BoolDescriptor;
pub use float_::FloatDescriptor;
pub use int_::{value_as_bigint, IntDescriptor};
pub use list::ListDescriptor;
pub use object::ObjectDescriptor;
pub use schema::SchemaDescriptor;
pub use string_::StringDescriptor;

/// `starfig::descriptor:<kind>:<uuid>`, this descriptor's stable lookup key.
pub fn new_sku(kind: &str) -> String {
    format!("starfig::descriptor:{kind}:{}", Uuid::new_v4())
}

/// Operations every descriptor kind supports (spec.md §4.1).
#[enum_dispatch]
pub trait Descriptor<'v> {
    /// Stable, unique lookup key for this descriptor.
    fn sku(&self) -> &str;

    /// The zero value for this descriptor's kind.
    fn default_value(&self, heap: &'v Heap) -> Value<'v>;

    /// `false` for List and Schema; user-controlled for the rest.
    fn is_required(&self) -> bool;

    /// Type-check `value`, recurse into children, then run this descriptor's
    /// own validators in declaration order.
    fn evaluate(&self, eval: &mut Evaluator<'v, '_>, value: Value<'v>) -> StarfigResult<Value<'v>>;

    /// Human-readable name, e.g. `"BoolDescriptor"`, used in error messages
    /// and as this value's Starlark type tag.
    fn type_name(&self) -> &'static str;
}

/// The tagged sum type. Also the Starlark-visible value every builtin
/// (`Bool`, `Int`, ...) returns, and what `List`/`Object`/`Schema` hold as
/// their inner type(s).
#[derive(Debug, Clone, Trace, NoSerialize, Allocative, ProvidesStaticType)]
#[enum_dispatch(Descriptor<'v>)]
pub enum DescriptorKind<'v> {
    Bool(BoolDescriptor<'v>),
    Int(IntDescriptor<'v>),
    Float(FloatDescriptor<'v>),
    String(StringDescriptor<'v>),
    List(ListDescriptor<'v>),
    Object(ObjectDescriptor<'v>),
    Schema(SchemaDescriptor<'v>),
}

impl<'v> fmt::Display for DescriptorKind<'v> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.type_name(), self.sku())
    }
}

#[starlark_value(type = "Descriptor")]
impl<'v> StarlarkValue<'v> for DescriptorKind<'v> {
    type Canonical = Self;

    fn get_type_starlark_repr() -> starlark::typing::Ty {
        starlark::typing::Ty::any()
    }

    /// Only `Schema(...)` values are callable; calling them is instantiation
    /// (spec.md §4.2), not a type check.
    fn invoke(
        &self,
        _me: Value<'v>,
        args: &Arguments<'v, '_>,
        eval: &mut Evaluator<'v, '_>,
    ) -> anyhow::Result<Value<'v>> {
        match self {
            DescriptorKind::Schema(descriptor) => Ok(descriptor.instantiate(args, eval)?),
            other => Err(StarfigError::interpreter(format!("{} is not callable.", other.type_name())).into()),
        }
    }
}

/// Run a list of user-supplied validator callables against `value`, in
/// declaration order, short-circuiting on the first failure.
///
/// Mirrors `runValidations` in `internal/native/native.go`: a validator
/// passes by returning `None`; any other return value is the error message;
/// a raising validator's error propagates as-is.
pub fn run_validations<'v>(
    eval: &mut Evaluator<'v, '_>,
    value: Value<'v>,
    validations: &[Value<'v>],
) -> StarfigResult<()> {
    for validation in validations {
        let result = validation
            .invoke_pos(&[value], eval)
            .map_err(StarfigError::interpreter)?;
        if !result.is_none() {
            return Err(StarfigError::interpreter(result.to_str()));
        }
    }
    Ok(())
}

/// Extract an ordered list of validator callables out of the `validations=`
/// keyword argument. Mirrors `extractValidations`.
pub fn extract_validations<'v>(value: Value<'v>, builtin_name: &str) -> StarfigResult<Vec<Value<'v>>> {
    let list = starlark::values::list::ListRef::from_value(value).ok_or_else(|| {
        StarfigError::interpreter(format!(
            "Expected validations value to be a list of functions, but got {value} in {builtin_name}()."
        ))
    })?;
    let mut items = Vec::with_capacity(list.len());
    for item in list.iter() {
        if !is_callable(item) {
            return Err(StarfigError::interpreter(format!(
                "Expected validation to be a function, but got {item} in {builtin_name}()."
            )));
        }
        items.push(item);
    }
    Ok(items)
}

/// Best-effort "is this value invocable" check, used only to fail fast with a
/// precise message at schema-definition time; `invoke_pos` is the real check.
fn is_callable(value: Value<'_>) -> bool {
    matches!(value.get_type(), "function" | "native_function")
}

/// Registers the seven predeclared builtins (`Bool`, `Int`, `Float`,
/// `String`, `List`, `Object`, `Schema`) into a `GlobalsBuilder`. This is the
/// Rust analog of `native.go`'s `Predeclared` map.
pub fn register_globals(builder: &mut GlobalsBuilder) {
    bool_::register(builder);
    int_::register(builder);
    float_::register(builder);
    string_::register(builder);
    list::register(builder);
    object::register(builder);
    schema::register(builder);
}
