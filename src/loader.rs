//! Module loading: resolves `load()` labels, enforces the `.star` vs
//! `STARFIG` file-role rules, and reconciles schema bindings into the shared
//! registry (spec.md §4.3-§4.4). Grounded on `internal/native/load.go`.

use std::fs;
use std::rc::Rc;

use starlark::environment::{FrozenModule, Globals, Module};
use starlark::eval::{Evaluator, FileLoader};
use starlark::syntax::{AstModule, Dialect};
use starlark::values::ValueLike;

use crate::context::SchemaRegistry;
use crate::descriptor::DescriptorKind;
use crate::error::{StarfigError, StarfigResult};
use crate::interp::EvalContext;
use crate::label::{self, FileTarget};
use crate::result::SchemaResult;

/// Bridges starlark-rust's `load()` statement to our own label grammar and
/// role rules. A new one is built for every `load()` call (they're cheap:
/// just a path and two `Rc`/reference handles), so recursive loads each get
/// their own loader wired to the same shared `workspace_root`/`registry`.
pub struct ModuleLoader {
    pub starverse_dir: std::path::PathBuf,
    pub globals: Globals,
    pub registry: Rc<SchemaRegistry>,
}

impl FileLoader for ModuleLoader {
    fn load(&self, path: &str) -> anyhow::Result<FrozenModule> {
        let target = label::parse_file_target(&self.starverse_dir, path)?;
        if !target.is_star_file() && !target.is_starfig_file() {
            return Err(StarfigError::LoadDisallowedRole(target.label()).into());
        }
        Ok(evaluate_loaded_module(&target, &self.globals, Rc::clone(&self.registry))?)
    }
}

/// Evaluate a `load()`ed module (`.star` or `STARFIG`) from disk and enforce
/// its file-role rules against its own top-level bindings. Every module
/// reached through `load()` goes through this path, recursively, via its own
/// nested `ModuleLoader`.
pub fn evaluate_loaded_module(target: &FileTarget, globals: &Globals, registry: Rc<SchemaRegistry>) -> StarfigResult<FrozenModule> {
    let module = eval_module(target, globals, &registry)?;
    enforce_file_role(&module, target, &registry)?;
    module.freeze().map_err(StarfigError::interpreter)
}

/// Evaluate the `STARFIG` file named directly by a build target. The
/// original's evaluator reaches the build target's `STARFIG` via
/// `starlark.ExecFile`, never through the `load()`/`LoadProvider` path, so
/// file-role enforcement (which would reject any non-`SchemaResult` top-level
/// binding) never applies here; the evaluator decides on its own which
/// bindings it cares about.
pub fn evaluate_build_target_module(target: &FileTarget, globals: &Globals, registry: Rc<SchemaRegistry>) -> StarfigResult<FrozenModule> {
    let module = eval_module(target, globals, &registry)?;
    module.freeze().map_err(StarfigError::interpreter)
}

fn eval_module(target: &FileTarget, globals: &Globals, registry: &Rc<SchemaRegistry>) -> StarfigResult<Module> {
    let path = target.path();
    let content = fs::read_to_string(&path)?;
    let ast = AstModule::parse(&path.to_string_lossy(), content, &Dialect::Standard)
        .map_err(StarfigError::interpreter)?;

    let module = Module::new();
    let ctx = EvalContext::new(target.starverse_dir.clone(), Rc::clone(registry));
    let nested_loader = ModuleLoader {
        starverse_dir: target.starverse_dir.clone(),
        globals: globals.clone(),
        registry: Rc::clone(registry),
    };
    {
        let mut eval = Evaluator::new(&module);
        eval.extra = Some(&ctx);
        eval.set_loader(&nested_loader);
        eval.eval_module(ast, globals)
            .map_err(|e| StarfigError::interpreter(describe_eval_error(&e, target)))?;
    }
    Ok(module)
}

fn enforce_file_role(module: &Module, target: &FileTarget, registry: &SchemaRegistry) -> StarfigResult<()> {
    for name in module.names() {
        let name = name.as_str();
        if name.starts_with('_') {
            continue;
        }
        let Some(value) = module.get(name) else {
            continue;
        };

        if target.is_star_file() {
            if value.downcast_ref::<SchemaResult<'_>>().is_some() {
                return Err(StarfigError::SchemaInstantiatedInStarFile);
            }
            if let Some(DescriptorKind::Schema(schema)) = value.downcast_ref::<DescriptorKind<'_>>() {
                registry.reconcile(schema.sku(), name, target.clone());
            }
        } else {
            debug_assert!(target.is_starfig_file());
            if value.downcast_ref::<SchemaResult<'_>>().is_none() {
                return Err(StarfigError::NonResultInStarfig);
            }
        }
    }
    Ok(())
}

/// Surface an evaluation failure as `<path>:<line>: <message>`, using the
/// innermost call-stack frame whose file isn't `<builtin>` (mirrors
/// `evaluator.go`'s loop over `evalErr.CallStack`, which keeps overwriting
/// its file/line until the last non-builtin frame wins). Falls back to the
/// target's own label when the error carries no usable frame.
fn describe_eval_error(err: &starlark::Error, target: &FileTarget) -> String {
    let message = err.to_string();
    for frame in err.call_stack().frames().iter().rev() {
        if let Some(location) = &frame.location {
            if location.filename() != "<builtin>" {
                return format!("{}:{}: {message}", location.filename(), location.begin_line() + 1);
            }
        }
    }
    format!("{}: {message}", target.label())
}
