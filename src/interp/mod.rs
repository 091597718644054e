//! Wiring between the hosted Starlark interpreter and this crate's own state.
//!
//! spec.md §5 asks for exactly two pieces of thread-local state reachable
//! from any builtin: the workspace root and the active schema registry.
//! starlark-rust's analogous mechanism is `Evaluator::extra`, a slot every
//! `#[starlark_module]` function can reach through its `eval: &mut Evaluator`
//! parameter; `EvalContext` is what we put there. It carries no heap-bound
//! data (see `context.rs` for why), so it's a plain `'static` value and needs
//! no special downcasting machinery beyond `std::any::Any`.

use std::path::PathBuf;
use std::rc::Rc;

use starlark::environment::{Globals, GlobalsBuilder};
use starlark::eval::Evaluator;

use crate::context::SchemaRegistry;
use crate::descriptor;

/// Installed into `Evaluator::extra` for every module evaluated while
/// building one target. `registry` is shared (via `Rc`) across the outermost
/// `STARFIG` file and every `.star` file it transitively `load()`s, so
/// schema identity reconciles across the whole build; `workspace_root` is
/// the same for all of them by construction.
pub struct EvalContext {
    pub workspace_root: PathBuf,
    pub registry: Rc<SchemaRegistry>,
}

impl EvalContext {
    pub fn new(workspace_root: PathBuf, registry: Rc<SchemaRegistry>) -> Self {
        Self {
            workspace_root,
            registry,
        }
    }
}

/// Recover the `EvalContext` installed for this evaluation. Panics if none
/// was installed, which would be a bug in `loader`/`evaluator`, not a user error.
pub fn eval_context<'v, 'a>(eval: &Evaluator<'v, 'a>) -> &'a EvalContext {
    eval.extra
        .expect("EvalContext must be installed before evaluation starts")
        .downcast_ref::<EvalContext>()
        .expect("Evaluator::extra held something other than an EvalContext")
}

/// The seven predeclared builtins, bundled as the `Globals` every module
/// (`.star` or `STARFIG`) is evaluated against.
pub fn globals() -> Globals {
    GlobalsBuilder::new().with(descriptor::register_globals).build()
}
