//! Evaluates one `//pkg:target` build target end to end (spec.md §4.5).
//!
//! Grounded on `internal/evaluator/evaluator.go`: the target's `STARFIG`
//! file is evaluated directly, the same way the original reaches it via
//! `starlark.ExecFile` rather than its `LoadProvider` — so, unlike every
//! `.star`/`STARFIG` file reached through `load()`, it is never subject to
//! file-role enforcement. Non-`SchemaResult` top-level bindings are simply
//! not what this module is looking for: a `//pkg:...` spread target skips
//! them, and a specific `//pkg:target_name` target only errors if the name
//! it was asked for turns out to be one of them.

use std::rc::Rc;

use starlark::values::ValueLike;

use crate::context::SchemaRegistry;
use crate::error::{StarfigError, StarfigResult};
use crate::interp;
use crate::label::{BuildTarget, FileTarget, STARFIG_FILENAME};
use crate::loader;
use crate::printer;
use crate::result::SchemaResult;

/// One resolved `name = <config value>` pair pulled out of a `STARFIG` file.
pub struct Evaluated {
    pub name: String,
    pub rendered: String,
}

/// Evaluate `target`'s `STARFIG` file and return every binding it asks for:
/// all of them for a `//pkg:...` spread target, or just the one named by a
/// specific `//pkg:target_name` target.
pub fn evaluate_build_target(target: &BuildTarget) -> StarfigResult<Vec<Evaluated>> {
    let globals = interp::globals();
    let registry = Rc::new(SchemaRegistry::new());
    let file_target = FileTarget {
        starverse_dir: target.starverse_dir.clone(),
        package: target.package.clone(),
        filename: STARFIG_FILENAME.to_string(),
    };

    let frozen = loader::evaluate_build_target_module(&file_target, &globals, registry)?;

    if target.is_spread() {
        let mut evaluated = Vec::new();
        for name in frozen.names() {
            let name = name.as_str();
            if name.starts_with('_') {
                continue;
            }
            let owned = frozen.get(name).ok_or_else(|| StarfigError::TargetNotFound(name.to_string()))?;
            let value = owned.value().to_value();
            if value.downcast_ref::<SchemaResult<'_>>().is_none() {
                continue;
            }
            evaluated.push(Evaluated {
                name: name.to_string(),
                rendered: printer::format_value(value),
            });
        }
        evaluated.sort_by(|a, b| a.name.cmp(&b.name));
        return Ok(evaluated);
    }

    let label = target.label();
    let owned = frozen
        .get(&target.target_name)
        .ok_or_else(|| StarfigError::TargetNotFound(label.clone()))?;
    let value = owned.value().to_value();
    if value.downcast_ref::<SchemaResult<'_>>().is_none() {
        return Err(StarfigError::TargetNotAResult(label));
    }

    Ok(vec![Evaluated {
        name: target.target_name.clone(),
        rendered: printer::format_value(value),
    }])
}
