//! The schema context manager (spec.md §4.6).
//!
//! Grounded on the teacher's `DefinitionsBuilder` (`src/definitions.rs`):
//! both exist to recover cross-reference identity after a value is built
//! more than once from the same source — pydantic's `$ref`/definitions cycle
//! there, this crate's "the same `Schema(...)` call site, re-executed by a
//! re-`load`ed module" here.
//!
//! A fresh Starlark heap backs every module evaluation, and `.star` modules
//! are never cached: loading the same file twice runs `Schema(...)` twice and
//! mints two different SKUs for what the user clearly intends as one schema.
//! Rather than keep the heap-bound descriptor itself alive past its
//! originating module (which would tie this registry to a single heap
//! lifetime and make it useless across `load()` boundaries), we record only
//! the lifetime-independent half of a descriptor's identity: which file
//! defined it and what name it was bound to. Two descriptors reconcile to
//! the same identity iff those match, regardless of which re-execution
//! minted their SKU.
use std::cell::RefCell;

use ahash::AHashMap;

use crate::label::FileTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReconciledSchema {
    schema_name: String,
    file_target: FileTarget,
}

/// Shared for the whole evaluation of one build target: installed once by
/// `evaluator::evaluate_build_target` and threaded by reference into every
/// `EvalContext`, including the ones backing recursively `load()`ed modules.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    reconciled: RefCell<AHashMap<String, ReconciledSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the loader for each top-level binding whose value is a
    /// schema-builder descriptor: pins the descriptor's SKU to the name it
    /// was bound to and the file that defined it.
    pub fn reconcile(&self, sku: &str, schema_name: &str, file_target: FileTarget) {
        self.reconciled.borrow_mut().insert(
            sku.to_string(),
            ReconciledSchema {
                schema_name: schema_name.to_string(),
                file_target,
            },
        );
    }

    /// The reconciled user-visible name for a SKU, if any binding has claimed it yet.
    pub fn display_name(&self, sku: &str) -> Option<String> {
        self.reconciled.borrow().get(sku).map(|r| r.schema_name.clone())
    }

    /// Two SKUs denote the same schema iff both have reconciled to the same
    /// `(file, name)` pair. Unreconciled SKUs are never considered equal,
    /// even to themselves, matching the "only bound schemas have identity" rule.
    pub fn equal(&self, sku_a: &str, sku_b: &str) -> bool {
        let map = self.reconciled.borrow();
        match (map.get(sku_a), map.get(sku_b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file_target(name: &str) -> FileTarget {
        FileTarget {
            starverse_dir: PathBuf::from("/ws"),
            package: "fruit".to_string(),
            filename: name.to_string(),
        }
    }

    #[test]
    fn reconciled_sku_reports_its_name() {
        let registry = SchemaRegistry::new();
        registry.reconcile("sku-1", "Color", file_target("fruit.star"));
        assert_eq!(registry.display_name("sku-1").as_deref(), Some("Color"));
    }

    #[test]
    fn unreconciled_sku_has_no_name() {
        let registry = SchemaRegistry::new();
        assert_eq!(registry.display_name("sku-1"), None);
    }

    #[test]
    fn equal_requires_same_file_and_name_not_same_sku() {
        let registry = SchemaRegistry::new();
        registry.reconcile("sku-1", "Color", file_target("fruit.star"));
        registry.reconcile("sku-2", "Color", file_target("fruit.star"));
        assert!(registry.equal("sku-1", "sku-2"));

        registry.reconcile("sku-3", "Hue", file_target("fruit.star"));
        assert!(!registry.equal("sku-1", "sku-3"));
        assert!(!registry.equal("sku-1", "unknown-sku"));
    }
}
