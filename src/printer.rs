//! Deterministic, recursive textualization of evaluated config values
//! (spec.md §6). Grounded on `command/build.go`'s `value2json`: every
//! scalar renders literally, sequences and mappings recurse in the order
//! their elements/keys were produced, and a `SchemaResult` renders as the
//! mapping of its own evaluated fields (which is what actually lets a build
//! target's output nest arbitrarily deep through `Object`/`List`).

use starlark::values::dict::DictRef;
use starlark::values::list::ListRef;
use starlark::values::{Value, ValueLike};

use crate::descriptor::value_as_bigint;
use crate::result::SchemaResult;

pub fn format_value(value: Value<'_>) -> String {
    if let Some(b) = value.unpack_bool() {
        return b.to_string();
    }
    if let Some(result) = value.downcast_ref::<SchemaResult<'_>>() {
        let entries: Vec<String> = result
            .evaluated
            .iter()
            .map(|(k, v)| format!("{}: {}", format_string(k), format_value(*v)))
            .collect();
        return format!("{{{}}}", entries.join(", "));
    }
    if let Some(dict) = DictRef::from_value(value) {
        let entries: Vec<String> = dict
            .iter()
            .map(|(k, v)| format!("{}: {}", format_value(k), format_value(v)))
            .collect();
        return format!("{{{}}}", entries.join(", "));
    }
    if let Some(list) = ListRef::from_value(value) {
        let entries: Vec<String> = list.iter().map(format_value).collect();
        return format!("[{}]", entries.join(", "));
    }
    if let Some(n) = value_as_bigint(value) {
        return n.to_string();
    }
    if let Some(f) = value.unpack_f64() {
        return format_float(f);
    }
    if let Some(s) = value.unpack_str() {
        return format_string(s);
    }
    value.to_string()
}

fn format_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlark::values::Heap;

    #[test]
    fn renders_scalars() {
        let heap = Heap::new();
        assert_eq!(format_value(heap.alloc(true)), "true");
        assert_eq!(format_value(heap.alloc(3.5)), "3.5");
        assert_eq!(format_value(heap.alloc(3.0)), "3.0");
        assert_eq!(format_value(heap.alloc("hi")), "\"hi\"");
    }

    #[test]
    fn renders_nested_sequences() {
        use starlark::values::list::AllocList;
        let heap = Heap::new();
        let list = heap.alloc(AllocList(vec![heap.alloc(1), heap.alloc(2)]));
        assert_eq!(format_value(list), "[1, 2]");
    }
}
