//! Safe serialization of context payloads
//!
//! Two strategies turn an arbitrary [`ContextValue`] graph into a finite
//! `serde_json::Value`:
//!
//! - **Cycle-safe**: tracks every container identity visited during the call
//!   and replaces a revisit with `"[Circular]"`. Depth is not limited.
//! - **Depth-bounded**: walks at most `max_depth` container levels; a
//!   non-empty container at the last level collapses to a sentinel.
//!
//! Both are total. Any fault while walking is caught and reported as
//! `"[Circular or unprunable object]"` in place of the whole value.

use super::context_value::ContextValue;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

/// Default depth budget for depth-bounded serialization
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Replaces a container that was already visited
pub const CIRCULAR: &str = "[Circular]";

/// Replaces the contents of a container cut off by the depth budget
pub const TRUNCATED: &str = "[Truncated]";

/// Replaces a container whose lock is held exclusively elsewhere
pub const LOCKED: &str = "[Locked]";

/// Last-resort output when serialization itself fails
pub const UNPRUNABLE: &str = "[Circular or unprunable object]";

/// Hard recursion ceiling for both walks; keeps the stack bounded whatever
/// depth budget the caller asks for
const MAX_WALK_DEPTH: usize = 256;

/// Serialization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeMode {
    CycleSafe,
    DepthBounded(usize),
}

/// A configured serializer, handy where the strategy is chosen at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeSerializer {
    mode: SerializeMode,
}

impl SafeSerializer {
    pub const fn cycle_safe() -> Self {
        Self {
            mode: SerializeMode::CycleSafe,
        }
    }

    pub const fn depth_bounded(max_depth: usize) -> Self {
        Self {
            mode: SerializeMode::DepthBounded(max_depth),
        }
    }

    pub fn mode(&self) -> SerializeMode {
        self.mode
    }

    pub fn serialize(&self, value: &ContextValue) -> Value {
        match self.mode {
            SerializeMode::CycleSafe => serialize_cycle_safe(value),
            SerializeMode::DepthBounded(max_depth) => serialize_bounded(value, max_depth),
        }
    }
}

impl Default for SafeSerializer {
    fn default() -> Self {
        Self::depth_bounded(DEFAULT_MAX_DEPTH)
    }
}

/// Serialize with cycle detection and no depth limit.
pub fn serialize_cycle_safe(value: &ContextValue) -> Value {
    guarded(|| {
        let mut seen = HashSet::new();
        walk_cycle_safe(value, &mut seen, 0).unwrap_or(Value::Null)
    })
}

/// Serialize at most `max_depth` container levels deep.
///
/// `max_depth` of zero is treated as one, and budgets above the internal
/// walk ceiling are clamped to it.
pub fn serialize_bounded(value: &ContextValue, max_depth: usize) -> Value {
    let budget = max_depth.clamp(1, MAX_WALK_DEPTH);
    guarded(|| walk_bounded(value, budget).unwrap_or(Value::Null))
}

/// Maximum container nesting of a JSON value; scalars are depth zero.
pub fn nesting_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(nesting_depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(nesting_depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn guarded(walk: impl FnOnce() -> Value) -> Value {
    panic::catch_unwind(AssertUnwindSafe(walk))
        .unwrap_or_else(|_| Value::String(UNPRUNABLE.to_string()))
}

fn sentinel(text: &str) -> Value {
    Value::String(text.to_string())
}

/// Scalar conversion. `None` means undefined: the caller drops it from maps
/// and renders it as `null` everywhere else.
fn scalar(value: &ContextValue) -> Option<Value> {
    match value {
        ContextValue::Undefined => None,
        ContextValue::Null => Some(Value::Null),
        ContextValue::Bool(b) => Some(Value::Bool(*b)),
        ContextValue::Int(i) => Some(Value::Number((*i).into())),
        ContextValue::Float(f) => Some(Number::from_f64(*f).map_or(Value::Null, Value::Number)),
        ContextValue::String(s) => Some(Value::String(s.clone())),
        ContextValue::List(_) | ContextValue::Map(_) => Some(sentinel(UNPRUNABLE)),
    }
}

fn walk_cycle_safe(value: &ContextValue, seen: &mut HashSet<usize>, level: usize) -> Option<Value> {
    if let Some(id) = value.identity() {
        if !seen.insert(id) {
            return Some(sentinel(CIRCULAR));
        }
        if level >= MAX_WALK_DEPTH {
            return Some(sentinel(UNPRUNABLE));
        }
    }

    match value {
        ContextValue::List(items) => {
            let Some(items) = items.try_read_recursive() else {
                return Some(sentinel(LOCKED));
            };
            let out = items
                .iter()
                .map(|item| walk_cycle_safe(item, seen, level + 1).unwrap_or(Value::Null))
                .collect();
            Some(Value::Array(out))
        }
        ContextValue::Map(entries) => {
            let Some(entries) = entries.try_read_recursive() else {
                return Some(sentinel(LOCKED));
            };
            let mut out = Map::new();
            for (key, item) in entries.iter() {
                if let Some(v) = walk_cycle_safe(item, seen, level + 1) {
                    out.insert(key.clone(), v);
                }
            }
            Some(Value::Object(out))
        }
        scalar_value => scalar(scalar_value),
    }
}

fn walk_bounded(value: &ContextValue, remaining: usize) -> Option<Value> {
    match value {
        ContextValue::List(items) => {
            let Some(items) = items.try_read_recursive() else {
                return Some(sentinel(LOCKED));
            };
            if items.is_empty() {
                return Some(Value::Array(Vec::new()));
            }
            if remaining <= 1 {
                return Some(Value::Array(vec![sentinel(TRUNCATED)]));
            }
            let out = items
                .iter()
                .map(|item| walk_bounded(item, remaining - 1).unwrap_or(Value::Null))
                .collect();
            Some(Value::Array(out))
        }
        ContextValue::Map(entries) => {
            let Some(entries) = entries.try_read_recursive() else {
                return Some(sentinel(LOCKED));
            };
            if entries.is_empty() {
                return Some(Value::Object(Map::new()));
            }
            let mut out = Map::new();
            if remaining <= 1 {
                out.insert(TRUNCATED.to_string(), sentinel(TRUNCATED));
                return Some(Value::Object(out));
            }
            for (key, item) in entries.iter() {
                if let Some(v) = walk_bounded(item, remaining - 1) {
                    out.insert(key.clone(), v);
                }
            }
            Some(Value::Object(out))
        }
        scalar_value => scalar(scalar_value),
    }
}
