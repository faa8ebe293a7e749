//! Property-based tests for safe_observability using proptest

use proptest::prelude::*;
use safe_observability::core::serializer::{
    nesting_depth, serialize_bounded, serialize_cycle_safe, CIRCULAR, TRUNCATED,
};
use safe_observability::prelude::*;
use safe_observability::DEFAULT_MAX_DEPTH;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Chain of `levels` containers alternating between maps and lists
fn nested(levels: usize) -> ContextValue {
    let mut value = ContextValue::from("leaf");
    for i in 0..levels {
        value = if i % 2 == 0 {
            ContextValue::map().with("next", value)
        } else {
            ContextValue::list().with_item(value)
        };
    }
    value
}

struct CountingSink {
    count: Arc<AtomicUsize>,
}

impl Sink for CountingSink {
    fn emit(&self, _entry: &LogEntry) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ============================================================================
// Level Filtering Tests
// ============================================================================

proptest! {
    /// A call dispatches exactly when it is an audit or ranks at or above
    /// the minimum level
    #[test]
    fn test_filtering_matches_rank(min in any_level(), requested in any_level()) {
        let count = Arc::new(AtomicUsize::new(0));
        let logger = Logger::builder("Props")
            .console_enabled(false)
            .min_level(min)
            .sink(CountingSink { count: Arc::clone(&count) })
            .build();

        logger.log(requested, "message", &[]);

        let expected = requested == LogLevel::Audit || requested.rank() >= min.rank();
        prop_assert_eq!(count.load(Ordering::SeqCst) == 1, expected);
        prop_assert_eq!(logger.can_log(requested), expected);
    }

    /// Level names parse regardless of case and surrounding whitespace
    #[test]
    fn test_level_names_parse_case_insensitively(level in any_level(), lower in any::<bool>()) {
        let name = if lower {
            level.to_str().to_lowercase()
        } else {
            level.to_str().to_string()
        };
        let parsed: LogLevel = format!("  {} ", name).parse().expect("known level");
        prop_assert_eq!(parsed, level);
    }

    /// Unknown names never map to a level and never log
    #[test]
    fn test_unknown_level_names_are_rejected(name in "[a-zA-Z]{1,10}") {
        let known = LogLevel::ALL
            .iter()
            .any(|level| level.to_str().eq_ignore_ascii_case(&name))
            || name.eq_ignore_ascii_case("warning");
        prop_assume!(!known);

        let logger = Logger::builder("Props").console_enabled(false).build();
        prop_assert!(name.parse::<LogLevel>().is_err());
        prop_assert!(!logger.can_log_str(&name));
        prop_assert!(logger.set_level_str(&name).is_err());
        prop_assert_eq!(logger.level(), LogLevel::Debug);
    }
}

// ============================================================================
// Serializer Tests
// ============================================================================

proptest! {
    /// Bounded output never nests deeper than the limit, and reaches it
    /// exactly when the input is deeper
    #[test]
    fn test_depth_bound(levels in 0usize..40, max_depth in 1usize..16) {
        let out = serialize_bounded(&nested(levels), max_depth);

        prop_assert_eq!(nesting_depth(&out), levels.min(max_depth));
        prop_assert_eq!(out.to_string().contains(TRUNCATED), levels >= max_depth && levels > 0);
    }

    /// Rings of any length terminate in both modes
    #[test]
    fn test_cycles_terminate(len in 1usize..8, max_depth in 1usize..12) {
        let nodes: Vec<ContextValue> = (0..len)
            .map(|i| ContextValue::map().with("index", i))
            .collect();
        for (i, node) in nodes.iter().enumerate() {
            node.insert("next", nodes[(i + 1) % len].clone());
        }

        let safe = serialize_cycle_safe(&nodes[0]);
        let bounded = serialize_bounded(&nodes[0], max_depth);

        for node in &nodes {
            node.insert("next", ContextValue::Null);
        }

        prop_assert!(safe.to_string().contains(CIRCULAR));
        prop_assert_eq!(nesting_depth(&safe), len);
        prop_assert!(nesting_depth(&bounded) <= max_depth);
    }

    /// Acyclic values pass through the cycle-safe walk unchanged
    #[test]
    fn test_tree_values_are_preserved(value in json_value()) {
        let context = ContextValue::from(value.clone());
        prop_assert_eq!(serialize_cycle_safe(&context), value);
    }

    /// A shallow tree is not altered by the default depth bound
    #[test]
    fn test_shallow_values_are_not_truncated(value in json_value()) {
        prop_assume!(nesting_depth(&value) <= DEFAULT_MAX_DEPTH);
        let context = ContextValue::from(value.clone());
        prop_assert_eq!(serialize_bounded(&context, DEFAULT_MAX_DEPTH), value);
    }
}

// ============================================================================
// Entry Tests
// ============================================================================

proptest! {
    /// The plain fallback line is always a single line
    #[test]
    fn test_plain_line_is_single_line(message in ".*", level in any_level()) {
        let entry = LogEntry::new("Props", level, message);
        let line = entry.plain_line();
        prop_assert!(!line.contains('\n'));
        prop_assert!(!line.contains('\r'));
        let prefix = format!("[{}][Props]", level);
        prop_assert!(line.starts_with(&prefix));
    }

    /// Records always encode to an object with exactly five keys
    #[test]
    fn test_record_shape(message in ".*", value in json_value()) {
        let entry = LogEntry::new("Props", LogLevel::Info, message.clone())
            .with_extra(ContextValue::from(value));
        let encoded = serde_json::to_value(entry.to_record(DEFAULT_MAX_DEPTH)).expect("encodable");

        let object = encoded.as_object().expect("object");
        prop_assert_eq!(object.len(), 5);
        prop_assert_eq!(&encoded["message"], &Value::from(message));
    }
}
