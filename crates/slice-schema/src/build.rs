//! # Slice Compiler
//!
//! Lowers a [`SliceSchema`] into engine validators by exhaustive dispatch
//! on its variant:
//!
//! | Slice | Validator |
//! |-------|-----------|
//! | text `k` | `object { k: string }` |
//! | data `k`, `s` | `object { k: s }` |
//! | array `k`, `c` | `object { k: array(build(c)) }` |
//! | object `k`, `cs` | `object { k: merge(build(cs)) }` |
//! | multi `m`, `os` | `merge(build(m), build(os)..)` |
//!
//! A multi slice has no key of its own, so its fields land directly in the
//! enclosing object instead of under a nested field.
//!
//! ## Key Collisions
//!
//! Sibling slices that contribute the same field key are kept as they are.
//! Both validators end up in the same intersection, so a value must satisfy
//! both. A `tracing` warning names the key.

use slice_core::{DataSlice, MultiMain, NonEmpty, SliceSchema, TextSlice};

use crate::engine::ValidationEngine;
use crate::json::{JsonSchemaEngine, Schema};

/// Compile `slice` into a validator built by `engine`.
///
/// Infallible and pure: compiling the same tree twice yields equivalent
/// validators. The recursion depth equals [`SliceSchema::depth`].
pub fn build_schema<E>(engine: &E, slice: &SliceSchema<E::Validator>) -> E::Validator
where
    E: ValidationEngine,
{
    tracing::trace!(kind = %slice.kind(), key = ?slice.key(), "lowering slice");

    match slice {
        SliceSchema::Text(text) => from_text(engine, text),
        SliceSchema::Data(data) => from_data(engine, data),
        SliceSchema::Array(array) => {
            let element = build_schema(engine, array.child());
            engine.object(vec![(array.key().to_string(), engine.array(element))])
        }
        SliceSchema::Object(object) => {
            warn_on_collisions(object.key(), &slice.duplicate_field_keys());

            let merged = merge(
                engine,
                object
                    .children()
                    .iter()
                    .map(|child| build_schema(engine, child))
                    .collect(),
            );
            engine.object(vec![(object.key().to_string(), merged)])
        }
        SliceSchema::Multi(multi) => {
            warn_on_collisions(multi.main().key(), &slice.duplicate_field_keys());

            let main = match multi.main() {
                MultiMain::Text(text) => from_text(engine, text),
                MultiMain::Data(data) => from_data(engine, data),
            };
            let fields = std::iter::once(main)
                .chain(multi.others().iter().map(|data| from_data(engine, data)))
                .collect();
            merge(engine, fields)
        }
    }
}

/// Compile `slice` into a JSON Schema document.
pub fn build_json_schema(slice: &SliceSchema<Schema>) -> Schema {
    build_schema(&JsonSchemaEngine, slice)
}

/// Combine validators into one.
///
/// - none: the engine's `never` validator. `build_schema` cannot reach this
///   case because object children and multi fields are `NonEmpty`; it is
///   kept so the function is total over any input.
/// - one: returned as is, with no intersection wrapper.
/// - two or more: the engine's intersection, in the given order.
pub fn merge<E>(engine: &E, validators: Vec<E::Validator>) -> E::Validator
where
    E: ValidationEngine,
{
    let mut iter = validators.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => engine.never(),
        (Some(only), None) => only,
        (Some(first), Some(second)) => {
            let rest = std::iter::once(second).chain(iter).collect();
            engine.all_of(NonEmpty::from_parts(first, rest))
        }
    }
}

fn from_text<E: ValidationEngine>(engine: &E, text: &TextSlice) -> E::Validator {
    engine.object(vec![(text.key().to_string(), engine.string())])
}

fn from_data<E: ValidationEngine>(engine: &E, data: &DataSlice<E::Validator>) -> E::Validator {
    engine.object(vec![(data.key().to_string(), data.schema().clone())])
}

fn warn_on_collisions(parent: &str, duplicates: &[&str]) {
    for &key in duplicates {
        tracing::warn!(
            parent,
            key,
            "sibling slices share a field key; a value must satisfy every one of them"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use slice_core::{
        array_slice, data_multi_slice, data_slice, nonempty, object_slice, text_multi_slice,
        text_slice,
    };

    #[test]
    fn test_text_lowers_to_string_field() {
        let schema = build_json_schema(&text_slice("title"));
        assert_eq!(schema, Schema::object([("title", Schema::string())]));
    }

    #[test]
    fn test_data_uses_schema_verbatim() {
        let inner = Schema::from_value(json!({ "type": "integer", "minimum": 0 }));
        let schema = build_json_schema(&data_slice("count", inner.clone()));
        assert_eq!(schema, Schema::object([("count", inner)]));
    }

    #[test]
    fn test_array_wraps_child_as_items() {
        let schema = build_json_schema(&array_slice("tags", text_slice("tag")));
        let expected = Schema::object([(
            "tags",
            Schema::array(Schema::object([("tag", Schema::string())])),
        )]);
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_single_child_object_is_unwrapped() {
        let schema = build_json_schema(&object_slice("meta", nonempty![text_slice("author")]));
        let expected = Schema::object([("meta", Schema::object([("author", Schema::string())]))]);
        assert_eq!(schema, expected);
        assert!(!schema.to_string().contains("allOf"));
    }

    #[test]
    fn test_multi_child_object_intersects_in_order() {
        let schema = build_json_schema(&object_slice(
            "k",
            nonempty![text_slice("a"), data_slice("b", Schema::number())],
        ));
        let expected = Schema::object([(
            "k",
            Schema::all_of(nonempty![
                Schema::object([("a", Schema::string())]),
                Schema::object([("b", Schema::number())]),
            ]),
        )]);
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_multi_has_no_wrapper_key() {
        let schema = build_json_schema(&text_multi_slice(
            "title",
            nonempty![("subtitle", Schema::string())],
        ));
        let expected = Schema::all_of(nonempty![
            Schema::object([("title", Schema::string())]),
            Schema::object([("subtitle", Schema::string())]),
        ]);
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_data_multi_main_uses_data_rule() {
        let schema = build_json_schema(&data_multi_slice(
            "price",
            Schema::number(),
            nonempty![("currency", Schema::string()), ("note", Schema::any())],
        ));
        let branches = schema.as_value()["allOf"].as_array().unwrap();
        assert_eq!(branches.len(), 3);
        assert_eq!(
            branches[0],
            Schema::object([("price", Schema::number())]).into_value()
        );
        assert_eq!(
            branches[2],
            Schema::object([("note", Schema::any())]).into_value()
        );
    }

    #[test]
    fn test_multi_inside_object_splices_fields() {
        let schema = build_json_schema(&object_slice(
            "hero",
            nonempty![text_multi_slice(
                "title",
                nonempty![("subtitle", Schema::string())]
            )],
        ));
        // One child: the multi intersection sits directly under `hero`.
        let hero = &schema.as_value()["properties"]["hero"];
        assert!(hero.get("allOf").is_some());
        assert!(hero["allOf"][0]["properties"].get("title").is_some());
    }

    #[test]
    fn test_merge_empty_is_never() {
        assert_eq!(merge(&JsonSchemaEngine, Vec::new()), Schema::never());
    }

    #[test]
    fn test_merge_one_is_identity() {
        assert_eq!(
            merge(&JsonSchemaEngine, vec![Schema::boolean()]),
            Schema::boolean()
        );
    }

    #[test]
    fn test_merge_many_is_all_of() {
        let merged = merge(
            &JsonSchemaEngine,
            vec![Schema::string(), Schema::number(), Schema::null()],
        );
        assert_eq!(
            merged,
            Schema::all_of(nonempty![Schema::string(), Schema::number(), Schema::null()])
        );
    }

    /// Collects the `key` field of every WARN event.
    struct WarnedKeys(Arc<Mutex<Vec<String>>>);

    struct KeyVisitor<'a>(&'a mut Option<String>);

    impl Visit for KeyVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "key" {
                *self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> Layer<S> for WarnedKeys {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::WARN {
                return;
            }
            let mut key = None;
            event.record(&mut KeyVisitor(&mut key));
            if let Some(key) = key {
                self.0.lock().unwrap().push(key);
            }
        }
    }

    fn warned_keys_while_building(slice: &SliceSchema<Schema>) -> Vec<String> {
        let warned = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(WarnedKeys(Arc::clone(&warned)));
        tracing::subscriber::with_default(subscriber, || {
            build_json_schema(slice);
        });
        let mut keys = Vec::new();
        keys.extend(warned.lock().unwrap().iter().cloned());
        keys
    }

    #[test]
    fn test_object_collision_emits_warning_per_key() {
        let slice = object_slice(
            "k",
            nonempty![
                data_slice("x", Schema::string()),
                text_multi_slice("y", nonempty![("x", Schema::string())]),
                text_slice("y"),
            ],
        );
        assert_eq!(warned_keys_while_building(&slice), vec!["x", "y"]);
    }

    #[test]
    fn test_multi_collision_emits_warning() {
        let slice = text_multi_slice("a", nonempty![("a", Schema::number())]);
        assert_eq!(warned_keys_while_building(&slice), vec!["a"]);
    }

    #[test]
    fn test_distinct_keys_emit_no_warning() {
        let slice = object_slice(
            "k",
            nonempty![
                text_slice("a"),
                array_slice("b", object_slice("c", nonempty![text_slice("a")])),
            ],
        );
        assert!(warned_keys_while_building(&slice).is_empty());
    }

    #[test]
    fn test_colliding_children_are_all_kept() {
        let schema = build_json_schema(&object_slice(
            "k",
            nonempty![data_slice("x", Schema::string()), data_slice("x", Schema::integer())],
        ));
        let branches = schema.as_value()["properties"]["k"]["allOf"]
            .as_array()
            .unwrap();
        assert_eq!(branches.len(), 2);
    }
}
