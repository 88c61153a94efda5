//! # Slice Descriptors
//!
//! Defines `SliceSchema<S>`, the closed set of slice shapes, and the
//! constructor functions that assemble each variant. `S` is the validator
//! type of whatever engine the descriptor is compiled against; the
//! descriptor model only stores it, never inspects it.
//!
//! ## Invariants
//!
//! - Object children and multi-slice auxiliary fields are `NonEmpty`.
//! - Payload fields are private. A descriptor cannot be modified once it
//!   has been built, only read through accessors or moved into a parent.
//! - Keys are stored as given. Sibling key collisions are not rejected here.

use std::collections::HashSet;
use std::fmt;

use crate::nonempty::NonEmpty;

/// The discriminant of a [`SliceSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceKind {
    /// A string field.
    Text,
    /// A field checked by a caller-supplied validator.
    Data,
    /// One main field plus auxiliary sibling fields, with no key of its own.
    Multi,
    /// A field holding a sequence of sub-slices.
    Array,
    /// A field holding the intersection of several sub-slices.
    Object,
}

impl SliceKind {
    /// Lowercase tag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Data => "data",
            Self::Multi => "multi",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for SliceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string field named `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSlice {
    key: String,
}

impl TextSlice {
    /// Field name of the string.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A field named `key` checked by an engine validator.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSlice<S> {
    key: String,
    schema: S,
}

impl<S> DataSlice<S> {
    /// Field name the validator applies to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The caller-supplied validator, used verbatim by the compiler.
    pub fn schema(&self) -> &S {
        &self.schema
    }
}

/// The primary field of a multi slice. Only flat fields are allowed here.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiMain<S> {
    Text(TextSlice),
    Data(DataSlice<S>),
}

impl<S> MultiMain<S> {
    /// Field name of the main field.
    pub fn key(&self) -> &str {
        match self {
            Self::Text(text) => text.key(),
            Self::Data(data) => data.key(),
        }
    }
}

/// A main field plus one or more auxiliary fields, all placed side by side
/// in the enclosing object.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSlice<S> {
    main: MultiMain<S>,
    others: NonEmpty<DataSlice<S>>,
}

impl<S> MultiSlice<S> {
    /// The primary field.
    pub fn main(&self) -> &MultiMain<S> {
        &self.main
    }

    /// Auxiliary fields, in declaration order.
    pub fn others(&self) -> &NonEmpty<DataSlice<S>> {
        &self.others
    }
}

/// A field named `key` holding a sequence whose elements match `child`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySlice<S> {
    key: String,
    child: Box<SliceSchema<S>>,
}

impl<S> ArraySlice<S> {
    /// Field name of the sequence.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The element shape.
    pub fn child(&self) -> &SliceSchema<S> {
        &self.child
    }
}

/// A field named `key` whose value must satisfy every child.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSlice<S> {
    key: String,
    children: NonEmpty<SliceSchema<S>>,
}

impl<S> ObjectSlice<S> {
    /// Field name the merged children are nested under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Child slices, in declaration order.
    pub fn children(&self) -> &NonEmpty<SliceSchema<S>> {
        &self.children
    }
}

/// A slice shape.
///
/// Build instances with [`text_slice`], [`data_slice`],
/// [`text_multi_slice`], [`data_multi_slice`], [`array_slice`] and
/// [`object_slice`].
#[derive(Debug, Clone, PartialEq)]
pub enum SliceSchema<S> {
    Text(TextSlice),
    Data(DataSlice<S>),
    Multi(MultiSlice<S>),
    Array(ArraySlice<S>),
    Object(Box<ObjectSlice<S>>),
}

impl<S> SliceSchema<S> {
    /// The variant tag.
    pub fn kind(&self) -> SliceKind {
        match self {
            Self::Text(_) => SliceKind::Text,
            Self::Data(_) => SliceKind::Data,
            Self::Multi(_) => SliceKind::Multi,
            Self::Array(_) => SliceKind::Array,
            Self::Object(_) => SliceKind::Object,
        }
    }

    /// The slice's own field name. Multi slices have none.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.key()),
            Self::Data(data) => Some(data.key()),
            Self::Multi(_) => None,
            Self::Array(array) => Some(array.key()),
            Self::Object(object) => Some(object.key()),
        }
    }

    /// Field names this slice places in its enclosing object.
    ///
    /// A multi slice contributes its main key followed by every auxiliary
    /// key; every other variant contributes exactly its own key.
    pub fn field_keys(&self) -> Vec<&str> {
        match self {
            Self::Multi(multi) => std::iter::once(multi.main().key())
                .chain(multi.others().iter().map(DataSlice::key))
                .collect(),
            Self::Text(text) => vec![text.key()],
            Self::Data(data) => vec![data.key()],
            Self::Array(array) => vec![array.key()],
            Self::Object(object) => vec![object.key()],
        }
    }

    /// Nesting depth of the descriptor tree. Flat slices have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Text(_) | Self::Data(_) | Self::Multi(_) => 1,
            Self::Array(array) => 1 + array.child().depth(),
            Self::Object(object) => {
                1 + object
                    .children()
                    .iter()
                    .map(SliceSchema::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Field keys contributed more than once at this slice's own level.
    ///
    /// For an object slice these are keys shared by its children; for a
    /// multi slice, keys repeated among its main and auxiliary fields. Each
    /// key is listed once, in the order its first repeat was seen. Other
    /// variants have no siblings and return an empty list.
    pub fn duplicate_field_keys(&self) -> Vec<&str> {
        let keys: Vec<&str> = match self {
            Self::Object(object) => object
                .children()
                .iter()
                .flat_map(SliceSchema::field_keys)
                .collect(),
            Self::Multi(_) => self.field_keys(),
            Self::Text(_) | Self::Data(_) | Self::Array(_) => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for key in keys {
            if !seen.insert(key) && !duplicates.contains(&key) {
                duplicates.push(key);
            }
        }
        duplicates
    }
}

fn data_pair<S, K: Into<String>>((key, schema): (K, S)) -> DataSlice<S> {
    DataSlice {
        key: key.into(),
        schema,
    }
}

/// A string field.
pub fn text_slice<S>(key: impl Into<String>) -> SliceSchema<S> {
    SliceSchema::Text(TextSlice { key: key.into() })
}

/// A field validated by `schema`.
pub fn data_slice<S>(key: impl Into<String>, schema: S) -> SliceSchema<S> {
    SliceSchema::Data(DataSlice {
        key: key.into(),
        schema,
    })
}

/// A multi slice whose main field is a string.
pub fn text_multi_slice<S, K>(key: impl Into<String>, others: NonEmpty<(K, S)>) -> SliceSchema<S>
where
    K: Into<String>,
{
    SliceSchema::Multi(MultiSlice {
        main: MultiMain::Text(TextSlice { key: key.into() }),
        others: others.map(data_pair),
    })
}

/// A multi slice whose main field is validated by `schema`.
pub fn data_multi_slice<S, K>(
    key: impl Into<String>,
    schema: S,
    others: NonEmpty<(K, S)>,
) -> SliceSchema<S>
where
    K: Into<String>,
{
    SliceSchema::Multi(MultiSlice {
        main: MultiMain::Data(DataSlice {
            key: key.into(),
            schema,
        }),
        others: others.map(data_pair),
    })
}

/// A sequence field whose elements match `child`.
pub fn array_slice<S>(key: impl Into<String>, child: SliceSchema<S>) -> SliceSchema<S> {
    SliceSchema::Array(ArraySlice {
        key: key.into(),
        child: Box::new(child),
    })
}

/// A field that must satisfy every one of `children`.
pub fn object_slice<S>(key: impl Into<String>, children: NonEmpty<SliceSchema<S>>) -> SliceSchema<S> {
    SliceSchema::Object(Box::new(ObjectSlice {
        key: key.into(),
        children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonempty;

    // Stand-in validator type; the model never looks inside it.
    type Slice = SliceSchema<&'static str>;

    #[test]
    fn test_text_slice() {
        let slice: Slice = text_slice("title");
        assert_eq!(slice.kind(), SliceKind::Text);
        assert_eq!(slice.key(), Some("title"));
        assert_eq!(slice.depth(), 1);
    }

    #[test]
    fn test_data_slice_keeps_schema() {
        let slice: Slice = data_slice("count", "number");
        match &slice {
            SliceSchema::Data(data) => {
                assert_eq!(data.key(), "count");
                assert_eq!(*data.schema(), "number");
            }
            other => panic!("expected data slice, got {}", other.kind()),
        }
    }

    #[test]
    fn test_text_multi_slice_lowers_pairs_to_data() {
        let slice: Slice = text_multi_slice("title", nonempty![("subtitle", "string"), ("lang", "code")]);
        assert_eq!(slice.kind(), SliceKind::Multi);
        assert_eq!(slice.key(), None);
        let SliceSchema::Multi(multi) = &slice else {
            panic!("expected multi slice");
        };
        assert!(matches!(multi.main(), MultiMain::Text(_)));
        assert_eq!(multi.others().len(), 2);
        assert_eq!(multi.others().head().key(), "subtitle");
        assert_eq!(*multi.others().tail()[0].schema(), "code");
    }

    #[test]
    fn test_data_multi_slice_main_is_data() {
        let slice: Slice = data_multi_slice("image", "url", nonempty![("alt", "string")]);
        let SliceSchema::Multi(multi) = &slice else {
            panic!("expected multi slice");
        };
        match multi.main() {
            MultiMain::Data(data) => {
                assert_eq!(data.key(), "image");
                assert_eq!(*data.schema(), "url");
            }
            MultiMain::Text(_) => panic!("expected data main"),
        }
    }

    #[test]
    fn test_field_keys() {
        let multi: Slice = text_multi_slice("title", nonempty![("subtitle", "s"), ("lang", "s")]);
        assert_eq!(multi.field_keys(), vec!["title", "subtitle", "lang"]);

        let array: Slice = array_slice("tags", text_slice("tag"));
        assert_eq!(array.field_keys(), vec!["tags"]);
    }

    #[test]
    fn test_depth_of_nested_tree() {
        let slice: Slice = object_slice(
            "post",
            nonempty![
                text_slice("title"),
                array_slice("sections", object_slice("section", nonempty![text_slice("body")])),
            ],
        );
        // post -> sections -> section -> body
        assert_eq!(slice.depth(), 4);
        assert_eq!(slice.kind(), SliceKind::Object);
    }

    #[test]
    fn test_object_children_order_preserved() {
        let slice: Slice = object_slice("o", nonempty![text_slice("a"), text_slice("b"), text_slice("c")]);
        let SliceSchema::Object(object) = &slice else {
            panic!("expected object slice");
        };
        let keys: Vec<_> = object.children().iter().filter_map(SliceSchema::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_object_nested_in_object() {
        let inner: Slice = object_slice("author", nonempty![text_slice("name"), text_slice("email")]);
        let outer: Slice = object_slice("meta", nonempty![inner.clone(), data_slice("year", "integer")]);

        assert_eq!(outer.depth(), 3);
        let SliceSchema::Object(object) = &outer else {
            panic!("expected object slice");
        };
        assert_eq!(object.children().len(), 2);
        assert_eq!(*object.children().head(), inner);
        let SliceSchema::Object(nested) = object.children().head() else {
            panic!("expected nested object slice");
        };
        assert_eq!(nested.key(), "author");
        assert_eq!(nested.children().tail()[0].key(), Some("email"));
    }

    #[test]
    fn test_duplicate_field_keys_in_object() {
        let slice: Slice = object_slice(
            "o",
            nonempty![
                data_slice("x", "number"),
                text_multi_slice("title", nonempty![("x", "string")]),
                text_slice("title"),
                data_slice("x", "integer"),
            ],
        );
        assert_eq!(slice.duplicate_field_keys(), vec!["x", "title"]);
    }

    #[test]
    fn test_duplicate_field_keys_in_multi() {
        let slice: Slice = text_multi_slice("a", nonempty![("b", "s"), ("a", "s")]);
        assert_eq!(slice.duplicate_field_keys(), vec!["a"]);

        let clean: Slice = object_slice("o", nonempty![text_slice("a"), text_slice("b")]);
        assert!(clean.duplicate_field_keys().is_empty());
        assert!(text_slice::<&str>("a").duplicate_field_keys().is_empty());
    }

    #[test]
    fn test_kind_display() {
        let slices: Vec<Slice> = vec![
            text_slice("t"),
            data_slice("d", "s"),
            text_multi_slice("m", nonempty![("n", "s")]),
            array_slice("a", text_slice("t")),
            object_slice("o", nonempty![text_slice("t")]),
        ];
        let names: Vec<String> = slices.iter().map(|s| s.kind().to_string()).collect();
        assert_eq!(names, vec!["text", "data", "multi", "array", "object"]);
    }
}
