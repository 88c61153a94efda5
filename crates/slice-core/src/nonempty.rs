//! # Non-Empty Sequences
//!
//! `NonEmpty<T>` is an ordered sequence with at least one element, stored
//! as a head element plus a (possibly empty) tail. Object children and the
//! auxiliary fields of a multi slice use it so that "at least one" is a
//! property of the type rather than a runtime length check.

use std::fmt;

/// An ordered sequence guaranteed to hold at least one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmpty<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmpty<T> {
    /// Create a single-element sequence.
    pub fn new(head: T) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    /// Create a sequence from its first element and the remaining elements.
    pub fn from_parts(head: T, tail: Vec<T>) -> Self {
        Self { head, tail }
    }

    /// Convert a `Vec`, returning `None` if it is empty.
    pub fn from_vec(vec: Vec<T>) -> Option<Self> {
        let mut iter = vec.into_iter();
        let head = iter.next()?;
        Some(Self {
            head,
            tail: iter.collect(),
        })
    }

    /// The first element.
    pub fn head(&self) -> &T {
        &self.head
    }

    /// Every element after the first, in order.
    pub fn tail(&self) -> &[T] {
        &self.tail
    }

    /// Number of elements. Always at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Iterate over all elements in order, head first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Apply `f` to every element, preserving order and non-emptiness.
    pub fn map<U, F>(self, mut f: F) -> NonEmpty<U>
    where
        F: FnMut(T) -> U,
    {
        let head = f(self.head);
        NonEmpty {
            head,
            tail: self.tail.into_iter().map(f).collect(),
        }
    }

    /// Flatten into a `Vec`, head first.
    pub fn into_vec(self) -> Vec<T> {
        let mut out = Vec::with_capacity(1 + self.tail.len());
        out.push(self.head);
        out.extend(self.tail);
        out
    }
}

impl<T> IntoIterator for NonEmpty<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<std::iter::Once<T>, std::vec::IntoIter<T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.head).chain(self.tail)
    }
}

impl<'a, T> IntoIterator for &'a NonEmpty<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Chain<std::iter::Once<&'a T>, std::slice::Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(&self.head).chain(self.tail.iter())
    }
}

impl<T: fmt::Display> fmt::Display for NonEmpty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}

/// Build a [`NonEmpty`] from one or more expressions.
///
/// ```
/// use slice_core::nonempty;
///
/// let keys = nonempty!["title", "subtitle"];
/// assert_eq!(keys.len(), 2);
/// ```
///
/// Calling it with no arguments does not compile.
#[macro_export]
macro_rules! nonempty {
    ($head:expr $(, $tail:expr)* $(,)?) => {
        $crate::NonEmpty::from_parts($head, ::std::vec![$($tail),*])
    };
}
