//! Call arguments as seen by the fingerprint engine.
//!
//! An [`ArgumentSet`] is the explicit, serializable view of a handler call:
//! ordered positional values plus named values. Every argument records its
//! parameter name (when known) and the Rust type it was built from, so that an
//! [`ExclusionSet`] declared at wrap time can drop non-cacheable dependencies
//! (sessions, connections, clocks) before hashing.
//!
//! # Example
//!
//! ```
//! use cacheward_core::{ArgumentSet, ExclusionSet};
//!
//! let args = ArgumentSet::new()
//!     .param("user_id", &42)
//!     .named("verbose", &true);
//!
//! let excluded = ExclusionSet::from_iter(["verbose"]);
//! assert_eq!(args.without(&excluded).len(), 1);
//! ```

use crate::errors::KeyError;
use crate::inspect::{Member, inspect};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A single call argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: Option<String>,
    type_name: Option<&'static str>,
    value: Result<Value, String>,
}

impl Argument {
    fn capture<T: Serialize + ?Sized>(name: Option<String>, value: &T) -> Self {
        let value = match inspect(value) {
            Ok(inspection) => match inspection.first_error() {
                Some(message) => Err(message),
                None => serde_json::to_value(value).map_err(|e| e.to_string()),
            },
            Err(e) => Err(e.to_string()),
        };

        Self {
            name,
            type_name: Some(std::any::type_name::<T>()),
            value,
        }
    }

    fn unpacked(name: Option<String>, value: Value, member: Option<&Member>) -> Self {
        Self {
            name,
            type_name: member.map(|m| m.type_name),
            value: match member.and_then(|m| m.error.clone()) {
                Some(message) => Err(message),
                None => Ok(value),
            },
        }
    }

    /// Parameter name, if the argument was declared with one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Full Rust type path the argument was captured from.
    ///
    /// For arguments unpacked by [`ArgumentSet::from_serialize`] this is the
    /// field or element type. `None` when it cannot be known, e.g. map entries.
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }

    /// The JSON view of the value, or the reason it could not be produced.
    pub fn value(&self) -> Result<&Value, &str> {
        self.value.as_ref().map_err(String::as_str)
    }
}

/// Positional and named arguments of one handler invocation.
///
/// Named arguments are kept sorted by name, so the order in which they are
/// added never affects the derived key. Adding a named argument twice keeps
/// the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    positional: Vec<Argument>,
    named: BTreeMap<String, Argument>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an anonymous positional argument.
    pub fn positional<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.positional.push(Argument::capture(None, value));
        self
    }

    /// Appends a positional argument bound to a parameter name.
    ///
    /// The name is only used for exclusion; the value is still keyed by position.
    pub fn param<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        self.positional
            .push(Argument::capture(Some(name.into()), value));
        self
    }

    /// Sets a named (keyword) argument.
    pub fn named<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        let name = name.into();
        let argument = Argument::capture(Some(name.clone()), value);
        self.named.insert(name, argument);
        self
    }

    /// Builds an argument set from any serializable value.
    ///
    /// - structs and maps become named arguments (one per field)
    /// - tuples, arrays and sequences become positional arguments
    /// - `()` and `None` produce an empty set
    /// - any other scalar becomes a single positional argument
    ///
    /// Struct fields and tuple elements keep their Rust type, so exclusions by
    /// type name apply to them. A field without a deterministic form (a
    /// non-finite float, a `HashSet`) only fails key derivation if it is not
    /// excluded.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, KeyError> {
        let unserializable = |message: String| KeyError::Unserializable {
            argument: std::any::type_name::<T>().to_string(),
            message,
        };

        let inspection = inspect(value).map_err(|e| unserializable(e.to_string()))?;
        let value = serde_json::to_value(value).map_err(|e| unserializable(e.to_string()))?;

        let mut args = Self::new();
        match value {
            Value::Null => {}
            Value::Object(fields) => {
                for (name, value) in fields {
                    let member = inspection.named(&name);
                    args.named
                        .insert(name.clone(), Argument::unpacked(Some(name), value, member));
                }
            }
            Value::Array(items) => {
                args.positional = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Argument::unpacked(None, item, inspection.positional(i)))
                    .collect();
            }
            scalar => {
                args.positional.push(Argument {
                    name: None,
                    type_name: Some(std::any::type_name::<T>()),
                    value: Ok(scalar),
                });
            }
        }

        Ok(args)
    }

    pub fn positional_args(&self) -> impl Iterator<Item = &Argument> {
        self.positional.iter()
    }

    /// Named arguments in ascending name order.
    pub fn named_args(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.named.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy with every excluded argument removed.
    pub fn without(&self, excluded: &ExclusionSet) -> Self {
        if excluded.is_empty() {
            return self.clone();
        }

        Self {
            positional: self
                .positional
                .iter()
                .filter(|arg| !excluded.excludes(arg))
                .cloned()
                .collect(),
            named: self
                .named
                .iter()
                .filter(|(_, arg)| !excluded.excludes(arg))
                .map(|(name, arg)| (name.clone(), arg.clone()))
                .collect(),
        }
    }
}

/// Declared identifiers of arguments that never take part in a cache key.
///
/// An identifier matches an argument when it equals the argument's parameter
/// name, its full type path (`my_app::db::Session`) or the last segment of
/// that path with generics stripped (`Session`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identifier and returns the set.
    pub fn with(mut self, identifier: impl Into<String>) -> Self {
        self.insert(identifier);
        self
    }

    /// Excludes the Rust type `T` by its full path.
    pub fn with_type<T: ?Sized>(self) -> Self {
        self.with(std::any::type_name::<T>())
    }

    pub fn insert(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        let identifier = identifier.trim();
        if !identifier.is_empty() {
            self.0.insert(identifier.to_string());
        }
    }

    /// Merges another set into this one.
    pub fn extend(&mut self, other: &ExclusionSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether `argument` is dropped before fingerprinting.
    pub fn excludes(&self, argument: &Argument) -> bool {
        if argument.name().is_some_and(|name| self.contains(name)) {
            return true;
        }

        match argument.type_name() {
            Some(type_name) => {
                self.contains(type_name) || self.contains(short_type_name(type_name))
            }
            None => false,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for identifier in iter {
            set.insert(identifier);
        }
        set
    }
}

/// `alloc::vec::Vec<u8>` -> `Vec`, `&my_app::Session` -> `Session`.
pub(crate) fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let base = base.rsplit("::").next().unwrap_or(base);
    base.trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Serialize)]
    struct Session {
        token: String,
    }

    #[derive(Serialize)]
    struct ProductQuery {
        category: String,
        limit: u32,
    }

    #[test]
    fn test_named_arguments_are_sorted() {
        let a = ArgumentSet::new().named("b", &1).named("a", &2);
        let b = ArgumentSet::new().named("a", &2).named("b", &1);
        assert_eq!(a, b);

        let names: Vec<&str> = a.named_args().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_named_argument_last_value_wins() {
        let args = ArgumentSet::new().named("limit", &10).named("limit", &20);
        let (_, arg) = args.named_args().next().unwrap();
        assert_eq!(arg.value().unwrap(), &Value::from(20));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_exclusion_by_parameter_name() {
        let args = ArgumentSet::new()
            .param("user_id", &42)
            .param("request", &"opaque");
        let filtered = args.without(&ExclusionSet::new().with("request"));

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.positional_args().next().unwrap().name(), Some("user_id"));
    }

    #[test]
    fn test_exclusion_by_type_name() {
        let session = Session {
            token: "secret".into(),
        };
        let args = ArgumentSet::new().positional(&session).positional(&7);

        let by_short = args.without(&ExclusionSet::new().with("Session"));
        assert_eq!(by_short.len(), 1);

        let by_type = args.without(&ExclusionSet::new().with_type::<Session>());
        assert_eq!(by_type.len(), 1);
    }

    #[test]
    fn test_from_serialize_struct_becomes_named() {
        let query = ProductQuery {
            category: "books".into(),
            limit: 5,
        };
        let args = ArgumentSet::from_serialize(&query).unwrap();
        let names: Vec<&str> = args.named_args().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["category", "limit"]);
        assert_eq!(args.positional_args().count(), 0);
    }

    #[test]
    fn test_from_serialize_unit_and_tuple() {
        assert!(ArgumentSet::from_serialize(&()).unwrap().is_empty());

        let args = ArgumentSet::from_serialize(&(1, "two")).unwrap();
        assert_eq!(args.positional_args().count(), 2);
    }

    #[test]
    fn test_from_serialize_rejects_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert((1, 2), "pair");
        let err = ArgumentSet::from_serialize(&map).unwrap_err();
        assert!(matches!(err, KeyError::Unserializable { .. }));
    }

    #[derive(Serialize)]
    struct Lookup {
        user_id: i64,
        session: Session,
    }

    #[test]
    fn test_from_serialize_keeps_field_types() {
        let lookup = Lookup {
            user_id: 1,
            session: Session {
                token: "secret".into(),
            },
        };
        let args = ArgumentSet::from_serialize(&lookup).unwrap();

        let filtered = args.without(&ExclusionSet::new().with("Session"));
        let names: Vec<&str> = filtered.named_args().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["user_id"]);

        let tuple = ArgumentSet::from_serialize(&(7, Session { token: "t".into() })).unwrap();
        assert_eq!(tuple.without(&ExclusionSet::new().with_type::<Session>()).len(), 1);
    }

    #[derive(Serialize)]
    struct Scored {
        score: f64,
        tags: HashSet<String>,
    }

    #[test]
    fn test_undeterministic_values_are_marked() {
        for v in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let args = ArgumentSet::new().param("x", &v);
            assert!(args.positional_args().next().unwrap().value().is_err());
        }

        let args = ArgumentSet::new().param("x", &None::<f64>);
        assert_eq!(args.positional_args().next().unwrap().value(), Ok(&Value::Null));

        let scored = Scored {
            score: f64::NAN,
            tags: HashSet::new(),
        };
        let args = ArgumentSet::from_serialize(&scored).unwrap();
        for (_, arg) in args.named_args() {
            assert!(arg.value().is_err());
        }
        let kept = args.without(&ExclusionSet::from_iter(["score", "tags"]));
        assert!(kept.is_empty());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec");
        assert_eq!(short_type_name("&my_app::Session"), "Session");
        assert_eq!(short_type_name("i32"), "i32");
    }

    #[test]
    fn test_blank_identifiers_are_ignored() {
        let set = ExclusionSet::from_iter(["", "  ", "db"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["db"]);
    }
}
