//! Pre-serialization pass over call arguments.
//!
//! `serde_json` maps non-finite floats to `null` and writes hash sets in
//! hasher order, so neither has a deterministic JSON form. [`inspect`] walks a
//! value through a [`Serializer`] that rejects both, and records the Rust type
//! of every top-level struct field or sequence element so exclusions by type
//! name work on unpacked arguments.

use crate::arguments::short_type_name;
use serde::ser::{self, Serialize, Serializer};
use std::fmt;

/// Why a value has no deterministic form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InspectError(String);

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InspectError {}

impl ser::Error for InspectError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// One top-level field (named) or element (unnamed) of an inspected value.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub name: Option<&'static str>,
    pub type_name: &'static str,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Inspection {
    pub members: Vec<Member>,
}

impl Inspection {
    pub fn named(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == Some(name))
    }

    pub fn positional(&self, index: usize) -> Option<&Member> {
        self.members.iter().filter(|m| m.name.is_none()).nth(index)
    }

    /// First member that failed inspection.
    pub fn first_error(&self) -> Option<String> {
        self.members.iter().find_map(|m| {
            m.error
                .as_ref()
                .map(|e| format!("{}: {e}", m.name.unwrap_or(m.type_name)))
        })
    }
}

/// Inspects `value`.
///
/// Failures inside a top-level struct field or sequence element are recorded
/// on that member rather than returned, so a caller can still drop the member
/// through an exclusion. Anything else fails the whole value.
pub(crate) fn inspect<T: Serialize + ?Sized>(value: &T) -> Result<Inspection, InspectError> {
    let mut inspector = Inspector::default();
    check_type::<T>()?;
    value.serialize(&mut inspector)?;
    Ok(Inspection {
        members: inspector.members,
    })
}

fn check_type<T: ?Sized>() -> Result<(), InspectError> {
    let type_name = std::any::type_name::<T>();
    if short_type_name(type_name) == "HashSet" {
        return Err(InspectError(format!(
            "`{type_name}` iterates in hasher order; use a BTreeSet"
        )));
    }
    Ok(())
}

fn check_float(v: f64) -> Result<(), InspectError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(InspectError(format!("non-finite float `{v}`")))
    }
}

#[derive(Default)]
struct Inspector {
    depth: usize,
    recording: bool,
    members: Vec<Member>,
}

impl Inspector {
    fn open(&mut self, record: bool) -> &mut Self {
        if self.depth == 0 {
            self.recording = record;
        }
        self.depth += 1;
        self
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn nested<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        check_type::<T>()?;
        let depth = self.depth;
        let result = value.serialize(&mut *self);
        self.depth = depth;
        result
    }

    fn member<T: Serialize + ?Sized>(
        &mut self,
        name: Option<&'static str>,
        value: &T,
    ) -> Result<(), InspectError> {
        let top_level = self.depth == 1 && self.recording;
        let result = self.nested(value);

        if !top_level {
            return result;
        }
        self.members.push(Member {
            name,
            type_name: std::any::type_name::<T>(),
            error: result.err().map(|e| e.0),
        });
        Ok(())
    }
}

impl<'a> Serializer for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), InspectError> {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), InspectError> {
        check_float(v)
    }

    fn serialize_char(self, _: char) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), InspectError> {
        self.nested(value)
    }

    fn serialize_unit(self) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), InspectError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), InspectError> {
        self.nested(value)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), InspectError> {
        let inspector = self.open(false);
        let result = inspector.nested(value);
        inspector.close();
        result
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, InspectError> {
        Ok(self.open(true))
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, InspectError> {
        Ok(self.open(true))
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, InspectError> {
        Ok(self.open(true))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, InspectError> {
        Ok(self.open(false))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, InspectError> {
        Ok(self.open(false))
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, InspectError> {
        Ok(self.open(true))
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, InspectError> {
        Ok(self.open(false))
    }
}

impl<'a> ser::SerializeSeq for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        self.member(None, value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        self.member(None, value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        self.member(None, value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        self.nested(value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), InspectError> {
        self.nested(key)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), InspectError> {
        self.nested(value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InspectError> {
        self.member(Some(key), value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut Inspector {
    type Ok = ();
    type Error = InspectError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), InspectError> {
        self.nested(value)
    }

    fn end(self) -> Result<(), InspectError> {
        self.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeSet, HashMap, HashSet};

    #[derive(Serialize)]
    struct Search {
        query: String,
        boost: f64,
        tags: Vec<String>,
    }

    fn rejects<T: Serialize + ?Sized>(value: &T) -> bool {
        inspect(value).map_or(true, |inspection| inspection.first_error().is_some())
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        for v in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(inspect(&v).is_err());
        }
        assert!(rejects(&f32::NAN));
        assert!(rejects(&Some(vec![1.0, f64::NAN])));
        assert!(!rejects(&1.5f64));
        assert!(!rejects(&None::<f64>));
    }

    #[test]
    fn test_hash_sets_are_rejected_at_any_depth() {
        let set: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert!(inspect(&set).is_err());
        assert!(rejects(&vec![set.clone()]));
        assert!(inspect(&Some(&set)).is_err());
        assert!(rejects(&vec![vec![set.clone()]]));

        let ordered: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        assert!(!rejects(&ordered));
    }

    #[test]
    fn test_string_keyed_hash_maps_are_allowed() {
        let map: HashMap<String, i32> = [("a".to_string(), 1)].into_iter().collect();
        assert!(!rejects(&map));
    }

    #[test]
    fn test_struct_fields_are_recorded_with_types() {
        let search = Search {
            query: "rust".into(),
            boost: f64::INFINITY,
            tags: vec!["a".into()],
        };
        let inspection = inspect(&search).unwrap();

        assert_eq!(inspection.members.len(), 3);
        assert_eq!(
            inspection.named("query").unwrap().type_name,
            std::any::type_name::<String>()
        );
        assert!(inspection.named("query").unwrap().error.is_none());
        assert!(inspection.named("boost").unwrap().error.is_some());
        assert!(inspection.first_error().unwrap().starts_with("boost"));
    }

    #[test]
    fn test_tuple_elements_are_recorded_in_order() {
        let inspection = inspect(&(1u8, "two")).unwrap();
        assert_eq!(inspection.positional(0).unwrap().type_name, "u8");
        assert_eq!(inspection.positional(1).unwrap().type_name, "&str");
        assert!(inspection.positional(2).is_none());
    }
}
