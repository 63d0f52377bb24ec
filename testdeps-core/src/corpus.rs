//! Corpus entries exchanged with a fuzzing engine, and shape validation of their values.

use std::fmt::Display;
use std::path::PathBuf;

use crate::error;
use crate::trace_categories;

/// One fuzzing input.
///
/// This record is the contract shared with fuzzing engines and mirrors the fields of
/// their on-disk corpus format, in order. The bridge never constructs, stores or
/// (de)serializes entries; it only passes them through and validates value types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorpusEntry {
    /// Name of the entry this one was derived from, if it was generated by mutation.
    pub parent: String,
    /// Location of the entry in the corpus, if it was loaded from disk.
    pub path: PathBuf,
    /// Raw encoded form of the entry.
    pub data: Vec<u8>,
    /// Decoded arguments for the fuzz target.
    pub values: Vec<CorpusValue>,
    /// Number of mutation rounds that produced this entry.
    pub generation: usize,
    /// Whether the entry was supplied as a seed rather than discovered.
    pub is_seed: bool,
}

/// Type of a value that can be passed to a fuzz target.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CorpusType {
    /// Byte string.
    #[strum(serialize = "Vec<u8>")]
    Bytes,
    /// UTF-8 string.
    #[strum(serialize = "String")]
    String,
    /// Boolean.
    Bool,
    /// Unicode scalar value.
    Char,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Pointer-sized signed integer.
    Isize,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// Pointer-sized unsigned integer.
    Usize,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

/// A value that can be passed to a fuzz target.
#[derive(Clone, Debug, PartialEq)]
pub enum CorpusValue {
    /// Byte string.
    Bytes(Vec<u8>),
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Unicode scalar value.
    Char(char),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// Pointer-sized signed integer.
    Isize(isize),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Pointer-sized unsigned integer.
    Usize(usize),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
}

impl CorpusValue {
    /// Returns the runtime type of this value.
    pub const fn corpus_type(&self) -> CorpusType {
        match self {
            Self::Bytes(_) => CorpusType::Bytes,
            Self::String(_) => CorpusType::String,
            Self::Bool(_) => CorpusType::Bool,
            Self::Char(_) => CorpusType::Char,
            Self::I8(_) => CorpusType::I8,
            Self::I16(_) => CorpusType::I16,
            Self::I32(_) => CorpusType::I32,
            Self::I64(_) => CorpusType::I64,
            Self::Isize(_) => CorpusType::Isize,
            Self::U8(_) => CorpusType::U8,
            Self::U16(_) => CorpusType::U16,
            Self::U32(_) => CorpusType::U32,
            Self::U64(_) => CorpusType::U64,
            Self::Usize(_) => CorpusType::Usize,
            Self::F32(_) => CorpusType::F32,
            Self::F64(_) => CorpusType::F64,
        }
    }
}

macro_rules! impl_from_for_corpus_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for CorpusValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_from_for_corpus_value! {
    Vec<u8> => Bytes,
    String => String,
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl From<&str> for CorpusValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for CorpusValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// An ordered sequence of corpus types, displayed as `[t1, t2, ...]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeList(pub Vec<CorpusType>);

impl Display for TypeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ty}")?;
        }
        write!(f, "]")
    }
}

impl From<&[CorpusType]> for TypeList {
    fn from(types: &[CorpusType]) -> Self {
        Self(types.to_vec())
    }
}

/// Checks that `values` has exactly the types in `types`, position by position.
///
/// # Arguments
///
/// * `values` - The decoded values of a corpus entry.
/// * `types` - The argument types of the fuzz target.
pub fn check_corpus(values: &[CorpusValue], types: &[CorpusType]) -> Result<(), error::Error> {
    if values.len() != types.len() {
        return Err(error::Error::CorpusCountMismatch {
            actual: values.len(),
            expected: types.len(),
        });
    }

    let actual: Vec<CorpusType> = values.iter().map(CorpusValue::corpus_type).collect();
    if actual.as_slice() != types {
        tracing::debug!(target: trace_categories::CORPUS, "corpus entry type mismatch");
        return Err(error::Error::CorpusTypeMismatch {
            actual: TypeList(actual),
            expected: types.into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn matching_shape_is_accepted() -> Result<()> {
        check_corpus(
            &[1i64.into(), "a".into()],
            &[CorpusType::I64, CorpusType::String],
        )?;
        check_corpus(&[], &[])?;
        Ok(())
    }

    #[test]
    fn count_mismatch_is_reported() {
        let err = check_corpus(&[1i64.into()], &[CorpusType::I64, CorpusType::String])
            .unwrap_err();

        assert!(matches!(
            err,
            error::Error::CorpusCountMismatch {
                actual: 1,
                expected: 2
            }
        ));
        assert_eq!(
            err.to_string(),
            "wrong number of values in corpus entry: 1, want 2"
        );
    }

    #[test]
    fn type_mismatch_names_both_sequences() {
        let err = check_corpus(
            &[1i64.into(), 2i64.into()],
            &[CorpusType::I64, CorpusType::String],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "mismatched types in corpus entry: [i64, i64], want [i64, String]"
        );
    }

    #[test]
    fn integer_widths_are_distinct_types() {
        let err = check_corpus(&[1u8.into()], &[CorpusType::I8]).unwrap_err();
        assert!(matches!(err, error::Error::CorpusTypeMismatch { .. }));
    }

    #[test]
    fn type_names_follow_rust_spelling() {
        let types = TypeList(vec![
            CorpusType::Bytes,
            CorpusType::String,
            CorpusType::Bool,
            CorpusType::Char,
            CorpusType::Usize,
            CorpusType::F64,
        ]);
        assert_eq!(
            types.to_string(),
            "[Vec<u8>, String, bool, char, usize, f64]"
        );
    }

    #[test]
    fn value_reports_its_type() {
        assert_eq!(CorpusValue::from(b"xy".as_slice()).corpus_type(), CorpusType::Bytes);
        assert_eq!(CorpusValue::from('z').corpus_type(), CorpusType::Char);
        assert_eq!(CorpusValue::from(1.5f32).corpus_type(), CorpusType::F32);
    }
}
