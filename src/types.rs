//! The inferred-type grammar
//!
//! Types are structurally compared; `Unknown` is a wildcard that suppresses,
//! never triggers, a mismatch. Inference is best-effort by design: anything
//! unresolved flows through as `Unknown` instead of blocking the pipeline.

use std::fmt;

/// An inferred or declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Int,
    Float,
    Str,
    Char,
    Bool,
    Unknown,
    Range,
    Function,
    Class,
    List(Box<Ty>),
    Array(Box<Ty>),
    Map(Box<Ty>, Box<Ty>),
    Set(Box<Ty>),
    Seq(Box<Ty>),
    /// A user type name, e.g. a class used as an annotation
    Named(String),
}

impl Ty {
    /// Map a single-token annotation (`: int`, `: Point`, ...) to a type
    pub fn from_annotation(name: &str) -> Ty {
        match name {
            "int" | "int32" | "int64" | "byte" | "sbyte" | "int16" | "uint16" | "uint" => Ty::Int,
            "float" | "double" | "float32" | "single" | "decimal" => Ty::Float,
            "string" => Ty::Str,
            "char" => Ty::Char,
            "bool" => Ty::Bool,
            "unknown" => Ty::Unknown,
            other => Ty::Named(other.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int | Ty::Float)
    }

    /// Element type of an indexable/iterable container
    pub fn element(&self) -> Option<&Ty> {
        match self {
            Ty::List(t) | Ty::Array(t) | Ty::Seq(t) | Ty::Set(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, Ty::List(_) | Ty::Array(_))
    }

    /// Whether a `for..in` loop accepts this type
    pub fn is_iterable(&self) -> bool {
        matches!(
            self,
            Ty::Range | Ty::Seq(_) | Ty::List(_) | Ty::Array(_) | Ty::Str | Ty::Unknown
        )
    }

    /// True when the two types are known and disagree
    pub fn conflicts_with(&self, other: &Ty) -> bool {
        !self.is_unknown() && !other.is_unknown() && self != other
    }

    /// Fold element types together: any disagreement collapses to `Unknown`
    pub fn unify(types: impl IntoIterator<Item = Ty>) -> Ty {
        let mut unified = Ty::Unknown;
        for ty in types {
            if unified.is_unknown() {
                unified = ty;
            } else if unified != ty {
                return Ty::Unknown;
            }
        }
        unified
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "int"),
            Ty::Float => write!(f, "float"),
            Ty::Str => write!(f, "string"),
            Ty::Char => write!(f, "char"),
            Ty::Bool => write!(f, "bool"),
            Ty::Unknown => write!(f, "unknown"),
            Ty::Range => write!(f, "range"),
            Ty::Function => write!(f, "function"),
            Ty::Class => write!(f, "class"),
            Ty::List(t) => write!(f, "list<{t}>"),
            Ty::Array(t) => write!(f, "array<{t}>"),
            Ty::Map(k, v) => write!(f, "map<{k},{v}>"),
            Ty::Set(t) => write!(f, "set<{t}>"),
            Ty::Seq(t) => write!(f, "seq<{t}>"),
            Ty::Named(name) => write!(f, "{name}"),
        }
    }
}
