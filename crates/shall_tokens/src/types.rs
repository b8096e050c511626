//! The primitive types of the language.

use std::str::FromStr;

/// A primitive value type.
///
/// The lowercase names double as the type-name set the lexer classifies words against.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
    /// 32-bit signed integer
    Int,
    /// 64-bit float
    Double,
}

impl PrimitiveType {
    /// Looks up a type by its source name
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }
}

/// Checks if the word is in the type-name set
pub fn is_type_name(word: &str) -> bool {
    PrimitiveType::lookup(word).is_some()
}
