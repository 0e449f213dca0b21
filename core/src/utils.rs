//! utils.rs
//! Small shared helpers.

use std::fmt;

use num_enum::TryFromPrimitive;

/// Variant name for known ids, `0x..` for anything else. Used in error
/// messages and logs for raw wire identifiers.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:04x}", raw),
    }
}
