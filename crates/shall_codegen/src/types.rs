//! Mapping between primitive types and their ir representation

use cranelift::prelude::types::{F64, I32};
use cranelift::prelude::{AbiParam, Type};
use shall_tokens::types::PrimitiveType;

/// The ir type values of a primitive type are represented with
pub fn ir_type(ty: PrimitiveType) -> Type {
    match ty {
        PrimitiveType::Int => I32,
        PrimitiveType::Double => F64,
    }
}

pub fn abi_param(ty: PrimitiveType) -> AbiParam {
    AbiParam::new(ir_type(ty))
}

/// The primitive type represented by an ir type, if any
pub fn primitive_type(ty: Type) -> Option<PrimitiveType> {
    match ty {
        I32 => Some(PrimitiveType::Int),
        F64 => Some(PrimitiveType::Double),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for ty in [PrimitiveType::Int, PrimitiveType::Double] {
            assert_eq!(primitive_type(ir_type(ty)), Some(ty));
        }
        assert_eq!(abi_param(PrimitiveType::Double).value_type, F64);
        assert_eq!(primitive_type(cranelift::prelude::types::I64), None);
    }
}
