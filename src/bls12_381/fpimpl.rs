use ark_ff::PrimeField;
use num_bigint::{BigInt, BigUint};
use num_traits::Num;

use crate::pseudo::{pick, push_bigint, roll, verify_bottom_constant};
use crate::treepp::*;

/// Prime field whose elements fit in one stack item.
///
/// The modulus is kept at the bottom of the stack by scripts that reduce.
pub trait FpImpl {
    /// Modulus as a hex string.
    const MODULUS: &'static str;

    type ConstantType: PrimeField;

    fn modulus_as_bigint() -> BigInt {
        BigInt::from_str_radix(Self::MODULUS, 16).unwrap()
    }

    #[inline]
    fn push_modulus() -> Script {
        push_bigint(&Self::modulus_as_bigint())
    }

    /// Asserts that the bottom of the stack holds the modulus.
    #[inline]
    fn verify_modulus() -> Script {
        verify_bottom_constant(&Self::modulus_as_bigint())
    }

    /// Pushes the canonical representative of `element`.
    fn push(element: Self::ConstantType) -> Script {
        let n: BigUint = element.into_bigint().into();
        push_bigint(&BigInt::from(n))
    }

    #[inline]
    fn copy(a: u32) -> Script {
        pick(a as i64, 1)
    }

    #[inline]
    fn roll(a: u32) -> Script {
        roll(a as i64, 1)
    }

    #[inline]
    fn toaltstack() -> Script {
        script! { OP_TOALTSTACK }
    }

    #[inline]
    fn fromaltstack() -> Script {
        script! { OP_FROMALTSTACK }
    }
}
