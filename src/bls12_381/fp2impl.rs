use num_bigint::BigInt;

use crate::bls12_381::fpimpl::FpImpl;
use crate::config::ModuloConfig;
use crate::pseudo::{fromaltstack_mod, mod_reduce, pick, roll};
use crate::treepp::*;

/// Script gadgets for the quadratic extension `Fp[u] / (u² - NON_RESIDUE)`.
///
/// An element `c0 + c1·u` occupies two stack items, `c1` on top. Every gadget
/// takes a [`ModuloConfig`]; when `take_modulo` is set the modulus is fetched
/// from the bottom of the stack and both limbs are reduced, otherwise the
/// limbs are left as exact integers.
pub trait Fp2Impl {
    type BaseField: FpImpl;

    const NON_RESIDUE: i64;

    fn modulus(&self) -> BigInt {
        Self::BaseField::modulus_as_bigint()
    }

    /// Finishes a gadget whose result is `[.., c0] | [.., c1]`.
    ///
    /// Reducing leaves `[.., c0, c1]`, or `[.., c0, q, c1]` when the constant is
    /// reused. Without reduction `c1` is simply brought back.
    fn reduce(&self, config: ModuloConfig) -> Script {
        if !config.take_modulo {
            return script! { OP_FROMALTSTACK };
        }
        script! {
            if config.clean_constant {
                { roll(-1, 1) }
            } else {
                { pick(-1, 1) }
            }
            // c0 q | c1
            { mod_reduce(script! {}, config.positive_modulo, true) }
            // q c0 | c1
            { fromaltstack_mod(config.positive_modulo, config.is_constant_reused) }
        }
    }

    /// `[.., x, y]` into `[.., x·y]`.
    fn mul(&self, config: ModuloConfig) -> Script {
        let script = script! {
            if config.check_constant {
                { Self::BaseField::verify_modulus() }
            }
            // x0 x1 y0 y1
            3 OP_PICK 1 OP_PICK OP_MUL
            // x0 x1 y0 y1 x0*y1
            3 OP_PICK 3 OP_PICK OP_MUL OP_ADD
            // x0 x1 y0 y1 x0*y1+x1*y0
            OP_TOALTSTACK
            OP_ROT OP_MUL
            // x0 y0 x1*y1
            if Self::NON_RESIDUE == -1 {
                OP_ROT OP_ROT OP_MUL OP_SWAP OP_SUB
            } else {
                { Self::NON_RESIDUE } OP_MUL
                OP_ROT OP_ROT OP_MUL OP_ADD
            }
            // x0*y0+β*x1*y1 | x0*y1+x1*y0
            { self.reduce(config) }
        };
        tracing::debug!(size = script.len(), ?config, "fp2 mul");
        script
    }

    /// `[.., x, s]` into `[.., x·s]` where `s` is a base field element.
    fn scalar_mul(&self, config: ModuloConfig) -> Script {
        let script = script! {
            if config.check_constant {
                { Self::BaseField::verify_modulus() }
            }
            // x0 x1 s
            OP_TUCK OP_MUL
            // x0 s x1*s
            OP_TOALTSTACK OP_MUL
            // x0*s | x1*s
            { self.reduce(config) }
        };
        tracing::debug!(size = script.len(), ?config, "fp2 scalar_mul");
        script
    }

    /// `[.., x, y]` into `[.., x - y]`.
    fn subtract(&self, config: ModuloConfig) -> Script {
        let script = script! {
            if config.check_constant {
                { Self::BaseField::verify_modulus() }
            }
            // x0 x1 y0 y1
            OP_ROT OP_SWAP OP_SUB
            // x0 y0 x1-y1
            OP_TOALTSTACK OP_SUB
            // x0-y0 | x1-y1
            { self.reduce(config) }
        };
        tracing::debug!(size = script.len(), ?config, "fp2 subtract");
        script
    }

    /// Fails unless the top two elements are equal, consuming both.
    fn equalverify(&self) -> Script {
        script! {
            OP_ROT OP_EQUALVERIFY
            OP_EQUALVERIFY
        }
    }

    #[inline]
    fn copy(&self, a: u32) -> Script {
        pick(a as i64 + 1, 2)
    }

    #[inline]
    fn roll(&self, a: u32) -> Script {
        roll(a as i64 + 1, 2)
    }

    fn toaltstack(&self) -> Script {
        script! {
            { Self::BaseField::toaltstack() }
            { Self::BaseField::toaltstack() }
        }
    }

    fn fromaltstack(&self) -> Script {
        script! {
            { Self::BaseField::fromaltstack() }
            { Self::BaseField::fromaltstack() }
        }
    }
}
