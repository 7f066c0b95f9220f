use crate::bls12_381::fp2impl::Fp2Impl;
use crate::bls12_381::fq2::Fq2;
use crate::bls12_381::fpimpl::FpImpl;
use crate::config::ModuloConfig;
use crate::pseudo::{fromaltstack_mod, mod_reduce};
use crate::treepp::*;

/// Line evaluation scripts, built on top of an `Fq2` gadget set.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFunctions<F: Fp2Impl> {
    fq2: F,
}

impl<F: Fp2Impl> LineFunctions<F> {
    pub fn new(fq2: F) -> Self {
        Self { fq2 }
    }

    /// Evaluates at `P` the line through `T` and `Q`.
    ///
    /// stack in:  [q, ..., lambda, Q, P] | []
    /// stack out: [q, ..., ev(l_(T,Q)(P))] | []
    ///
    /// `P = (x_P, y_P)` is in `E(Fq)`, `Q = (x_Q, y_Q)` is on the sextic twist
    /// over `Fq2` and `lambda` is the gradient of the line through `T` and `Q`,
    /// or of the tangent at `T` if `T = Q`. The gradient is not checked.
    ///
    /// The result is `(lambda·x_Q - y_Q, -lambda·x_P + y_P)`, four items. The
    /// middle component of `ev(l_(T,Q)(P))` is zero and is not pushed.
    ///
    /// `is_constant_reused` leaves `q` as the second-to-top item; `clean_constant`
    /// removes it from the bottom of the stack. Without `take_modulo` the two
    /// components are left unreduced and `q` is not touched.
    pub fn line_evaluation(&self, config: ModuloConfig) -> Script {
        let script = script! {
            if config.check_constant {
                { F::BaseField::verify_modulus() }
            }
            { self.buffer(config) }
            { self.finalize(config) }
        };
        tracing::debug!(size = script.len(), ?config, "line evaluation");
        script
    }

    /// Computes the components, leaving the third one unreduced on the altstack.
    ///
    /// stack out: [q, ..., lambda·x_Q - y_Q] | [-lambda·x_P, y_P]
    ///
    /// When reducing, the first component is reduced and `q` is kept as its
    /// second-to-top item.
    fn buffer(&self, config: ModuloConfig) -> Script {
        let fq2 = &self.fq2;
        let subtract_config = if config.take_modulo {
            ModuloConfig::reduced(config.positive_modulo)
                .with_clean_constant(config.clean_constant)
                .with_constant_reused(true)
        } else {
            ModuloConfig::unreduced()
        };

        script! {
            // third component
            // lambda, x_Q, y_Q, x_P, y_P
            OP_SWAP OP_NEGATE
            // lambda, x_Q, y_Q, y_P, -x_P
            { fq2.copy(6) }
            OP_ROT
            // lambda, x_Q, y_Q, y_P, lambda, -x_P
            { fq2.scalar_mul(ModuloConfig::unreduced()) }
            { fq2.toaltstack() }
            // lambda, x_Q, y_Q, y_P | -lambda·x_P

            // second component is zero, y_P waits to be added to the third one
            OP_TOALTSTACK
            // lambda, x_Q, y_Q | -lambda·x_P, y_P

            // first component
            { fq2.roll(4) }
            { fq2.roll(4) }
            // y_Q, lambda, x_Q
            { fq2.mul(ModuloConfig::unreduced()) }
            { fq2.roll(2) }
            // lambda·x_Q, y_Q
            { fq2.subtract(subtract_config) }
            // lambda·x_Q - y_Q | -lambda·x_P, y_P
        }
    }

    /// Brings the third component back, adds `y_P` and reduces.
    ///
    /// Only the last reduction decides whether `q` stays on the stack.
    fn finalize(&self, config: ModuloConfig) -> Script {
        if !config.take_modulo {
            return script! {
                // first | -lambda·x_P, y_P
                OP_FROMALTSTACK OP_FROMALTSTACK OP_ADD
                OP_FROMALTSTACK
                // first, -lambda·x_P + y_P
            };
        }

        script! {
            // first_0, q, first_1 | -lambda·x_P, y_P
            OP_FROMALTSTACK OP_FROMALTSTACK OP_ADD
            OP_ROT
            // first, y_P - lambda_0·x_P, q | -lambda_1·x_P
            { mod_reduce(script! {}, config.positive_modulo, true) }
            { fromaltstack_mod(config.positive_modulo, config.is_constant_reused) }
            // first, third
        }
    }
}

/// Line functions over the BLS12-381 `Fq2` gadgets.
pub fn line_functions() -> LineFunctions<Fq2> {
    LineFunctions::new(Fq2)
}
