// Native counterpart of the line evaluation script, used to prepare the
// gradient that the script trusts and the values it must produce.

use ark_bls12_381::{Fq2, G1Affine, G2Affine};
use ark_ff::{Field, Zero};

use crate::bls12_381::utils::fq2_push;
use crate::treepp::{pushable, script, Script};

/// Slope of the line through `t` and `q`, or of the tangent at `t` if `t == q`.
///
/// Returns `None` for vertical lines and when either point is the identity.
pub fn gradient(t: &G2Affine, q: &G2Affine) -> Option<Fq2> {
    if t.infinity || q.infinity {
        return None;
    }
    if t == q {
        // 3x² / 2y
        let x_squared = t.x.square();
        return (t.y.double()).inverse().map(|inv| (x_squared.double() + x_squared) * inv);
    }
    (q.x - t.x).inverse().map(|inv| (q.y - t.y) * inv)
}

/// `ev(l_(T,Q)(P)) = (λ·x_Q - y_Q, 0, -λ·x_P + y_P)` over `Fq12` seen as a
/// cubic extension of `Fq4`.
///
/// Only the first and third components are stored; the second one is zero for
/// every line and is never put on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineEvaluation {
    pub first: Fq2,
    pub third: Fq2,
}

impl LineEvaluation {
    /// Evaluates at `p` the line with slope `gradient` through `q`.
    pub fn evaluate(gradient: Fq2, q: &G2Affine, p: &G1Affine) -> Self {
        let first = gradient * q.x - q.y;
        let mut third = -gradient;
        third.mul_assign_by_fp(&p.x);
        third.c0 += p.y;
        Self { first, third }
    }

    /// Evaluates at `p` the secant through `t` and `q` (the tangent if `t == q`).
    pub fn through(t: &G2Affine, q: &G2Affine, p: &G1Affine) -> Option<Self> {
        gradient(t, q).map(|lambda| Self::evaluate(lambda, q, p))
    }

    #[inline]
    pub fn second(&self) -> Fq2 {
        Fq2::zero()
    }

    pub fn to_components(&self) -> [Fq2; 3] {
        [self.first, self.second(), self.third]
    }

    /// Pushes `first, third`, the layout left by the line evaluation script.
    pub fn push(&self) -> Script {
        script! {
            { fq2_push(self.first) }
            { fq2_push(self.third) }
        }
    }
}
