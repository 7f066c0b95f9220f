use ark_ff::PrimeField;
use num_bigint::{BigInt, BigUint};

use crate::{
    bls12_381::{fpimpl::FpImpl, fq::Fq},
    treepp::*,
};

pub fn fq_to_bigint(element: ark_bls12_381::Fq) -> BigInt {
    let n: BigUint = element.into_bigint().into();
    BigInt::from(n)
}

pub fn fq2_to_bigints(element: ark_bls12_381::Fq2) -> [BigInt; 2] {
    [fq_to_bigint(element.c0), fq_to_bigint(element.c1)]
}

pub fn fq2_push(element: ark_bls12_381::Fq2) -> Script {
    script! {
        { Fq::push(element.c0) }
        { Fq::push(element.c1) }
    }
}

/// Pushes `x, y` of a G1 point.
pub fn g1_affine_push(point: ark_bls12_381::G1Affine) -> Script {
    script! {
        { Fq::push(point.x) }
        { Fq::push(point.y) }
    }
}

/// Pushes `x0, x1, y0, y1` of a point on the twist.
pub fn g2_affine_push(point: ark_bls12_381::G2Affine) -> Script {
    script! {
        { fq2_push(point.x) }
        { fq2_push(point.y) }
    }
}
