use crate::bls12_381::fp2impl::Fp2Impl;
use crate::bls12_381::fq::Fq;

/// `Fq2 = Fq[u] / (u² + 1)`, the extension the BLS12-381 twist is defined over.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fq2;

impl Fp2Impl for Fq2 {
    type BaseField = Fq;

    const NON_RESIDUE: i64 = -1;
}
