use crate::bls12_381::fpimpl::FpImpl;

/// Base field of BLS12-381.
pub struct Fq;

impl FpImpl for Fq {
    const MODULUS: &'static str = "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaaab";

    type ConstantType = ark_bls12_381::Fq;
}

#[cfg(test)]
mod test {
    use crate::bls12_381::fpimpl::FpImpl;
    use crate::bls12_381::fq::Fq;
    use crate::treepp::*;
    use ark_ff::PrimeField;
    use ark_std::UniformRand;
    use num_bigint::{BigInt, BigUint};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_bls12_381_modulus() {
        let modulus: BigUint = ark_bls12_381::Fq::MODULUS.into();
        assert_eq!(Fq::modulus_as_bigint(), BigInt::from(modulus));
    }

    #[test]
    fn test_bls12_381_fq_push() {
        let mut prng = ChaCha20Rng::seed_from_u64(0);

        for _ in 0..10 {
            let a = ark_bls12_381::Fq::rand(&mut prng);
            let b = ark_bls12_381::Fq::rand(&mut prng);

            let script = script! {
                { Fq::push_modulus() }
                { Fq::push(a) }
                { Fq::push(b) }
                OP_MUL
                { Fq::push_modulus() }
                OP_MOD
                { Fq::push(a * b) }
                OP_EQUALVERIFY
                { Fq::verify_modulus() }
                OP_TRUE
            };
            let exec_result = execute_script(script);
            assert!(exec_result.success, "{}", exec_result);
        }
    }

    #[test]
    fn test_bls12_381_fq_copy_roll() {
        let script = script! {
            1 2 3
            { Fq::copy(2) }
            { Fq::roll(1) }
            { Fq::toaltstack() }
            { Fq::roll(2) }
            { Fq::fromaltstack() }
        };
        let exec_result = execute_script(script);
        let expected: Vec<BigInt> = [2, 1, 1, 3].into_iter().map(BigInt::from).collect();
        assert_eq!(exec_result.final_stack_numbers(), expected);
    }
}
