use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::exec::encode_num;
use crate::treepp::{pushable, script, Script};

/// Pushes an integer of any width, using the short forms when it fits in an `i64`.
pub fn push_bigint(n: &BigInt) -> Script {
    match n.to_i64() {
        Some(n) => script! { { n } },
        None => script! { { encode_num(n) } },
    }
}

/// Copies `n_elements` consecutive items to the top.
///
/// Positive `position` is the depth of the deepest copied item (0 is the top),
/// so `[.., x_p, .., x_(p-n+1), .., x_0]` becomes `[.., x_0, x_p, .., x_(p-n+1)]`.
/// Negative `position` counts from the bottom: `-1` is the bottom item and the
/// copy proceeds towards the top.
pub fn pick(position: i64, n_elements: u32) -> Script {
    if n_elements == 0 {
        return script! {};
    }
    if position < 0 {
        let from_bottom = -position - 1;
        return script! {
            for i in 0..n_elements as i64 {
                OP_DEPTH
                if from_bottom + i == 0 {
                    OP_1SUB
                } else {
                    { from_bottom + i + 1 } OP_SUB
                }
                OP_PICK
            }
        };
    }
    assert!(
        position + 1 >= n_elements as i64,
        "cannot pick {} elements from depth {}",
        n_elements,
        position
    );
    match (position, n_elements) {
        (0, 1) => script! { OP_DUP },
        (1, 1) => script! { OP_OVER },
        (1, 2) => script! { OP_2DUP },
        (2, 3) => script! { OP_3DUP },
        (3, 2) => script! { OP_2OVER },
        _ => script! {
            for _ in 0..n_elements {
                { position } OP_PICK
            }
        },
    }
}

/// Moves `n_elements` consecutive items to the top, same addressing as [`pick`].
pub fn roll(position: i64, n_elements: u32) -> Script {
    if n_elements == 0 {
        return script! {};
    }
    if position < 0 {
        let from_bottom = -position - 1;
        return script! {
            for _ in 0..n_elements {
                OP_DEPTH
                if from_bottom == 0 {
                    OP_1SUB
                } else {
                    { from_bottom + 1 } OP_SUB
                }
                OP_ROLL
            }
        };
    }
    assert!(
        position + 1 >= n_elements as i64,
        "cannot roll {} elements from depth {}",
        n_elements,
        position
    );
    match (position, n_elements) {
        (p, n) if p + 1 == n as i64 => script! {},
        (1, 1) => script! { OP_SWAP },
        (2, 1) => script! { OP_ROT },
        (3, 2) => script! { OP_2SWAP },
        (5, 2) => script! { OP_2ROT },
        _ => script! {
            for _ in 0..n_elements {
                { position } OP_ROLL
            }
        },
    }
}

/// Fails unless the bottom of the stack equals `n`. The stack is left as it was.
pub fn verify_bottom_constant(n: &BigInt) -> Script {
    script! {
        OP_DEPTH OP_1SUB OP_PICK
        { push_bigint(n) }
        OP_EQUALVERIFY
    }
}

/// Reduces the second-to-top item modulo the top one.
///
/// After `stack_preparation` the stack must be `[.., a, q]`. The result is
/// `[.., q, a mod q]`, or `[.., a mod q]` if `is_constant_reused` is false.
/// With `is_positive` the residue lies in `[0, q)`, otherwise it keeps the
/// sign of `a`.
pub fn mod_reduce(stack_preparation: Script, is_positive: bool, is_constant_reused: bool) -> Script {
    script! {
        { stack_preparation }
        OP_TUCK OP_MOD
        if is_positive {
            OP_OVER OP_ADD OP_OVER OP_MOD
        }
        if !is_constant_reused {
            OP_NIP
        }
    }
}

/// [`mod_reduce`] applied to the top of the altstack, with `q` second-to-top
/// on the main stack: `[.., q, x] | [.., a]` becomes `[.., x, q, a mod q]`.
pub fn fromaltstack_mod(is_positive: bool, is_constant_reused: bool) -> Script {
    mod_reduce(
        script! { OP_FROMALTSTACK OP_ROT },
        is_positive,
        is_constant_reused,
    )
}
