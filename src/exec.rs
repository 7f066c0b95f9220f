//! Interpreter for generated scripts.
//!
//! Numbers use Bitcoin's little-endian sign-magnitude encoding but are not
//! limited to four bytes, and `OP_MUL`, `OP_DIV` and `OP_MOD` are enabled.
//! Division truncates toward zero, so `OP_MOD` takes the sign of the dividend.

use core::fmt;

use bitcoin::opcodes::all::*;
use bitcoin::opcodes::{Class, ClassifyContext, Opcode};
use bitcoin::script::Instruction;
use bitcoin::ScriptBuf;
use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("stack underflow in {0:?}")]
    StackUnderflow(Opcode),

    #[error("altstack underflow")]
    AltStackUnderflow,

    #[error("{0:?} failed")]
    Verify(Opcode),

    #[error("invalid stack position {position} for {opcode:?}")]
    InvalidPosition { opcode: Opcode, position: BigInt },

    #[error("division by zero in {0:?}")]
    DivisionByZero(Opcode),

    #[error("unsupported opcode {0:?}")]
    UnsupportedOpcode(Opcode),

    #[error("OP_RETURN reached")]
    OpReturn,

    #[error("malformed script: {0}")]
    Malformed(String),
}

/// Outcome of running a script to completion or to its first error.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// No error occurred and the top of the stack is true.
    pub success: bool,
    pub error: Option<ExecError>,
    /// Opcode that raised `error`, if any.
    pub opcode: Option<Opcode>,
    pub final_stack: Vec<Vec<u8>>,
    pub alt_stack: Vec<Vec<u8>>,
}

impl ExecutionResult {
    /// Final main stack decoded as numbers, bottom first.
    pub fn final_stack_numbers(&self) -> Vec<BigInt> {
        self.final_stack.iter().map(|item| decode_num(item)).collect()
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "success: {}", self.success)?;
        if let Some(error) = &self.error {
            writeln!(f, "error: {}", error)?;
        }
        if let Some(opcode) = &self.opcode {
            writeln!(f, "opcode: {:?}", opcode)?;
        }
        write!(f, "stack:")?;
        for (index, item) in self.final_stack.iter().enumerate() {
            write!(f, "\n{}:\t0x{}", index, hex::encode(item))?;
        }
        write!(f, "\naltstack:")?;
        for (index, item) in self.alt_stack.iter().enumerate() {
            write!(f, "\n{}:\t0x{}", index, hex::encode(item))?;
        }
        Ok(())
    }
}

/// Minimal script-number encoding of `n`.
pub fn encode_num(n: &BigInt) -> Vec<u8> {
    if n.is_zero() {
        return vec![];
    }
    let mut bytes = n.magnitude().to_bytes_le();
    let negative = n.sign() == Sign::Minus;
    let last = bytes.len() - 1;
    if bytes[last] & 0x80 != 0 {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        bytes[last] |= 0x80;
    }
    bytes
}

/// Decodes a script number; non-minimal encodings are accepted.
pub fn decode_num(bytes: &[u8]) -> BigInt {
    let Some((&last, _)) = bytes.split_last() else {
        return BigInt::zero();
    };
    let mut magnitude = bytes.to_vec();
    let last_index = magnitude.len() - 1;
    magnitude[last_index] = last & 0x7f;
    let n = BigInt::from_bytes_le(Sign::Plus, &magnitude);
    if last & 0x80 != 0 {
        -n
    } else {
        n
    }
}

fn cast_to_bool(bytes: &[u8]) -> bool {
    for (i, byte) in bytes.iter().enumerate() {
        if *byte != 0 {
            // negative zero is false
            return !(i == bytes.len() - 1 && *byte == 0x80);
        }
    }
    false
}

#[derive(Default)]
struct Exec {
    stack: Vec<Vec<u8>>,
    altstack: Vec<Vec<u8>>,
}

impl Exec {
    fn push_num(&mut self, n: &BigInt) {
        self.stack.push(encode_num(n));
    }

    fn push_bool(&mut self, b: bool) {
        self.push_num(&BigInt::from(b as u8));
    }

    fn check_depth(&self, opcode: Opcode, n: usize) -> Result<(), ExecError> {
        if self.stack.len() < n {
            return Err(ExecError::StackUnderflow(opcode));
        }
        Ok(())
    }

    fn pop(&mut self, opcode: Opcode) -> Result<Vec<u8>, ExecError> {
        self.stack.pop().ok_or(ExecError::StackUnderflow(opcode))
    }

    fn pop_num(&mut self, opcode: Opcode) -> Result<BigInt, ExecError> {
        Ok(decode_num(&self.pop(opcode)?))
    }

    /// Copy of the item `depth` positions below the top.
    fn peek(&self, opcode: Opcode, depth: usize) -> Result<Vec<u8>, ExecError> {
        self.check_depth(opcode, depth + 1)?;
        Ok(self.stack[self.stack.len() - 1 - depth].clone())
    }

    fn remove(&mut self, opcode: Opcode, depth: usize) -> Result<Vec<u8>, ExecError> {
        self.check_depth(opcode, depth + 1)?;
        let index = self.stack.len() - 1 - depth;
        Ok(self.stack.remove(index))
    }

    fn pop_position(&mut self, opcode: Opcode) -> Result<usize, ExecError> {
        let position = self.pop_num(opcode)?;
        match usize::try_from(&position) {
            Ok(depth) if depth < self.stack.len() => Ok(depth),
            _ => Err(ExecError::InvalidPosition { opcode, position }),
        }
    }

    fn unary(&mut self, opcode: Opcode, f: impl Fn(BigInt) -> BigInt) -> Result<(), ExecError> {
        let a = self.pop_num(opcode)?;
        self.push_num(&f(a));
        Ok(())
    }

    fn binary(
        &mut self,
        opcode: Opcode,
        f: impl Fn(BigInt, BigInt) -> Result<BigInt, ExecError>,
    ) -> Result<(), ExecError> {
        self.check_depth(opcode, 2)?;
        let b = self.pop_num(opcode)?;
        let a = self.pop_num(opcode)?;
        let c = f(a, b)?;
        self.push_num(&c);
        Ok(())
    }

    fn execute_opcode(&mut self, opcode: Opcode) -> Result<(), ExecError> {
        if let Class::PushNum(n) = opcode.classify(ClassifyContext::Legacy) {
            self.push_num(&BigInt::from(n));
            return Ok(());
        }

        let bool_num = |b: bool| BigInt::from(b as u8);

        match opcode {
            OP_NOP => {}
            OP_VERIFY => {
                let top = self.pop(opcode)?;
                if !cast_to_bool(&top) {
                    return Err(ExecError::Verify(opcode));
                }
            }
            OP_RETURN => return Err(ExecError::OpReturn),

            // altstack
            OP_TOALTSTACK => {
                let top = self.pop(opcode)?;
                self.altstack.push(top);
            }
            OP_FROMALTSTACK => {
                let top = self.altstack.pop().ok_or(ExecError::AltStackUnderflow)?;
                self.stack.push(top);
            }

            // stack manipulation
            OP_2DROP => {
                self.check_depth(opcode, 2)?;
                self.stack.truncate(self.stack.len() - 2);
            }
            OP_2DUP => {
                let a = self.peek(opcode, 1)?;
                let b = self.peek(opcode, 0)?;
                self.stack.extend([a, b]);
            }
            OP_3DUP => {
                let a = self.peek(opcode, 2)?;
                let b = self.peek(opcode, 1)?;
                let c = self.peek(opcode, 0)?;
                self.stack.extend([a, b, c]);
            }
            OP_2OVER => {
                let a = self.peek(opcode, 3)?;
                let b = self.peek(opcode, 2)?;
                self.stack.extend([a, b]);
            }
            OP_2ROT => {
                let a = self.remove(opcode, 5)?;
                let b = self.remove(opcode, 4)?;
                self.stack.extend([a, b]);
            }
            OP_2SWAP => {
                let a = self.remove(opcode, 3)?;
                let b = self.remove(opcode, 2)?;
                self.stack.extend([a, b]);
            }
            OP_IFDUP => {
                let top = self.peek(opcode, 0)?;
                if cast_to_bool(&top) {
                    self.stack.push(top);
                }
            }
            OP_DEPTH => self.push_num(&BigInt::from(self.stack.len())),
            OP_DROP => {
                self.pop(opcode)?;
            }
            OP_DUP => {
                let top = self.peek(opcode, 0)?;
                self.stack.push(top);
            }
            OP_NIP => {
                self.remove(opcode, 1)?;
            }
            OP_OVER => {
                let a = self.peek(opcode, 1)?;
                self.stack.push(a);
            }
            OP_PICK => {
                let depth = self.pop_position(opcode)?;
                let a = self.peek(opcode, depth)?;
                self.stack.push(a);
            }
            OP_ROLL => {
                let depth = self.pop_position(opcode)?;
                let a = self.remove(opcode, depth)?;
                self.stack.push(a);
            }
            OP_ROT => {
                let a = self.remove(opcode, 2)?;
                self.stack.push(a);
            }
            OP_SWAP => {
                let a = self.remove(opcode, 1)?;
                self.stack.push(a);
            }
            OP_TUCK => {
                self.check_depth(opcode, 2)?;
                let top = self.peek(opcode, 0)?;
                let index = self.stack.len() - 2;
                self.stack.insert(index, top);
            }
            OP_SIZE => {
                let size = self.peek(opcode, 0)?.len();
                self.push_num(&BigInt::from(size));
            }

            // equality
            OP_EQUAL | OP_EQUALVERIFY => {
                self.check_depth(opcode, 2)?;
                let b = self.pop(opcode)?;
                let a = self.pop(opcode)?;
                if opcode == OP_EQUALVERIFY {
                    if a != b {
                        return Err(ExecError::Verify(opcode));
                    }
                } else {
                    self.push_bool(a == b);
                }
            }

            // unary arithmetic
            OP_1ADD => self.unary(opcode, |a| a + 1)?,
            OP_1SUB => self.unary(opcode, |a| a - 1)?,
            OP_2MUL => self.unary(opcode, |a| a << 1)?,
            OP_NEGATE => self.unary(opcode, |a| -a)?,
            OP_ABS => self.unary(opcode, |a| a.abs())?,
            OP_NOT => self.unary(opcode, |a| bool_num(a.is_zero()))?,
            OP_0NOTEQUAL => self.unary(opcode, |a| bool_num(!a.is_zero()))?,

            // binary arithmetic
            OP_ADD => self.binary(opcode, |a, b| Ok(a + b))?,
            OP_SUB => self.binary(opcode, |a, b| Ok(a - b))?,
            OP_MUL => self.binary(opcode, |a, b| Ok(a * b))?,
            OP_DIV | OP_MOD => self.binary(opcode, |a, b| {
                if b.is_zero() {
                    return Err(ExecError::DivisionByZero(opcode));
                }
                Ok(if opcode == OP_DIV { a / b } else { a % b })
            })?,
            OP_BOOLAND => self.binary(opcode, |a, b| Ok(bool_num(!a.is_zero() && !b.is_zero())))?,
            OP_BOOLOR => self.binary(opcode, |a, b| Ok(bool_num(!a.is_zero() || !b.is_zero())))?,
            OP_NUMEQUAL => self.binary(opcode, |a, b| Ok(bool_num(a == b)))?,
            OP_NUMNOTEQUAL => self.binary(opcode, |a, b| Ok(bool_num(a != b)))?,
            OP_LESSTHAN => self.binary(opcode, |a, b| Ok(bool_num(a < b)))?,
            OP_GREATERTHAN => self.binary(opcode, |a, b| Ok(bool_num(a > b)))?,
            OP_LESSTHANOREQUAL => self.binary(opcode, |a, b| Ok(bool_num(a <= b)))?,
            OP_GREATERTHANOREQUAL => self.binary(opcode, |a, b| Ok(bool_num(a >= b)))?,
            OP_MIN => self.binary(opcode, |a, b| Ok(a.min(b)))?,
            OP_MAX => self.binary(opcode, |a, b| Ok(a.max(b)))?,
            OP_NUMEQUALVERIFY => {
                self.check_depth(opcode, 2)?;
                let b = self.pop_num(opcode)?;
                let a = self.pop_num(opcode)?;
                if a != b {
                    return Err(ExecError::Verify(opcode));
                }
            }

            _ => return Err(ExecError::UnsupportedOpcode(opcode)),
        }
        Ok(())
    }
}

/// Runs `script` on an empty stack.
pub fn execute_script(script: ScriptBuf) -> ExecutionResult {
    let mut exec = Exec::default();
    let mut error = None;
    let mut failed_opcode = None;

    for instruction in script.instructions() {
        let res = match instruction {
            Ok(Instruction::PushBytes(bytes)) => {
                exec.stack.push(bytes.as_bytes().to_vec());
                Ok(())
            }
            Ok(Instruction::Op(opcode)) => {
                let res = exec.execute_opcode(opcode);
                if res.is_err() {
                    failed_opcode = Some(opcode);
                }
                res
            }
            Err(e) => Err(ExecError::Malformed(e.to_string())),
        };
        if let Err(e) = res {
            trace!(error = %e, depth = exec.stack.len(), "script execution failed");
            error = Some(e);
            break;
        }
    }

    let success = error.is_none() && exec.stack.last().is_some_and(|top| cast_to_bool(top));

    ExecutionResult {
        success,
        error,
        opcode: failed_opcode,
        final_stack: exec.stack,
        alt_stack: exec.altstack,
    }
}

#[cfg(test)]
mod test {
    use super::{decode_num, encode_num, ExecError};
    use crate::treepp::*;
    use bitcoin::opcodes::all::{OP_EQUALVERIFY, OP_MOD, OP_ROT};
    use num_bigint::{BigInt, RandBigInt};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_num_encoding() {
        assert_eq!(encode_num(&BigInt::from(0)), Vec::<u8>::new());
        assert_eq!(encode_num(&BigInt::from(1)), vec![0x01]);
        assert_eq!(encode_num(&BigInt::from(-1)), vec![0x81]);
        assert_eq!(encode_num(&BigInt::from(128)), vec![0x80, 0x00]);
        assert_eq!(encode_num(&BigInt::from(-128)), vec![0x80, 0x80]);
        assert_eq!(encode_num(&BigInt::from(-255)), vec![0xff, 0x80]);
        assert_eq!(decode_num(&[0x00, 0x00]), BigInt::from(0));

        let mut prng = ChaCha20Rng::seed_from_u64(0);
        for _ in 0..20 {
            let n = prng.gen_bigint(400);
            assert_eq!(decode_num(&encode_num(&n)), n);
        }
    }

    #[test]
    fn test_wide_arithmetic() {
        let mut prng = ChaCha20Rng::seed_from_u64(0);

        for _ in 0..20 {
            let a = prng.gen_bigint(300);
            let b = prng.gen_bigint(300);
            let q = prng.gen_bigint(200);

            let script = script! {
                { encode_num(&a) }
                { encode_num(&b) }
                OP_MUL
                { encode_num(&q) }
                OP_MOD
                { encode_num(&((&a * &b) % &q)) }
                OP_EQUALVERIFY
                OP_TRUE
            };
            let exec_result = execute_script(script);
            assert!(exec_result.success, "{}", exec_result);
        }
    }

    #[test]
    fn test_mod_sign_follows_dividend() {
        let script = script! {
            { -7 } 3 OP_MOD
            7 { -3 } OP_MOD
            { -7 } 3 OP_DIV
        };
        let exec_result = execute_script(script);
        assert_eq!(
            exec_result.final_stack_numbers(),
            vec![BigInt::from(-1), BigInt::from(1), BigInt::from(-2)]
        );
    }

    #[test]
    fn test_stack_ops() {
        let script = script! {
            1 2 3 4 5 6
            OP_2ROT
            OP_2SWAP
            OP_TUCK
        };
        let exec_result = execute_script(script);
        let expected: Vec<BigInt> = [3, 4, 1, 2, 6, 5, 6].into_iter().map(BigInt::from).collect();
        assert_eq!(exec_result.final_stack_numbers(), expected);

        let script = script! {
            1 2 3
            OP_DEPTH OP_1SUB OP_ROLL
            OP_TOALTSTACK 1 OP_PICK OP_FROMALTSTACK
        };
        let exec_result = execute_script(script);
        let expected: Vec<BigInt> = [2, 3, 2, 1].into_iter().map(BigInt::from).collect();
        assert_eq!(exec_result.final_stack_numbers(), expected);
    }

    #[test]
    fn test_failures() {
        let exec_result = execute_script(script! { 1 OP_ROT });
        assert!(!exec_result.success);
        assert_eq!(exec_result.error, Some(ExecError::StackUnderflow(OP_ROT)));

        let exec_result = execute_script(script! { 1 2 OP_EQUALVERIFY OP_TRUE });
        assert!(!exec_result.success);
        assert_eq!(exec_result.error, Some(ExecError::Verify(OP_EQUALVERIFY)));
        assert_eq!(exec_result.opcode, Some(OP_EQUALVERIFY));

        let exec_result = execute_script(script! { 5 0 OP_MOD });
        assert_eq!(exec_result.error, Some(ExecError::DivisionByZero(OP_MOD)));

        let exec_result = execute_script(script! { OP_FROMALTSTACK });
        assert_eq!(exec_result.error, Some(ExecError::AltStackUnderflow));

        let exec_result = execute_script(script! { 1 5 OP_PICK });
        assert!(matches!(exec_result.error, Some(ExecError::InvalidPosition { .. })));
    }
}
