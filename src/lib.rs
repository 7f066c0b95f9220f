#[allow(dead_code)]
// Re-export what is needed to write treepp scripts
pub mod treepp {
    pub use crate::exec::execute_script;
    pub use bitcoin_script::{define_pushable, script};

    define_pushable!();
    pub use bitcoin::ScriptBuf as Script;
}

pub mod bls12_381;
pub mod config;
pub mod exec;
pub mod logging;
pub mod pseudo;

pub use config::ModuloConfig;

#[cfg(test)]
mod test {
    use super::treepp::*;

    #[test]
    fn test_script_true() {
        let script = script! {
            OP_TRUE
            OP_TRUE
            OP_VERIFY
        };
        let exec_result = execute_script(script);
        assert!(exec_result.success);

        let script = script! {
            OP_TRUE
            OP_VERIFY
        };
        let exec_result = execute_script(script);
        assert!(!exec_result.success);
    }
}
