use serde::{Deserialize, Serialize};

/// Reduction settings shared by every field gadget.
///
/// `q` is expected at the bottom of the stack whenever `take_modulo` or
/// `check_constant` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuloConfig {
    /// Reduce the results modulo `q`. When unset, results are wide integers.
    pub take_modulo: bool,
    /// Map residues into `[0, q)` instead of `(-q, q)`.
    pub positive_modulo: bool,
    /// Assert that the bottom of the stack holds `q` before doing anything.
    pub check_constant: bool,
    /// Roll `q` out of the bottom of the stack instead of copying it.
    pub clean_constant: bool,
    /// Leave a copy of `q` as the second-to-top element after the last reduction.
    pub is_constant_reused: bool,
}

impl Default for ModuloConfig {
    fn default() -> Self {
        Self {
            take_modulo: true,
            positive_modulo: true,
            check_constant: false,
            clean_constant: false,
            is_constant_reused: false,
        }
    }
}

impl ModuloConfig {
    /// Wide arithmetic, no reduction, `q` untouched.
    pub const fn unreduced() -> Self {
        Self {
            take_modulo: false,
            positive_modulo: true,
            check_constant: false,
            clean_constant: false,
            is_constant_reused: false,
        }
    }

    pub const fn reduced(positive_modulo: bool) -> Self {
        Self {
            take_modulo: true,
            positive_modulo,
            check_constant: false,
            clean_constant: false,
            is_constant_reused: false,
        }
    }

    pub const fn with_check_constant(mut self, check_constant: bool) -> Self {
        self.check_constant = check_constant;
        self
    }

    pub const fn with_clean_constant(mut self, clean_constant: bool) -> Self {
        self.clean_constant = clean_constant;
        self
    }

    pub const fn with_constant_reused(mut self, is_constant_reused: bool) -> Self {
        self.is_constant_reused = is_constant_reused;
        self
    }
}

#[cfg(test)]
mod test {
    use super::ModuloConfig;

    #[test]
    fn test_modulo_config_from_json() {
        let config: ModuloConfig =
            serde_json::from_str(r#"{ "check_constant": true, "clean_constant": true }"#).unwrap();
        assert_eq!(
            config,
            ModuloConfig::reduced(true)
                .with_check_constant(true)
                .with_clean_constant(true)
        );

        let config: ModuloConfig = serde_json::from_str(r#"{ "take_modulo": false }"#).unwrap();
        assert_eq!(config, ModuloConfig::unreduced());
    }
}
