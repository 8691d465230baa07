//! Compile-time environment constants.
//!
//! Two independent pairs are injected into every target:
//!
//! - `CLIENT` / `SERVER` name the runtime platform. Exactly one of them is
//!   `true`, so first-party code can branch on platform without a runtime check
//!   and the minifier can drop the dead branch.
//! - `NODE_ENV` / `DEBUG` mirror the build mode and are substituted at
//!   `process.env.*`.
//!
//! Substitution happens in the compile step, before minification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{BuildMode, Platform};

/// A literal substituted into source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Bool(bool),
    Str(String),
}

impl ConstValue {
    /// Render as a JavaScript literal.
    pub fn to_js_literal(&self) -> String {
        match self {
            ConstValue::Bool(b) => b.to_string(),
            ConstValue::Str(s) => {
                serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            ConstValue::Str(_) => None,
        }
    }
}

/// Where a constant is visible in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstScope {
    /// A bare identifier such as `CLIENT`.
    Global,
    /// A `process.env.<NAME>` member expression.
    ProcessEnv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConstant {
    pub value: ConstValue,
    pub scope: ConstScope,
}

impl EnvConstant {
    fn global(value: bool) -> Self {
        Self {
            value: ConstValue::Bool(value),
            scope: ConstScope::Global,
        }
    }

    fn process_env(value: ConstValue) -> Self {
        Self {
            value,
            scope: ConstScope::ProcessEnv,
        }
    }
}

/// Ordered constant table for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentConstants(IndexMap<String, EnvConstant>);

impl EnvironmentConstants {
    pub fn get(&self, name: &str) -> Option<&EnvConstant> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvConstant)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|c| c.value.as_bool())
    }

    pub fn is_client(&self) -> bool {
        self.flag("CLIENT") == Some(true)
    }

    pub fn is_server(&self) -> bool {
        self.flag("SERVER") == Some(true)
    }

    /// `(expression, literal)` pairs in insertion order, ready for a
    /// `--define` style substitution.
    pub fn defines(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, c)| {
                let expr = match c.scope {
                    ConstScope::Global => name.clone(),
                    ConstScope::ProcessEnv => format!("process.env.{}", name),
                };
                (expr, c.value.to_js_literal())
            })
            .collect()
    }

    pub(crate) fn insert(&mut self, name: &str, constant: EnvConstant) {
        self.0.insert(name.to_string(), constant);
    }
}

/// Compute the constant table for `platform` under `mode`.
pub fn inject(mode: BuildMode, platform: Platform) -> EnvironmentConstants {
    let mut constants = EnvironmentConstants::default();
    constants.insert(
        "NODE_ENV",
        EnvConstant::process_env(ConstValue::Str(mode.node_env().to_string())),
    );
    constants.insert("DEBUG", EnvConstant::process_env(ConstValue::Bool(false)));

    let client = matches!(platform, Platform::Web);
    constants.insert("CLIENT", EnvConstant::global(client));
    constants.insert("SERVER", EnvConstant::global(!client));
    constants
}
