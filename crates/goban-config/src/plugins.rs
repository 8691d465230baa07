//! Build-time hooks attached to a descriptor.

use serde::Serialize;

use crate::banner::LICENSE_BANNER;
use crate::EnvironmentConstants;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plugin {
    /// Prefix every artifact with `text`.
    Banner { text: String },
    /// Replace constant expressions in source before minification.
    ConstantSubstitution { constants: EnvironmentConstants },
}

/// The shared base list. Built once per invocation and cloned into each
/// descriptor; descriptors never share it by reference.
pub fn base_plugins() -> Vec<Plugin> {
    vec![Plugin::Banner {
        text: LICENSE_BANNER.to_string(),
    }]
}

/// Base list plus the target's own constant substitution.
pub fn for_target(base: &[Plugin], constants: &EnvironmentConstants) -> Vec<Plugin> {
    let mut plugins = base.to_vec();
    plugins.push(Plugin::ConstantSubstitution {
        constants: constants.clone(),
    });
    plugins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{env, BuildMode, Platform};

    #[test]
    fn test_for_target_does_not_touch_base() {
        let base = base_plugins();
        let web = for_target(&base, &env::inject(BuildMode::Production, Platform::Web));
        let node = for_target(&base, &env::inject(BuildMode::Production, Platform::Node));

        assert_eq!(base.len(), 1);
        assert_eq!(web.len(), 2);
        assert_eq!(node.len(), 2);
        assert_ne!(web[1], node[1]);
    }
}
