//! Third-party modules supplied by the host instead of bundled.

use indexmap::IndexMap;

use crate::Platform;

/// Module specifier to global binding name.
pub type Externals = IndexMap<String, String>;

const WEB_EXTERNALS: &[(&str, &str)] = &[("react", "React"), ("react-dom", "ReactDOM")];

/// Externals for `platform`.
///
/// The browser bundle expects the host page to provide the UI framework as
/// globals. The server bundle carries all of its dependencies.
pub fn resolve(platform: Platform) -> Externals {
    match platform {
        Platform::Web => WEB_EXTERNALS
            .iter()
            .map(|(module, global)| (module.to_string(), global.to_string()))
            .collect(),
        Platform::Node => Externals::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_externals() {
        let ext = resolve(Platform::Web);
        assert_eq!(ext.len(), 2);
        assert_eq!(ext.get("react").map(String::as_str), Some("React"));
        assert_eq!(ext.get("react-dom").map(String::as_str), Some("ReactDOM"));
    }

    #[test]
    fn test_node_externals_empty() {
        assert!(resolve(Platform::Node).is_empty());
    }
}
