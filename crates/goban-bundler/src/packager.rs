//! Module wrapping and banner text around a compiled bundle.
//!
//! The compiler emits a CommonJS body. For the browser target that body is
//! wrapped in a universal module definition so the one artifact loads as a
//! CommonJS module (`module.exports` or a named `exports` member), as an AMD
//! module, or as a global on the root object. Externals become factory
//! parameters and are handed back to the body through a local `require`.

use goban_config::banner::banner_comment;
use goban_config::{Externals, ModuleWrapping};

/// Text placed before and after the compiled body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wrapper {
    pub prologue: String,
    pub epilogue: String,
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

/// Render the wrapper for `wrapping`, prefixed with `banner` when given.
pub fn render_wrapper(
    wrapping: &ModuleWrapping,
    externals: &Externals,
    banner: Option<&str>,
) -> Wrapper {
    let mut prologue = banner.map(banner_comment).unwrap_or_default();

    match wrapping {
        ModuleWrapping::CommonJs => Wrapper {
            prologue,
            epilogue: String::new(),
        },
        ModuleWrapping::Umd { library_name } => {
            let modules: Vec<String> = externals.keys().map(|m| quote(m)).collect();
            let params: Vec<String> = (0..externals.len())
                .map(|i| format!("__goban_external_{}__", i))
                .collect();
            let requires = modules
                .iter()
                .map(|m| format!("require({})", m))
                .collect::<Vec<_>>()
                .join(", ");
            let roots = externals
                .values()
                .map(|global| format!("root[{}]", quote(global)))
                .collect::<Vec<_>>()
                .join(", ");
            let name = quote(library_name);

            prologue.push_str(&format!(
                "(function webpackUniversalModuleDefinition(root, factory) {{\n\
                 \tif (typeof exports === 'object' && typeof module === 'object')\n\
                 \t\tmodule.exports = factory({requires});\n\
                 \telse if (typeof define === 'function' && define.amd)\n\
                 \t\tdefine([{amd}], factory);\n\
                 \telse if (typeof exports === 'object')\n\
                 \t\texports[{name}] = factory({requires});\n\
                 \telse\n\
                 \t\troot[{name}] = factory({roots});\n\
                 }})(typeof self !== 'undefined' ? self : this, function ({params}) {{\n\
                 var module = {{ exports: {{}} }};\n\
                 var exports = module.exports;\n",
                amd = modules.join(", "),
                params = params.join(", "),
            ));

            prologue.push_str("var require = function (id) {\n\tswitch (id) {\n");
            for (module, param) in modules.iter().zip(&params) {
                prologue.push_str(&format!("\t\tcase {}: return {};\n", module, param));
            }
            prologue.push_str(
                "\t}\n\tthrow new Error(\"Cannot find module '\" + id + \"'\");\n};\n",
            );

            Wrapper {
                prologue,
                epilogue: "\nreturn module.exports;\n});\n".to_string(),
            }
        }
    }
}
