/// License text prefixed to every emitted artifact.
pub const LICENSE_BANNER: &str = r#"Copyright (C)  Online-Go.com

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

 http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
"#;

/// The banner as a preserved block comment, one ` * ` prefixed line per
/// banner line, followed by a newline.
pub fn banner_comment(text: &str) -> String {
    let mut out = String::from("/*!\n");
    for line in text.lines() {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(&line.replace("*/", "* /"));
            out.push('\n');
        }
    }
    out.push_str(" */\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_comment_is_preserved_block() {
        let comment = banner_comment(LICENSE_BANNER);
        assert!(comment.starts_with("/*!\n"));
        assert!(comment.ends_with(" */\n"));
        assert!(comment.contains(" * Copyright (C)  Online-Go.com\n"));
        assert!(comment.contains(" *  http://www.apache.org/licenses/LICENSE-2.0\n"));
    }

    #[test]
    fn test_banner_comment_cannot_close_early() {
        let comment = banner_comment("a */ b");
        assert_eq!(comment.matches("*/").count(), 1);
    }
}
