//! `$key` placeholder expansion from resolved dictionary values.
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Error, Result};

use super::OptionsDict;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("placeholder pattern is valid")
});

impl OptionsDict {
    /// Substitutes `$key` and `${key}` placeholders, repeating `passes` times
    /// so that values which themselves contain placeholders are expanded.
    ///
    /// Unknown keys, and dynamic entries whose dependencies are missing, are
    /// left in place. `$$` produces a literal `$`.
    pub fn expand_template(&self, text: &str, passes: usize) -> Result<String> {
        let mut expanded = text.to_string();

        for _ in 0..passes {
            let next = self.expand_once(&expanded)?;
            if next == expanded {
                break;
            }
            expanded = next;
        }

        Ok(expanded)
    }

    fn expand_once(&self, text: &str) -> Result<String> {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            output.push_str(&text[last..whole.start()]);
            last = whole.end();

            if captures.get(1).is_some() {
                output.push('$');
                continue;
            }

            let Some(key) = captures.get(2).or_else(|| captures.get(3)) else {
                output.push_str(whole.as_str());
                continue;
            };

            match self.get(key.as_str()) {
                Ok(value) => output.push_str(&value.to_string()),
                Err(Error::KeyNotFound(_)) => output.push_str(whole.as_str()),
                Err(err) => return Err(err),
            }
        }

        output.push_str(&text[last..]);
        Ok(output)
    }

    /// Reads `source`, expands it and writes the result to `target`.
    #[cfg(feature = "file-io")]
    pub fn expand_template_file(
        &self,
        source: impl AsRef<std::path::Path>,
        target: impl AsRef<std::path::Path>,
        passes: usize,
    ) -> Result<()> {
        let text = std::fs::read_to_string(source.as_ref())?;
        let expanded = self.expand_template(&text, passes)?;

        log::debug!(
            "expanded template {} into {}",
            source.as_ref().display(),
            target.as_ref().display()
        );

        std::fs::write(target.as_ref(), expanded)?;
        Ok(())
    }
}
