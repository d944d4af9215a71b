//! Version switching for Siv3D project files.
//!
//! Visual Studio projects built against Siv3D reference the SDK through a
//! versioned macro such as `$(SIV3D_0_6_10)`. [`VersionPatch`] rewrites every
//! such token to name another version.

use anyhow::{Context, Result};
use regex_lite::{NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const DEFAULT_VERSION: &str = "0_6_12";
pub const DEFAULT_PROJECT_FILE: &str = "ExStaticLib.vcxproj";
pub const DEFAULT_PREFIX: &str = "SIV3D_";

static DEFAULT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    token_regex(DEFAULT_PREFIX).expect("default macro token pattern is valid")
});

/// `$(<prefix><digits>_<digits>_<digits>)`
///
/// `\d` in regex-lite matches ASCII digits only, so tokens spelled with
/// other Unicode digits are left alone.
fn token_regex(prefix: &str) -> Result<Regex> {
    let pattern = format!(r"\$\({}\d+_\d+_\d+\)", regex_lite::escape(prefix));
    Regex::new(&pattern).with_context(|| format!("Invalid macro token pattern: {}", pattern))
}

/// Result of applying a [`VersionPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub text: String,
    pub replacements: usize,
}

/// Replaces versioned macro tokens with one naming `version`.
///
/// The version is inserted verbatim and never validated, so `1_0_0`,
/// `latest` and `$HOME` all end up in the output as typed.
#[derive(Debug, Clone)]
pub struct VersionPatch {
    prefix: String,
    version: String,
    token: Regex,
}

impl VersionPatch {
    /// Patch `$(SIV3D_x_y_z)` tokens.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            version: version.into(),
            token: DEFAULT_TOKEN.clone(),
        }
    }

    /// Patch `$(<prefix>x_y_z)` tokens instead. `prefix` is matched literally.
    pub fn with_prefix(prefix: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let token = token_regex(&prefix)?;
        Ok(Self {
            prefix,
            version: version.into(),
            token,
        })
    }

    /// The token every match is replaced with.
    pub fn replacement(&self) -> String {
        format!("$({}{})", self.prefix, self.version)
    }

    /// Replace every token in `contents`. Text outside the tokens is untouched.
    pub fn apply(&self, contents: &str) -> Patched {
        let replacements = self.token.find_iter(contents).count();
        if replacements == 0 {
            return Patched {
                text: contents.to_string(),
                replacements,
            };
        }

        let replacement = self.replacement();
        let text = self
            .token
            .replace_all(contents, NoExpand(&replacement))
            .into_owned();
        Patched { text, replacements }
    }

    /// Rewrite the file at `path` in place.
    ///
    /// The file is only written after it was read successfully and at least
    /// one token matched.
    pub fn apply_to_file(&self, path: impl AsRef<Path>) -> Result<Patched> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;

        let patched = self.apply(&contents);
        if patched.replacements == 0 {
            info!(path = %path.display(), "No macro tokens found, file left unchanged");
            return Ok(patched);
        }

        std::fs::write(path, &patched.text)
            .with_context(|| format!("Failed to write project file: {}", path.display()))?;
        debug!(bytes = patched.text.len(), "Wrote patched project file");
        info!(
            path = %path.display(),
            replacements = patched.replacements,
            to = %self.replacement(),
            "Switched version"
        );
        Ok(patched)
    }
}

/// Replace every `$(SIV3D_x_y_z)` token in `contents` with `$(SIV3D_<version>)`.
pub fn patch_str(contents: &str, version: &str) -> Patched {
    VersionPatch::new(version).apply(contents)
}

/// Rewrite every `$(SIV3D_x_y_z)` token in the file at `path`.
pub fn patch_file(path: impl AsRef<Path>, version: &str) -> Result<Patched> {
    VersionPatch::new(version).apply_to_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<Project>
  <ItemDefinitionGroup>
    <ClCompile>
      <AdditionalIncludeDirectories>$(SIV3D_0_6_10)\include;$(SIV3D_0_6_10)\include\ThirdParty;%(AdditionalIncludeDirectories)</AdditionalIncludeDirectories>
    </ClCompile>
  </ItemDefinitionGroup>
</Project>
"#;

    #[test]
    fn test_replaces_token() {
        let patched = patch_str("x $(SIV3D_0_6_10) y", "0_6_12");
        assert_eq!(patched.text, "x $(SIV3D_0_6_12) y");
        assert_eq!(patched.replacements, 1);
    }

    #[test]
    fn test_replaces_every_occurrence_only() {
        let patched = patch_str(PROJECT, "0_6_12");
        assert_eq!(patched.replacements, 2);
        assert_eq!(patched.text, PROJECT.replace("SIV3D_0_6_10", "SIV3D_0_6_12"));
    }

    #[test]
    fn test_multi_digit_groups() {
        let patched = patch_str("$(SIV3D_10_20_300)", "0_7_0");
        assert_eq!(patched.text, "$(SIV3D_0_7_0)");
    }

    #[test]
    fn test_patch_is_a_fixed_point() {
        let once = patch_str(PROJECT, "0_6_12");
        let twice = patch_str(&once.text, "0_6_12");
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_no_match_is_unchanged() {
        for text in ["", "plain text", "$(SIV3D)", "$(SIV3D_0_6)", "SIV3D_0_6_10", "$(SIV3D_a_b_c)"] {
            let patched = patch_str(text, "0_6_12");
            assert_eq!(patched.text, text);
            assert_eq!(patched.replacements, 0);
        }
    }

    #[test]
    fn test_version_is_inserted_literally() {
        let patched = patch_str("$(SIV3D_0_6_10)", "$1_${x}");
        assert_eq!(patched.text, "$(SIV3D_$1_${x})");
    }

    #[test]
    fn test_non_ascii_digits_do_not_match() {
        let patched = patch_str("$(SIV3D_０_６_１０)", "0_6_12");
        assert_eq!(patched.replacements, 0);
    }

    #[test]
    fn test_custom_prefix_is_escaped() {
        let patch = VersionPatch::with_prefix("SDK.", "2_0_0").unwrap();
        assert_eq!(patch.apply("$(SDK.1_0_0)").text, "$(SDK.2_0_0)");
        assert_eq!(patch.apply("$(SDKx1_0_0)").replacements, 0);
    }
}
