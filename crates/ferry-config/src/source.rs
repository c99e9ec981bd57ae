//! Source specification classification.
//!
//! # Design
//! - A source specification is either a directory (`photos/2024`) or a
//!   directory followed by a masked file name (`photos/2024/*.jpg`).
//! - The extension marker is the first `.` of the final path component;
//!   everything from the marker onwards is the suffix mask.
//! - Classification is pure string slicing; validation happens in
//!   [`SourceSpec::parse`].

use std::path::{PathBuf, is_separator};

use crate::error::{ConfigError, ConfigResult};

const EXTENSION_MARKER: char = '.';

/// Borrowed view of a classified source specification.
///
/// An empty `directory` signals a malformed specification; an empty `mask`
/// selects whole-directory mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedSource<'a> {
    /// Directory portion of the specification.
    pub directory: &'a str,
    /// Suffix mask, starting at the extension marker.
    pub mask: &'a str,
}

/// Split a raw source specification into its directory and suffix mask.
///
/// Only the final path component is searched for the marker, so a dotted
/// directory such as `a.b/c` or `./dir/*.txt` never yields a mask from the
/// directory part, unlike a search over the whole string.
#[must_use]
pub fn classify(raw: &str) -> ClassifiedSource<'_> {
    let name_start = raw.rfind(is_separator).map_or(0, |idx| idx + 1);
    let name = &raw[name_start..];

    let marker = match name {
        "." | ".." => None,
        _ => name.find(EXTENSION_MARKER),
    };
    let Some(marker) = marker else {
        return ClassifiedSource {
            directory: raw,
            mask: "",
        };
    };

    let directory = match name_start {
        0 => "",
        // Keep the root separator itself when the file sits directly under it.
        1 => &raw[..1],
        _ => &raw[..name_start - 1],
    };

    ClassifiedSource {
        directory,
        mask: &raw[name_start + marker..],
    }
}

/// Validated source directory plus optional suffix mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    /// Directory the transfer reads from.
    pub directory: PathBuf,
    /// Suffix mask; `None` selects whole-directory mode.
    pub mask: Option<String>,
}

impl SourceSpec {
    /// Classify and validate a raw source specification.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedSource`] when the specification is empty
    /// or names a mask without a directory in front of it.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        if raw.trim().is_empty() {
            return Err(ConfigError::MalformedSource {
                value: raw.to_string(),
                reason: "empty",
            });
        }

        let classified = classify(raw);
        if classified.directory.is_empty() {
            return Err(ConfigError::MalformedSource {
                value: raw.to_string(),
                reason: "missing_directory",
            });
        }

        Ok(Self {
            directory: PathBuf::from(classified.directory),
            mask: (!classified.mask.is_empty()).then(|| classified.mask.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn split(raw: &str) -> (&str, &str) {
        let classified = classify(raw);
        (classified.directory, classified.mask)
    }

    #[test]
    fn classify_splits_directory_and_mask() {
        assert_eq!(split("a/b/c.ext"), ("a/b", ".ext"));
        assert_eq!(split("a/b/*.txt"), ("a/b", ".txt"));
        assert_eq!(split("/srv/data/*.tar.gz"), ("/srv/data", ".tar.gz"));
    }

    #[test]
    fn classify_without_marker_selects_whole_directory() {
        assert_eq!(split("a/b/c"), ("a/b/c", ""));
        assert_eq!(split("a/b/"), ("a/b/", ""));
        assert_eq!(split("/"), ("/", ""));
    }

    #[test]
    fn classify_only_considers_final_component() {
        assert_eq!(split("./inbox/*.csv"), ("./inbox", ".csv"));
        assert_eq!(split("releases/v1.2/notes"), ("releases/v1.2/notes", ""));
        assert_eq!(split("a.b/c"), ("a.b/c", ""));
        assert_eq!(split("./dir/*.txt"), ("./dir", ".txt"));
        assert_eq!(split("../shared"), ("../shared", ""));
        assert_eq!(split("."), (".", ""));
    }

    #[test]
    fn classify_flags_missing_directory() {
        assert_eq!(split("*.txt"), ("", ".txt"));
        assert_eq!(split("/file.txt"), ("/", ".txt"));
    }

    #[test]
    fn parse_maps_empty_mask_to_whole_directory() -> Result<()> {
        let spec = SourceSpec::parse("photos/2024")?;
        assert_eq!(spec.directory, PathBuf::from("photos/2024"));
        assert!(spec.mask.is_none());

        let spec = SourceSpec::parse("photos/2024/*.jpg")?;
        assert_eq!(spec.directory, PathBuf::from("photos/2024"));
        assert_eq!(spec.mask.as_deref(), Some(".jpg"));
        Ok(())
    }

    #[test]
    fn parse_rejects_malformed_specifications() {
        assert!(matches!(
            SourceSpec::parse("*.txt"),
            Err(ConfigError::MalformedSource {
                reason: "missing_directory",
                ..
            })
        ));
        assert!(matches!(
            SourceSpec::parse("  "),
            Err(ConfigError::MalformedSource { reason: "empty", .. })
        ));
    }
}
