use std::fmt;

use thiserror::Error;

/// Placeholder character used in frame filename templates.
pub const PLACEHOLDER: char = '#';

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern {0:?} contains no '#' placeholder run")]
    MissingPlaceholder(String),
    #[error("pattern {0:?} contains more than one '#' placeholder run")]
    MultiplePlaceholders(String),
}

/// Filename template with one contiguous `#` run standing for a zero-padded
/// decimal frame index, e.g. `frame_#######.drc` expands to `frame_0000001.drc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePattern {
    raw: String,
    prefix: String,
    suffix: String,
    width: usize,
}

impl FramePattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let start = match raw.find(PLACEHOLDER) {
            Some(i) => i,
            None => return Err(PatternError::MissingPlaceholder(raw.to_string())),
        };
        let width = raw[start..]
            .chars()
            .take_while(|&c| c == PLACEHOLDER)
            .count();
        let suffix = &raw[start + width..];
        if suffix.contains(PLACEHOLDER) {
            return Err(PatternError::MultiplePlaceholders(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            prefix: raw[..start].to_string(),
            suffix: suffix.to_string(),
            width,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// True iff `name` is literally prefix + exactly `width` decimal digits + suffix.
    pub fn matches(&self, name: &str) -> bool {
        if name.len() != self.prefix.len() + self.width + self.suffix.len() {
            return false;
        }
        let Some(rest) = name.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        let Some(digits) = rest.strip_suffix(self.suffix.as_str()) else {
            return false;
        };
        digits.len() == self.width && digits.bytes().all(|b| b.is_ascii_digit())
    }

    /// Fills the placeholder run with `index`, zero-padded to the run width.
    pub fn expand(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.width
        )
    }
}

impl fmt::Display for FramePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_exactly_one_placeholder_run() {
        assert_eq!(
            FramePattern::parse("frame.drc").unwrap_err(),
            PatternError::MissingPlaceholder("frame.drc".to_string())
        );
        assert_eq!(
            FramePattern::parse("frame_###_###.drc").unwrap_err(),
            PatternError::MultiplePlaceholders("frame_###_###.drc".to_string())
        );

        let pattern = FramePattern::parse("frame_#######.drc").expect("valid pattern");
        assert_eq!(pattern.width(), 7);
        assert_eq!(pattern.as_str(), "frame_#######.drc");
    }

    #[test]
    fn matches_literal_text_and_digit_width() {
        let pattern = FramePattern::parse("frame_#######.drc").unwrap();

        assert!(pattern.matches("frame_0000001.drc"));
        assert!(pattern.matches("frame_9999999.drc"));

        assert!(!pattern.matches("frame_000001.drc")); // six digits
        assert!(!pattern.matches("frame_00000001.drc")); // eight digits
        assert!(!pattern.matches("frame_00a0001.drc")); // letter inside the run
        assert!(!pattern.matches("still_0000001.drc")); // wrong prefix
        assert!(!pattern.matches("frame_0000001.ktx2")); // wrong suffix
    }

    #[test]
    fn short_names_never_match() {
        let pattern = FramePattern::parse("frame_#######.drc").unwrap();
        assert!(!pattern.matches(""));
        assert!(!pattern.matches("frame_"));
        assert!(!pattern.matches(".drc"));
    }

    #[test]
    fn expand_zero_pads_to_run_width() {
        let pattern = FramePattern::parse("texture_#######.ktx2").unwrap();
        assert_eq!(pattern.expand(0), "texture_0000000.ktx2");
        assert_eq!(pattern.expand(42), "texture_0000042.ktx2");
        assert_eq!(pattern.expand(1234567), "texture_1234567.ktx2");
    }
}
