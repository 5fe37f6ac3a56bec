//! Quick fixes embedded in merger error messages
//!
//! Two forms can be applied automatically:
//!
//! ```text
//! ... Suggestion: add 'tools:replace="android:label"' to <activity>
//!     element at AndroidManifest.xml:22:9-24:51 to override.
//! ... Suggestion: use tools:overrideLibrary="com.mylib" to force usage
//! ```
//!
//! The first names the element's position in the primary manifest, as a
//! range or a single `line:col`, after a file path that may itself contain
//! colons. The
//! second always targets `<uses-sdk>`, located through the error record's
//! own position.

use regex::Regex;
use std::sync::LazyLock;

const MARKER: &str = "Suggestion:";

static ADD_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^\s*add 'tools:([\w:]+)="([^"]+)"' to <([\w.-]+)>\s+element at [^\r\n]+:(\d+):(\d+)(?:-[\d:]+)?\s+to override\."#,
    )
    .unwrap()
});

static USE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^\s*use tools:([\w:]+)="([^"]+)""#).unwrap());

/// Tag that "use" suggestions apply to.
pub const USES_SDK: &str = "uses-sdk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Add a tools attribute to the element at `line:column` of the primary
    /// manifest, which must be a `<tag>`.
    Add {
        attribute: String,
        value: String,
        tag: String,
        line: usize,
        column: usize,
    },
    /// Add a tools attribute to `<uses-sdk>`.
    Use { attribute: String, value: String },
    /// A suggestion this crate cannot apply.
    Unsupported { text: String },
}

impl Suggestion {
    pub fn describe(&self) -> String {
        match self {
            Self::Add {
                attribute,
                value,
                tag,
                line,
                column,
            } => format!("add tools:{attribute}=\"{value}\" to <{tag}> at {line}:{column}"),
            Self::Use { attribute, value } => {
                format!("add tools:{attribute}=\"{value}\" to <{USES_SDK}>")
            }
            Self::Unsupported { text } => format!("(manual) {text}"),
        }
    }
}

/// Extract the suggestion from a merger message, if it carries one.
pub fn parse(message: &str) -> Option<Suggestion> {
    let index = message.find(MARKER)?;
    let text = &message[index + MARKER.len()..];

    if let Some(captures) = ADD_FORMAT.captures(text) {
        let number = |i: usize| captures[i].parse::<usize>().ok();
        if let (Some(line), Some(column)) = (number(4), number(5)) {
            // tools attribute names are local names; a namespaced one here is malformed
            let attribute = captures[1].to_string();
            if !attribute.contains(':') {
                return Some(Suggestion::Add {
                    attribute,
                    value: captures[2].to_string(),
                    tag: captures[3].to_string(),
                    line,
                    column,
                });
            }
        }
    }
    if let Some(captures) = USE_FORMAT.captures(text) {
        if !captures[1].contains(':') {
            return Some(Suggestion::Use {
                attribute: captures[1].to_string(),
                value: captures[2].to_string(),
            });
        }
    }

    tracing::debug!(suggestion = text.trim(), "suggestion has no automatic fix");
    Some(Suggestion::Unsupported {
        text: text.trim().to_string(),
    })
}
