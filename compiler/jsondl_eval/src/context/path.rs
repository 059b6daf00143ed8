//! Location inside the validated value.

use std::fmt::Write;

/// One step of the data path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// Entered an object pattern; renders as nothing.
    Object,
    Property(String),
    Index(usize),
}

/// Render segments as `$.a.b[3]`.
pub(super) fn render(segments: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        match segment {
            PathSegment::Object => {}
            PathSegment::Property(name) if is_plain(name) => {
                out.push('.');
                out.push_str(name);
            }
            PathSegment::Property(name) => {
                let _ = write!(out, "[{}]", serde_json::Value::from(name.as_str()));
            }
            PathSegment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

fn is_plain(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
