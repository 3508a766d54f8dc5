//! Parsers for distribution metadata files
//!
//! Handles the core-metadata header block of `METADATA` / `PKG-INFO` and
//! the sectioned `requires.txt` written by setuptools into `.egg-info`.

use regex::Regex;
use std::sync::OnceLock;

/// A single declared requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Distribution name as written in the requirement
    pub name: String,

    /// Environment marker following `;`, if any
    pub marker: Option<String>,
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)").expect("valid regex")
    })
}

fn extra_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bextra\s*==").expect("valid regex"))
}

impl Requirement {
    /// Parse a requirement string such as `requests[socks]>=2.0; python_version < "3.8"`.
    /// Returns `None` for blank lines, comments and strings without a name.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (spec, marker) = match line.split_once(';') {
            Some((spec, marker)) => {
                let marker = marker.trim();
                (spec, (!marker.is_empty()).then(|| marker.to_string()))
            }
            None => (line, None),
        };

        let name = name_regex().captures(spec)?.get(1)?.as_str().to_string();
        Some(Self { name, marker })
    }

    /// True when the requirement only applies to an optional extra
    pub fn is_extra(&self) -> bool {
        self.marker
            .as_deref()
            .map(|m| extra_marker_regex().is_match(m))
            .unwrap_or(false)
    }
}

/// The fields of a distribution's core metadata that matter here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistMetadata {
    pub name: String,
    pub version: Option<String>,
    pub requirements: Vec<Requirement>,
}

/// Parse the header block of a `METADATA` or `PKG-INFO` file.
/// Returns `None` when no `Name` header is present.
pub fn parse_metadata(contents: &str) -> Option<DistMetadata> {
    let mut name = None;
    let mut version = None;
    let mut requirements = Vec::new();

    for line in contents.lines() {
        // The header block ends at the first blank line; the body is the description
        if line.trim().is_empty() {
            break;
        }
        // Folded continuation of the previous header
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "name" if name.is_none() => name = Some(value.to_string()),
            "version" if version.is_none() => version = Some(value.to_string()),
            "requires-dist" => requirements.extend(Requirement::parse(value)),
            _ => {}
        }
    }

    Some(DistMetadata {
        name: name.filter(|n| !n.is_empty())?,
        version,
        requirements,
    })
}

/// Parse a setuptools `requires.txt`.
///
/// Lines before the first section header are unconditional. A `[name]`
/// header starts the requirements of extra `name`, `[name:marker]` adds a
/// marker to it, and `[:marker]` is a marker-only section.
pub fn parse_requires_txt(contents: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    let mut section_marker: Option<String> = None;

    for line in contents.lines() {
        let line = line.trim();

        if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section_marker = section_to_marker(section);
            continue;
        }

        if let Some(mut req) = Requirement::parse(line) {
            req.marker = match (section_marker.as_ref(), req.marker.take()) {
                (Some(section), Some(own)) => Some(format!("({}) and ({})", section, own)),
                (Some(section), None) => Some(section.clone()),
                (None, own) => own,
            };
            requirements.push(req);
        }
    }

    requirements
}

fn section_to_marker(section: &str) -> Option<String> {
    let (extra, marker) = match section.split_once(':') {
        Some((extra, marker)) => (extra.trim(), marker.trim()),
        None => (section.trim(), ""),
    };

    match (extra.is_empty(), marker.is_empty()) {
        (true, true) => None,
        (true, false) => Some(marker.to_string()),
        (false, true) => Some(format!("extra == \"{}\"", extra)),
        (false, false) => Some(format!("extra == \"{}\" and ({})", extra, marker)),
    }
}
