use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// MIME type carried in the meta field of a success response.
///
/// The raw string received from the server is kept verbatim; `Display`,
/// equality and hashing all go through it, so a parsed type round-trips
/// exactly (including any whitespace or RFC 2045 comments).
#[derive(Debug, Clone)]
pub struct MimeType {
    media_type: String,
    sub_type: String,
    type_string: String,
    parameters: HashMap<String, String>,
}

impl MimeType {
    /// Parses the type string returned by the server.
    ///
    /// Returns `None` when the input does not split into exactly two
    /// non-empty `/`-separated segments (which also covers empty and blank
    /// input). Empty segments are dropped before counting, so `"text/"` is
    /// rejected and `"a//b"` reads as `a/b`.
    pub fn parse(type_string: &str) -> Option<MimeType> {
        if type_string.is_empty() {
            return None;
        }
        let segments: Vec<&str> = type_string.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() != 2 {
            return None;
        }
        let media_type = segments[0];
        let rest = segments[1];

        let mut pieces = rest.split(';');
        let sub_type = pieces.next().unwrap_or(rest);

        let mut parameters = HashMap::new();
        for piece in pieces {
            if let Some((key, value)) = piece.split_once('=') {
                parameters.insert(key.trim().to_string(), clean_value(value).to_string());
            }
        }

        Some(MimeType {
            media_type: media_type.to_string(),
            sub_type: sub_type.to_string(),
            type_string: type_string.to_string(),
            parameters,
        })
    }

    /// Returns the media type (first component).
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the subtype (second component, up to the first `;`).
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Returns the optional parameters of the MIME type.
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }
}

/// Cleans a parameter value. A value wrapped in a matching pair of double
/// quotes loses exactly that pair and keeps everything between; an unquoted
/// value is cut at the first space, which drops trailing comment text like
/// `UTF-8 (default)`.
fn clean_value(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return &value[1..value.len() - 1];
    }
    match value.split_once(' ') {
        Some((first, _)) => first,
        None => value,
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_string)
    }
}

impl PartialEq for MimeType {
    fn eq(&self, other: &Self) -> bool {
        self.type_string == other.type_string
    }
}

impl Eq for MimeType {}

impl Hash for MimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_string.hash(state);
    }
}
