use base64::Engine as _;

use crate::foundation::error::{CitizenError, CitizenResult};

const DATA_URI_PREFIX: &str = "data:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn is_svg(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("image/svg+xml")
    }

    pub fn text(&self) -> CitizenResult<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| CitizenError::metadata(format!("data uri is not utf-8: {e}")))
    }
}

/// Decode an RFC 2397 `data:` URI. Base64 payloads may contain whitespace;
/// anything else is percent-decoded.
pub fn decode_data_uri(uri: &str) -> CitizenResult<DataUri> {
    let rest = uri
        .trim()
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| CitizenError::metadata("uri does not start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CitizenError::metadata("missing comma in data uri"))?;

    let mut params = meta.split(';');
    let content_type = match params.next().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| CitizenError::metadata(format!("invalid base64: {e}")))?
    } else {
        percent_decode(payload)
    };

    Ok(DataUri {
        content_type,
        bytes,
    })
}

/// Percent-decode without treating `+` specially; malformed escapes are kept
/// verbatim.
fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_val(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_json() {
        let uri = "data:application/json;base64,eyJhIjoxfQ==";
        let d = decode_data_uri(uri).unwrap();
        assert_eq!(d.content_type, "application/json");
        assert_eq!(d.bytes, br#"{"a":1}"#);
    }

    #[test]
    fn tolerates_whitespace_in_base64() {
        let d = decode_data_uri("data:text/plain;base64,aGVs\nbG8=").unwrap();
        assert_eq!(d.text().unwrap(), "hello");
    }

    #[test]
    fn percent_decodes_plain_payloads() {
        let d = decode_data_uri("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").unwrap();
        assert!(d.is_svg());
        assert_eq!(d.text().unwrap(), "<svg></svg>");
    }

    #[test]
    fn defaults_content_type() {
        let d = decode_data_uri("data:,hi").unwrap();
        assert_eq!(d.content_type, "text/plain");
        assert_eq!(d.bytes, b"hi");
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(decode_data_uri("https://example.com/x.png").is_err());
        assert!(decode_data_uri("data:text/plain;base64").is_err());
        assert!(decode_data_uri("data:text/plain;base64,@@@").is_err());
    }

    #[test]
    fn malformed_escape_is_kept() {
        let d = decode_data_uri("data:,100%zz%4").unwrap();
        assert_eq!(d.bytes, b"100%zz%4");
    }
}
