use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::InlinerConfig;
use crate::error::{InlinerError, Result};
use crate::types::GenerationResult;

/// Image payload as it arrives from the API.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A string field from a JSON response, usually a data URI.
    Text(String),
    /// Raw response bytes, e.g. straight from the CDN.
    Bytes(Vec<u8>),
}

/// Normalize a payload into a [`GenerationResult`] for `content_path`.
///
/// Data URIs (`data:image/png;base64,...`) have their header stripped and
/// the remainder base64-decoded. Anything else is taken as already-decoded
/// bytes.
pub fn wrap(config: &InlinerConfig, payload: Payload, content_path: &str) -> Result<GenerationResult> {
    let data = match payload {
        Payload::Text(text) => match text.split_once(',') {
            Some((_header, encoded)) => STANDARD
                .decode(encoded.trim())
                .map_err(|e| InlinerError::Decode {
                    context: format!("Malformed base64 payload for {}", content_path),
                    source: e,
                })?,
            None => text.into_bytes(),
        },
        Payload::Bytes(bytes) => bytes,
    };

    let content_path = content_path.trim_start_matches('/').to_string();
    Ok(GenerationResult {
        data,
        url: config.image_url(&content_path),
        content_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InlinerConfig {
        InlinerConfig::new("key")
    }

    #[test]
    fn test_wrap_data_uri() {
        let result = wrap(
            &config(),
            Payload::Text("data:image/png;base64,AAAA".into()),
            "web/cat.png",
        )
        .unwrap();
        assert_eq!(result.data, STANDARD.decode("AAAA").unwrap());
        assert_eq!(result.data, vec![0, 0, 0]);
        assert_eq!(result.url, "https://img.inliner.ai/web/cat.png");
        assert_eq!(result.content_path, "web/cat.png");
    }

    #[test]
    fn test_wrap_raw_bytes() {
        let result = wrap(&config(), Payload::Bytes(vec![0x89, b'P', b'N', b'G']), "/web/x.png").unwrap();
        assert_eq!(result.data, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(result.content_path, "web/x.png");
    }

    #[test]
    fn test_wrap_text_without_header_is_taken_verbatim() {
        let result = wrap(&config(), Payload::Text("<svg/>".into()), "web/x.svg").unwrap();
        assert_eq!(result.data, b"<svg/>".to_vec());
    }

    #[test]
    fn test_wrap_malformed_base64_is_an_error() {
        let err = wrap(
            &config(),
            Payload::Text("data:image/png;base64,@@not-base64@@".into()),
            "web/cat.png",
        )
        .unwrap_err();
        assert!(matches!(err, InlinerError::Decode { .. }));
    }
}
