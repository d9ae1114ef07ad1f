//! Normalization of user-supplied page references.

use anyhow::{Result, anyhow};
use tracing::debug;
use url::Url;

const ID_LEN: usize = 32;

/// Reduce a page reference to an id the API accepts.
///
/// Accepts ids with or without dashes and page URLs whose last path segment
/// ends in a 32-hex id (`.../Roadmap-598337872cf94fdf8782e53db20768a5?pvs=4`).
/// Hex ids come back in dashed 8-4-4-4-12 form. Other ids made only of ASCII
/// letters, digits and dashes are passed through unchanged and left for the
/// API to reject; anything else would alter the request path and is refused.
pub fn normalize_block_id(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Invalid argument: block id is empty"));
    }

    if let Ok(url) = Url::parse(trimmed) {
        if matches!(url.scheme(), "http" | "https") {
            let segment = url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                .unwrap_or_default();
            return trailing_hex_id(segment)
                .map(|id| dashed(&id))
                .ok_or_else(|| anyhow!("Invalid argument: no page id found in URL {trimmed}"));
        }
    }

    let compact = trimmed.replace('-', "");
    if is_hex_id(&compact) {
        return Ok(dashed(&compact));
    }

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(anyhow!(
            "Invalid argument: block id {trimmed:?} may only contain letters, digits and dashes"
        ));
    }
    debug!("Passing unrecognized block id through unchanged: {trimmed}");
    Ok(trimmed.to_string())
}

fn is_hex_id(candidate: &str) -> bool {
    candidate.len() == ID_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

fn trailing_hex_id(segment: &str) -> Option<String> {
    let compact = segment.replace('-', "");
    let start = compact.len().checked_sub(ID_LEN)?;
    let tail = compact.get(start..)?;
    is_hex_id(tail).then(|| tail.to_ascii_lowercase())
}

fn dashed(compact: &str) -> String {
    let lower = compact.to_ascii_lowercase();
    format!(
        "{}-{}-{}-{}-{}",
        &lower[0..8],
        &lower[8..12],
        &lower[12..16],
        &lower[16..20],
        &lower[20..32]
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DASHED: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";

    #[test]
    fn test_dashed_and_compact_ids() {
        assert_eq!(normalize_block_id(DASHED).unwrap(), DASHED);
        assert_eq!(
            normalize_block_id("598337872cf94fdf8782e53db20768a5").unwrap(),
            DASHED
        );
        assert_eq!(
            normalize_block_id("  598337872CF94FDF8782E53DB20768A5 ").unwrap(),
            DASHED
        );
    }

    #[test]
    fn test_page_urls() {
        let cases = [
            "https://www.notion.so/acme/Roadmap-598337872cf94fdf8782e53db20768a5",
            "https://www.notion.so/598337872cf94fdf8782e53db20768a5?pvs=4",
            "https://acme.notion.site/Roadmap-598337872cf94fdf8782e53db20768a5/",
        ];
        for url in cases {
            assert_eq!(normalize_block_id(url).unwrap(), DASHED, "url: {url}");
        }
    }

    #[test]
    fn test_url_without_id_is_rejected() {
        assert!(normalize_block_id("https://www.notion.so/acme/Roadmap").is_err());
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(normalize_block_id("   ").is_err());
    }

    #[test]
    fn test_unknown_shapes_pass_through() {
        assert_eq!(normalize_block_id("not-an-id").unwrap(), "not-an-id");
    }

    #[test]
    fn test_path_and_query_characters_are_rejected() {
        for input in ["x?start_cursor=y", "../search", "a/b", "id#frag", "a b", "caf\u{e9}"] {
            let err = normalize_block_id(input).unwrap_err();
            assert!(err.to_string().starts_with("Invalid argument"), "input: {input}");
        }
    }
}
