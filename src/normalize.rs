//! URL normalization
//!
//! Highlights are looked up by page URL, so the key must not change when a
//! link picks up tracking parameters or a fragment. Normalization keeps origin,
//! path and the remaining query; parse failures return the input unchanged.

use url::Url;

/// Query parameters dropped by default
pub const DEFAULT_TRACKING_PARAMS: [&str; 5] =
    ["utm_source", "utm_medium", "utm_campaign", "fbclid", "gclid"];

/// Canonicalizes page URLs into lookup keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlNormalizer {
    tracking_params: Vec<String>,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKING_PARAMS.iter().map(|p| p.to_string()))
    }
}

impl UrlNormalizer {
    pub fn new(tracking_params: impl IntoIterator<Item = String>) -> Self {
        Self {
            tracking_params: tracking_params.into_iter().collect(),
        }
    }

    /// Normalize `raw` into origin + path + filtered query
    pub fn normalize(&self, raw: &str) -> String {
        let mut url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("URL normalization failed for {}: {}", raw, e);
                return raw.to_string();
            }
        };

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.tracking_params.iter().any(|p| p.as_str() == &**key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
        url.set_fragment(None);

        let origin = url.origin();
        if !origin.is_tuple() {
            return url.to_string();
        }

        let mut normalized = origin.ascii_serialization();
        normalized.push_str(url.path());
        if let Some(query) = url.query() {
            normalized.push('?');
            normalized.push_str(query);
        }
        normalized
    }
}

/// Normalize with the default tracking-parameter denylist
pub fn normalize_url(raw: &str) -> String {
    UrlNormalizer::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tracking_and_fragment() {
        assert_eq!(
            normalize_url("https://a.com/p?utm_source=x&keep=1#frag"),
            "https://a.com/p?keep=1"
        );
    }

    #[test]
    fn test_all_params_removed_drops_query() {
        assert_eq!(
            normalize_url("https://a.com/article?fbclid=abc&gclid=def"),
            "https://a.com/article"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://a.com/p?utm_source=x&keep=1#frag",
            "https://example.org:8443/a/b?x=hello%20world&y=2",
            "http://example.com",
            "not a url",
        ];
        for input in inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn test_malformed_fails_open() {
        assert_eq!(normalize_url("::::"), "::::");
    }

    #[test]
    fn test_custom_denylist() {
        let normalizer = UrlNormalizer::new(vec!["ref".to_string()]);
        assert_eq!(
            normalizer.normalize("https://a.com/?ref=hn&utm_source=x"),
            "https://a.com/?utm_source=x"
        );
    }
}
