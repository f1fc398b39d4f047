use regex::Regex;

fn url_rewrite_ignores() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"://").expect("invalid scheme regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"^data:").expect("invalid data URI regex"),
                Regex::new(r"^/").expect("invalid root-relative regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a stylesheet URL must be left exactly as written.
///
/// Absolute URLs (anything containing `://`), protocol-relative URLs, data URIs and
/// root-relative paths already resolve the same way wherever the stylesheet ends up.
pub fn should_skip_url_rewrite(url: &str) -> bool {
    url_rewrite_ignores()
        .iter()
        .any(|pattern| pattern.is_match(url))
}

#[cfg(test)]
mod tests {
    use super::should_skip_url_rewrite;

    #[test]
    fn skips_absolute_urls() {
        assert!(should_skip_url_rewrite("https://example.com/a.png"));
        assert!(should_skip_url_rewrite("ftp://files/a.png"));
    }

    #[test]
    fn skips_protocol_relative_urls() {
        assert!(should_skip_url_rewrite("//cdn.example.com/a.png"));
    }

    #[test]
    fn skips_data_uris() {
        assert!(should_skip_url_rewrite("data:image/png;base64,abc"));
    }

    #[test]
    fn skips_root_relative_paths() {
        assert!(should_skip_url_rewrite("/images/a.png"));
    }

    #[test]
    fn keeps_relative_paths() {
        assert!(!should_skip_url_rewrite("images/photo.png"));
        assert!(!should_skip_url_rewrite("../fonts/inter.woff2"));
    }
}
