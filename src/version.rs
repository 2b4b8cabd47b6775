const COMPONENTS: usize = 3;
const WIDTH: usize = 4;

/// Encode a dotted version string into a fixed-width token usable as a cache key.
///
/// `"2.0"` and `"2.0.0"` both become `"v000200000000"`. Components past the
/// third are dropped. Nothing is validated: a non-numeric or five-digit
/// component is padded and passed through as is, so the resulting token no
/// longer sorts in numeric order (see [`preserves_ordering`]).
pub fn encode_version(version: &str) -> String {
    let mut parts: Vec<&str> = version.split('.').collect();
    while parts.len() < COMPONENTS {
        parts.push("0");
    }
    let mut out = String::with_capacity(1 + COMPONENTS * WIDTH);
    out.push('v');
    for part in parts.iter().take(COMPONENTS) {
        out.push_str(&format!("{part:0>width$}", width = WIDTH));
    }
    out
}

/// True when every component that ends up in the encoded token is numeric and
/// fits the fixed width, which is the condition for lexicographic order of
/// encoded tokens to match numeric order of versions.
pub fn preserves_ordering(version: &str) -> bool {
    version
        .split('.')
        .take(COMPONENTS)
        .all(|part| part.len() <= WIDTH && part.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_missing_components() {
        assert_eq!(encode_version("2.0"), "v000200000000");
        assert_eq!(encode_version("2.0.0"), "v000200000000");
        assert_eq!(encode_version("3"), "v000300000000");
    }

    #[test]
    fn drops_extra_components() {
        assert_eq!(encode_version("1.2.3.4"), "v000100020003");
        assert_eq!(encode_version("1.2.3.post1"), "v000100020003");
    }

    #[test]
    fn orders_numerically_within_width() {
        assert!(encode_version("1.9.0") < encode_version("1.10.0"));
        assert!(encode_version("0.99.99") < encode_version("1.0"));
        assert!(encode_version("2024.1.5") < encode_version("2024.10"));
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode_version("4.12.1"), encode_version("4.12.1"));
        let once = encode_version("1.2");
        assert_eq!(once, encode_version("1.2.0"));
    }

    #[test]
    fn passes_malformed_components_through() {
        assert_eq!(encode_version("1.0rc1"), "v00010rc10000");
        assert_eq!(encode_version("20240101.1"), "v2024010100010000");
        assert!(!preserves_ordering("20240101.1"));
        assert!(!preserves_ordering("1.0rc1"));
        assert!(preserves_ordering("1.10.0"));
        assert!(preserves_ordering("1.2.3.dev0"));
    }
}
