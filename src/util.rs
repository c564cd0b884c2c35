/// Zero-padded uppercase hex, `width` digits wide.
pub fn hex_str(value: usize, width: usize) -> String {
    format!("{:0width$X}", value, width = width)
}

/// Zero-padded binary, `bits` digits wide.
pub fn bin_str(value: usize, bits: usize) -> String {
    format!("{:0bits$b}", value, bits = bits)
}

/// Parse an integer literal with an optional `0x`, `0o` or `0b` radix prefix.
pub fn parse_int(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    let digits = digits.replace('_', "");
    if digits.is_empty() {
        return None;
    }
    usize::from_str_radix(&digits, radix).ok()
}

/// 64-bit finalizer, used to derive independent seeds from one configured seed.
pub fn hash_u64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^= x >> 33;
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_seeds_differ_from_source() {
        assert_eq!(hash_u64(7), hash_u64(7));
        assert_ne!(hash_u64(7), 7);
        assert_ne!(hash_u64(7), hash_u64(8));
    }

    #[test]
    fn formats_are_zero_padded() {
        assert_eq!(hex_str(0xab, 2), "AB");
        assert_eq!(hex_str(0x5, 2), "05");
        assert_eq!(bin_str(5, 8), "00000101");
    }

    #[test]
    fn parse_int_accepts_radix_prefixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x2A"), Some(42));
        assert_eq!(parse_int("0o52"), Some(42));
        assert_eq!(parse_int("0b101010"), Some(42));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("-1"), None);
        assert_eq!(parse_int("twelve"), None);
    }
}
