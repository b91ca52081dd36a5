const VISIBLE_PREFIX: usize = 6;

/// Shorten a bearer token for log output.
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= VISIBLE_PREFIX {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(VISIBLE_PREFIX).collect();
    format!("{prefix}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.e30.sig"), "eyJhbG…");
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token(""), "***");
    }
}
