/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as record ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Human-readable document code: `<PREFIX>-<YYYYMMDD>-<XXXX>`
///
/// The suffix is the low 16 bits of the id in upper-case hex, enough to tell
/// same-day documents apart at the counter.
pub fn document_code(prefix: &str, millis: i64, id: i64) -> String {
    let date = chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format("%Y%m%d");
    format!("{prefix}-{date}-{:04X}", id & 0xFFFF)
}

/// Trim and lower-case an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trim a category name and collapse inner whitespace; empty → `None`
pub fn normalize_category(name: &str) -> Option<String> {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_are_positive_and_distinct() {
        let a = snowflake_id();
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > 0);
        assert!(a < (1i64 << 53));
    }

    #[test]
    fn document_code_format() {
        // 2026-01-15T10:00:00Z
        let code = document_code("HD", 1_768_471_200_000, 0x1234_ABCD);
        assert_eq!(code, "HD-20260115-ABCD");
    }

    #[test]
    fn normalizes_email_and_category() {
        assert_eq!(normalize_email("  Owner@MotoCare.VN "), "owner@motocare.vn");
        assert_eq!(
            normalize_category("  Brake   pads "),
            Some("Brake pads".to_string())
        );
        assert_eq!(normalize_category("   "), None);
    }
}
