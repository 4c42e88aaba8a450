//! Shared utility functions

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Whether a stored hash is a parseable PHC string
pub fn is_password_hash(hash: &str) -> bool {
    argon2::PasswordHash::new(hash).is_ok()
}

/// Unix-millis range `[start of from, end of to]` for inclusive `YYYY-MM-DD`
/// dates at a fixed UTC offset
pub fn day_range_millis(
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
    utc_offset_minutes: i32,
) -> (i64, i64) {
    let offset_ms = i64::from(shared::report::clamp_offset_minutes(utc_offset_minutes)) * 60_000;
    let start = from
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc().timestamp_millis())
        .unwrap_or_default();
    let end = to
        .succ_opt()
        .unwrap_or(to)
        .and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc().timestamp_millis())
        .unwrap_or_default();
    (start - offset_ms, end - offset_ms - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(is_password_hash(&hash));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!is_password_hash("plain"));
    }

    #[test]
    fn day_range_is_inclusive() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let (start, end) = day_range_millis(d, d, 0);
        assert_eq!(start, 1_768_435_200_000);
        assert_eq!(end, 1_768_435_200_000 + 86_400_000 - 1);

        // UTC+7: the local day starts seven hours earlier in UTC
        let (start7, end7) = day_range_millis(d, d, 420);
        assert_eq!(start7, start - 7 * 3_600_000);
        assert_eq!(end7, end - 7 * 3_600_000);

        // same clamp as the day labels
        assert_eq!(day_range_millis(d, d, i32::MAX), day_range_millis(d, d, 18 * 60));
    }
}
