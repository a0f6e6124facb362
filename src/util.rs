use crate::error::ForgeError;

/// Parse a human-readable size string into mebibytes.
///
/// Accepts formats like `"4G"`, `"2048M"`, or a bare number (already MB).
/// Uses binary units (1G = 1024 MB). Machine specs on the wire are MB.
pub fn parse_size_mb(s: &str) -> Result<u64, ForgeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ForgeError::Validation {
            message: "size cannot be empty".into(),
        });
    }

    let (num_str, suffix) = match s.find(|c: char| c.is_ascii_alphabetic()) {
        Some(i) => (&s[..i], s[i..].to_ascii_uppercase()),
        None => (s, String::new()),
    };

    let num: u64 = num_str.parse().map_err(|_| ForgeError::Validation {
        message: format!("invalid size number: '{num_str}'"),
    })?;

    let mb = match suffix.as_str() {
        "" | "M" | "MB" => Some(num),
        "G" | "GB" => num.checked_mul(1024),
        "T" | "TB" => num.checked_mul(1024 * 1024),
        _ => {
            return Err(ForgeError::Validation {
                message: format!("unknown size suffix: '{suffix}' (use M, G, or T)"),
            });
        }
    };

    mb.ok_or_else(|| ForgeError::Validation {
        message: format!("size overflows: '{s}'"),
    })
}

/// Validate a machine name: non-empty after trimming, no control characters.
pub fn validate_name(name: &str) -> Result<(), ForgeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ForgeError::Validation {
            message: "machine name must not be empty".into(),
        });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ForgeError::Validation {
            message: "machine name must not contain control characters".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_gibibytes() {
        assert_eq!(parse_size_mb("4G").unwrap(), 4096);
        assert_eq!(parse_size_mb("1GB").unwrap(), 1024);
    }

    #[test]
    fn parse_size_bare_number_is_mb() {
        assert_eq!(parse_size_mb("2048").unwrap(), 2048);
        assert_eq!(parse_size_mb("65536M").unwrap(), 65536);
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size_mb("").is_err());
        assert!(parse_size_mb("4X").is_err());
        assert!(parse_size_mb("abc").is_err());
    }

    #[test]
    fn validate_name_rejects_empty_and_control() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("bad\nname").is_err());
        assert!(validate_name("Ubuntu 22.04").is_ok());
    }
}
