//! Syntax checks for claimant-supplied method data.
//!
//! These only reject input that can never work; whether a domain or mailbox
//! actually exists is settled by the verification step.

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_URL_LEN: usize = 2048;

/// A non-empty reference to an uploaded artifact.
pub fn proof_url(raw: &str) -> Result<String, String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err("proof_url must not be empty".into());
    }
    if url.len() > MAX_URL_LEN {
        return Err(format!("proof_url exceeds {MAX_URL_LEN} characters"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err("proof_url must not contain whitespace".into());
    }
    Ok(url.to_string())
}

/// A host name with at least two labels, normalised to lowercase without a
/// trailing dot.
pub fn domain(raw: &str) -> Result<String, String> {
    let name = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if name.is_empty() {
        return Err("domain must not be empty".into());
    }
    if name.len() > MAX_DOMAIN_LEN {
        return Err(format!("domain exceeds {MAX_DOMAIN_LEN} characters"));
    }
    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Err(format!("{name} is not a fully qualified domain"));
    }
    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(format!("{name} has an empty or oversized label"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!("{name} contains characters not allowed in host names"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("{name} has a label starting or ending with '-'"));
        }
    }
    if labels
        .last()
        .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(format!("{name} looks like an IP address"));
    }
    Ok(name)
}

/// `local@domain` with a plausible local part; the domain half is
/// normalised like [`domain`].
pub fn email(raw: &str) -> Result<String, String> {
    let address = raw.trim();
    let (local, host) = address
        .rsplit_once('@')
        .ok_or_else(|| "email_address must contain '@'".to_string())?;
    if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
        return Err("email_address has an empty or oversized local part".into());
    }
    if local.contains('@') || local.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("email_address local part contains invalid characters".into());
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err("email_address local part has misplaced dots".into());
    }
    let host = domain(host)?;
    Ok(format!("{local}@{host}"))
}
