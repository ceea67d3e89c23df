//! Encrypted-file naming convention
//!
//! Encrypting `report.pdf` produces `report.pdf.encrypted`; decrypting strips
//! the suffix again. The container itself carries no name, so this is purely
//! a convention between the tools that write and read vault files.

/// Name for the encrypted form of `name`.
pub fn encrypted_name(name: &str, suffix: &str) -> String {
    format!("{name}{suffix}")
}

/// Original name recovered from an encrypted file name.
///
/// `None` if `name` does not end with `suffix`, or if nothing would be left.
pub fn decrypted_name<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => Some(stem),
        _ => None,
    }
}

/// Whether `name` looks like something `encrypted_name` produced.
pub fn looks_encrypted(name: &str, suffix: &str) -> bool {
    decrypted_name(name, suffix).is_some()
}
