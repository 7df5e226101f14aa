pub mod url_validator;

use sha2::{Digest, Sha256};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| ALPHANUMERIC[rand::random_range(0..ALPHANUMERIC.len())] as char)
        .take(length)
        .collect()
}

/// Prefixed entity id, e.g. `ws_1x2y3z...`
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, generate_random_code(24))
}

/// Plain API key shown once to the caller
pub struct GeneratedKey {
    pub plain: String,
    pub hashed: String,
    pub partial: String,
}

pub fn generate_api_key() -> GeneratedKey {
    let plain = format!("lh_{}", generate_random_code(24));
    GeneratedKey {
        hashed: hash_api_key(&plain),
        partial: partial_key(&plain),
        plain,
    }
}

/// Lowercase hex SHA-256 of the key
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Display form: `lh_...` plus the last four characters
pub fn partial_key(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("lh_...{}", tail)
}

/// Uppercase the first letter of every space-separated word
pub fn capitalize(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_code() {
        let code = generate_random_code(7);
        assert_eq!(code.len(), 7);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_id_has_prefix() {
        let id = generate_id("dom");
        assert!(id.starts_with("dom_"));
        assert_eq!(id.len(), 4 + 24);
    }

    #[test]
    fn test_api_key_material() {
        let key = generate_api_key();
        assert!(key.plain.starts_with("lh_"));
        assert_eq!(key.hashed, hash_api_key(&key.plain));
        assert_eq!(key.hashed.len(), 64);
        assert!(key.partial.ends_with(&key.plain[key.plain.len() - 4..]));
        assert_ne!(key.hashed, key.plain);
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("browser"), "Browser");
        assert_eq!(capitalize("referer url"), "Referer Url");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("clickId"), "ClickId");
    }
}
