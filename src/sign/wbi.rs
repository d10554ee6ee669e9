/// The wbi parameter-signing transform
///
/// Signed endpoints expect the query string to carry a `wts` unix timestamp
/// and a `w_rid` digest over the sorted, character-filtered parameters. The
/// digest salt (the "mixin key") is a fixed permutation of the session's
/// concatenated img/sub keys, truncated to 32 characters.
use std::collections::BTreeMap;

use md5::{Digest, Md5};

use super::SigningKeyPair;

/// Request parameters, ordered by key
///
/// A `BTreeMap` keeps the keys sorted, which is exactly the order the
/// signature is computed over, so encoding the map yields the signed bytes.
pub type ParamMap = BTreeMap<String, String>;

/// Index permutation that turns the concatenated keys into the mixin key
const MIXIN_KEY_TAB: [usize; 64] = [
    46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
    28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22,
    25, 54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

/// Characters stripped from parameter values before signing
const FILTERED_CHARS: &str = "!'()*";

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// A parameter-signing transform
///
/// The transform is pure: given the same parameters, keys, and timestamp it
/// returns the same signed set, which lets tests pin the timestamp instead
/// of the clock.
pub trait SignStrategy: Send + Sync {
    /// Signs `params` with `keys` at unix-seconds timestamp `wts`
    ///
    /// # Returns
    ///
    /// The complete parameter set to send: the filtered originals plus
    /// `wts` and the `w_rid` signature. An empty set passes through
    /// unsigned; there is nothing to protect.
    fn sign(&self, params: &ParamMap, keys: &SigningKeyPair, wts: i64) -> ParamMap;
}

/// The production wbi transform
#[derive(Debug, Clone, Copy, Default)]
pub struct WbiSigner;

impl SignStrategy for WbiSigner {
    fn sign(&self, params: &ParamMap, keys: &SigningKeyPair, wts: i64) -> ParamMap {
        if params.is_empty() {
            return ParamMap::new();
        }

        let mut signed: ParamMap = params
            .iter()
            .map(|(key, value)| (key.clone(), strip_filtered_chars(value)))
            .collect();
        signed.insert("wts".to_string(), wts.to_string());

        // w_rid covers the sorted query plus the mixin-key salt
        let query = encode_query(&signed);
        let salt = mixin_key(&keys.combined_material());
        let mut hasher = Md5::new();
        hasher.update(query.as_bytes());
        hasher.update(salt.as_bytes());
        let w_rid = hex::encode(hasher.finalize());

        signed.insert("w_rid".to_string(), w_rid);
        signed
    }
}

/// Derives the 32-character mixin key from the concatenated key material
///
/// Permutation indexes past the end of the material are skipped, so short
/// material degrades to a shorter key instead of a panic (validated key
/// pairs always provide the full 64 characters).
pub fn mixin_key(material: &str) -> String {
    let chars: Vec<char> = material.chars().collect();

    MIXIN_KEY_TAB
        .iter()
        .filter_map(|&index| chars.get(index).copied())
        .take(32)
        .collect()
}

/// Form-urlencodes the map in key order
///
/// Matches `quote_plus` semantics: `A-Za-z0-9_.-~` pass through, space
/// becomes `+`, and every other byte of the UTF-8 encoding becomes an
/// uppercase percent escape. The same encoding is used for signing and for
/// the request line, so the signed bytes are the sent bytes.
pub fn encode_query(params: &ParamMap) -> String {
    let mut query = String::new();

    for (key, value) in params {
        if !query.is_empty() {
            query.push('&');
        }
        encode_component(&mut query, key);
        query.push('=');
        encode_component(&mut query, value);
    }

    query
}

fn encode_component(out: &mut String, raw: &str) {
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(HEX_UPPER[(byte >> 4) as usize] as char);
                out.push(HEX_UPPER[(byte & 0x0F) as usize] as char);
            }
        }
    }
}

fn strip_filtered_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| !FILTERED_CHARS.contains(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_keys() -> SigningKeyPair {
        SigningKeyPair {
            img_key: "7cd084941338484aae1ad9425b84077c".to_string(),
            sub_key: "4932caff0ff746eab6f01bf08b70ac45".to_string(),
        }
    }

    fn create_test_params() -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("foo".to_string(), "114".to_string());
        params.insert("bar".to_string(), "514".to_string());
        params.insert("zab".to_string(), "1919810".to_string());
        params
    }

    #[test]
    fn test_mixin_key_permutation() {
        let keys = create_test_keys();

        assert_eq!(
            mixin_key(&keys.combined_material()),
            "ea1db124af3c7062474693fa704f4ff8"
        );
    }

    #[test]
    fn test_mixin_key_is_32_chars() {
        let keys = create_test_keys();

        assert_eq!(mixin_key(&keys.combined_material()).len(), 32);
    }

    #[test]
    fn test_mixin_key_short_material_does_not_panic() {
        assert!(mixin_key("abc").len() <= 3);
    }

    #[test]
    fn test_sign_adds_wts_and_w_rid() {
        let signed = WbiSigner.sign(&create_test_params(), &create_test_keys(), 1_702_204_169);

        assert_eq!(signed.get("wts").map(String::as_str), Some("1702204169"));
        let w_rid = signed.get("w_rid").unwrap();
        assert_eq!(w_rid.len(), 32);
        assert!(w_rid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sign_empty_params_stays_empty() {
        let signed = WbiSigner.sign(&ParamMap::new(), &create_test_keys(), 1_702_204_169);

        assert!(signed.is_empty());
    }

    #[test]
    fn test_sign_is_deterministic() {
        let params = create_test_params();
        let keys = create_test_keys();

        let first = WbiSigner.sign(&params, &keys, 1_702_204_169);
        let second = WbiSigner.sign(&params, &keys, 1_702_204_169);

        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_depends_on_timestamp() {
        let params = create_test_params();
        let keys = create_test_keys();

        let first = WbiSigner.sign(&params, &keys, 1_702_204_169);
        let second = WbiSigner.sign(&params, &keys, 1_702_204_170);

        assert_ne!(first.get("w_rid"), second.get("w_rid"));
    }

    #[test]
    fn test_sign_strips_filtered_chars() {
        let mut params = ParamMap::new();
        params.insert("keyword".to_string(), "r(o)c*k!et's".to_string());

        let signed = WbiSigner.sign(&params, &create_test_keys(), 1_702_204_169);

        assert_eq!(signed.get("keyword").map(String::as_str), Some("rockets"));
    }

    #[test]
    fn test_sign_leaves_original_params_untouched() {
        let params = create_test_params();
        let before = params.clone();

        let _ = WbiSigner.sign(&params, &create_test_keys(), 1_702_204_169);

        assert_eq!(params, before);
    }

    #[test]
    fn test_encode_query_sorts_keys() {
        let mut params = ParamMap::new();
        params.insert("zab".to_string(), "1".to_string());
        params.insert("bar".to_string(), "2".to_string());
        params.insert("foo".to_string(), "3".to_string());

        assert_eq!(encode_query(&params), "bar=2&foo=3&zab=1");
    }

    #[test]
    fn test_encode_query_escapes_like_quote_plus() {
        let mut params = ParamMap::new();
        params.insert("keyword".to_string(), "hello world".to_string());
        params.insert("cn".to_string(), "中".to_string());
        params.insert("keep".to_string(), "a_b.c-d~e".to_string());

        assert_eq!(
            encode_query(&params),
            "cn=%E4%B8%AD&keep=a_b.c-d~e&keyword=hello+world"
        );
    }

    #[test]
    fn test_encode_query_empty_map() {
        assert_eq!(encode_query(&ParamMap::new()), "");
    }

    #[test]
    fn test_encode_query_uppercase_escapes() {
        let mut params = ParamMap::new();
        params.insert("q".to_string(), "a/b".to_string());

        assert_eq!(encode_query(&params), "q=a%2Fb");
    }
}
