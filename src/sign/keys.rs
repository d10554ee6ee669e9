/// Signing-key extraction
///
/// The wbi keys are not delivered as plain values: they are the basenames of
/// two image URLs, published both in browser local storage and in the
/// navigation payload. This module pulls the keys out of either form and
/// validates them before they reach the signer.
use crate::{BiliError, Result};

/// The `img_key`/`sub_key` pair that parameterizes wbi signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKeyPair {
    pub img_key: String,
    pub sub_key: String,
}

impl SigningKeyPair {
    /// Builds a validated pair from the two image URLs
    ///
    /// # Arguments
    ///
    /// * `img_url` - URL whose basename (up to the first dot) is `img_key`
    /// * `sub_url` - URL whose basename (up to the first dot) is `sub_key`
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKeyPair)` - both basenames are non-empty ASCII hex
    /// * `Err(BiliError::SigningUnavailable)` - either key is unusable
    pub fn from_urls(img_url: &str, sub_url: &str) -> Result<Self> {
        let img_key = extract_key(img_url)?;
        let sub_key = extract_key(sub_url)?;

        Ok(Self { img_key, sub_key })
    }

    /// Builds a pair from the combined `"<img_url>-<sub_url>"` local-storage form
    pub fn from_combined(combined: &str) -> Result<Self> {
        match combined.split_once('-') {
            Some((img_url, sub_url)) => Self::from_urls(img_url, sub_url),
            None => Err(BiliError::SigningUnavailable(format!(
                "combined key URLs missing separator: {:?}",
                combined
            ))),
        }
    }

    /// Returns the concatenated key material the mixin permutation is applied to
    pub fn combined_material(&self) -> String {
        format!("{}{}", self.img_key, self.sub_key)
    }
}

/// Pulls a key out of an image URL: the basename, truncated at the first dot
///
/// The key must be non-empty ASCII hex; anything else means the URL does not
/// actually carry key material.
fn extract_key(url: &str) -> Result<String> {
    let basename = url.rsplit('/').next().unwrap_or(url);
    let key = basename.split('.').next().unwrap_or(basename);

    if key.is_empty() || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BiliError::SigningUnavailable(format!(
            "image URL carries no usable key: {:?}",
            url
        )));
    }

    Ok(key.to_string())
}
