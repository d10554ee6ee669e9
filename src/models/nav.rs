/// Account-status payload from the navigation endpoint
///
/// `/x/web-interface/nav` answers for both logged-in and guest sessions;
/// guests get `isLogin: false` but still receive the signing-key image URLs.
use serde::Deserialize;

/// The slice of the navigation payload this crate reads
#[derive(Debug, Clone, Deserialize)]
pub struct NavData {
    /// Whether the current cookies identify a logged-in account
    #[serde(rename = "isLogin", default)]
    pub is_login: bool,

    /// Signing-key image URLs; their basenames carry the key material
    #[serde(default)]
    pub wbi_img: Option<WbiImg>,
}

/// The two URL fields whose basenames are the wbi signing keys
#[derive(Debug, Clone, Deserialize)]
pub struct WbiImg {
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub sub_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_logged_in_payload() {
        let nav: NavData = serde_json::from_value(json!({
            "isLogin": true,
            "wbi_img": {
                "img_url": "https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png",
                "sub_url": "https://i0.hdslb.com/bfs/wbi/4932caff0ff746eab6f01bf08b70ac45.png"
            }
        }))
        .unwrap();

        assert!(nav.is_login);
        let wbi = nav.wbi_img.unwrap();
        assert!(wbi.img_url.ends_with("7cd084941338484aae1ad9425b84077c.png"));
        assert!(wbi.sub_url.ends_with("4932caff0ff746eab6f01bf08b70ac45.png"));
    }

    #[test]
    fn test_guest_payload_defaults_to_logged_out() {
        let nav: NavData = serde_json::from_value(json!({
            "wbi_img": {"img_url": "", "sub_url": ""}
        }))
        .unwrap();

        assert!(!nav.is_login);
    }

    #[test]
    fn test_missing_wbi_block_is_none() {
        let nav: NavData = serde_json::from_value(json!({"isLogin": false})).unwrap();

        assert!(nav.wbi_img.is_none());
    }
}
