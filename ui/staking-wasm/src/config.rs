//! Contract addresses and timing, read from the page.
//!
//! The host page embeds:
//! `<script id="staking-config" type="application/json">{ "token_address": "0x…", "staking_address": "0x…" }</script>`

use asva_api_types::StakingConfig;

use crate::dom;

pub const CONFIG_ELEMENT_ID: &str = "staking-config";

pub fn load() -> Result<StakingConfig, String> {
    let raw = dom::by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
        .ok_or_else(|| format!("missing #{CONFIG_ELEMENT_ID} element"))?;
    parse(&raw)
}

pub fn parse(raw: &str) -> Result<StakingConfig, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid staking config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_config() {
        let config = parse(
            r#"{
                "token_address": "0x00000000000000000000000000000000000000a1",
                "staking_address": "0x00000000000000000000000000000000000000b2",
                "confirmation_timeout_secs": 60
            }"#,
        )
        .unwrap();
        assert_eq!(config.confirmation_timeout_secs, 60);
        assert_eq!(config.poll_interval_ms, 1_000);
    }

    #[test]
    fn reports_missing_fields() {
        let err = parse(r#"{ "token_address": "0x01" }"#).unwrap_err();
        assert!(err.contains("staking_address"));
    }
}
