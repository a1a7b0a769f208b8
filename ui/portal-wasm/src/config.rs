//! Assets bundled into the module at build time.

use anyhow::{Context, Result};
use serde::Deserialize;
use tv_api_types::{Cluster, Commitment};
use tv_chain_solana::{BundleSettings, ProgramBundle};

const IDL: &str = include_str!("../../../config/idl.json");
const KEYPAIR: &str = include_str!("../../../config/keypair.json");
const PORTAL: &str = include_str!("../../../config/portal.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortalFile {
    #[serde(default)]
    cluster: Cluster,
    #[serde(default)]
    rpc_url: Option<String>,
    #[serde(default)]
    commitment: Commitment,
    title: String,
    #[serde(default)]
    twitter_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub title: String,
    pub twitter_handle: String,
}

impl Branding {
    fn handle(&self) -> Option<&str> {
        let handle = self.twitter_handle.trim().trim_start_matches('@');
        (!handle.is_empty()).then_some(handle)
    }

    pub fn twitter_url(&self) -> Option<String> {
        self.handle().map(|handle| format!("https://twitter.com/{handle}"))
    }

    /// `None` when no handle is configured; the footer is then left empty.
    pub fn footer_text(&self) -> Option<String> {
        self.handle().map(|handle| format!("Follow me on Twitter @{handle}"))
    }
}

pub struct PortalConfig {
    pub bundle: ProgramBundle,
    pub branding: Branding,
}

impl PortalConfig {
    pub fn bundled() -> Result<Self> {
        Self::from_assets(IDL, KEYPAIR, PORTAL)
    }

    pub fn from_assets(idl: &str, keypair: &str, portal: &str) -> Result<Self> {
        let file: PortalFile = serde_json::from_str(portal).context("parse portal.json")?;
        let settings = BundleSettings {
            cluster: file.cluster,
            rpc_url: file.rpc_url,
            commitment: file.commitment,
        };
        let bundle = ProgramBundle::from_assets(idl, keypair, settings)?;
        Ok(Self {
            bundle,
            branding: Branding {
                title: file.title,
                twitter_handle: file.twitter_handle,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_loads() {
        let config = PortalConfig::bundled().expect("config");
        assert_eq!(config.branding.title, "Tronverse");
        assert_eq!(config.bundle.cluster(), Cluster::Devnet);
        assert_eq!(config.bundle.commitment(), Commitment::Processed);
        assert_eq!(
            config.branding.twitter_url().as_deref(),
            Some("https://twitter.com/SaisonDuSpikes")
        );
        assert_eq!(
            config.branding.footer_text().as_deref(),
            Some("Follow me on Twitter @SaisonDuSpikes")
        );
    }

    #[test]
    fn portal_file_defaults_and_override() {
        let portal = r#"{"title":"Links","rpc_url":"http://127.0.0.1:8899"}"#;
        let config = PortalConfig::from_assets(IDL, KEYPAIR, portal).expect("config");
        assert_eq!(config.bundle.rpc_url(), "http://127.0.0.1:8899");
        assert_eq!(config.branding.twitter_url(), None);
        assert_eq!(config.branding.footer_text(), None);
    }

    #[test]
    fn unknown_portal_keys_are_rejected() {
        let portal = r#"{"title":"Links","colour":"red"}"#;
        assert!(PortalConfig::from_assets(IDL, KEYPAIR, portal).is_err());
    }

    #[test]
    fn handle_is_normalized() {
        let branding = Branding {
            title: "t".into(),
            twitter_handle: " @someone ".into(),
        };
        assert_eq!(branding.twitter_url().as_deref(), Some("https://twitter.com/someone"));
        assert_eq!(
            branding.footer_text().as_deref(),
            Some("Follow me on Twitter @someone")
        );
    }
}
