//! Runtime configuration with production defaults.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::Repository;

/// Environment variable consulted for the hosting-API bearer token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Errors raised while loading or applying configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("GITHUB_TOKEN is not usable as a bearer credential: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

/// Configuration of the API core.
///
/// Every field has a production default, so a configuration file only
/// names what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Organization owning every repository this API serves.
    pub owner: String,
    /// Repository whose owning organization carries the team listing.
    pub default_repository: String,
    /// Repository whose releases carry the patch index.
    pub patches_repository: String,
    /// Repositories the legacy aggregate contract fans out over.
    pub compat_repositories: Vec<String>,
    /// Repositories left out of the tools listing. They stay part of the
    /// contributors listing.
    pub tools_exclusions: Vec<String>,
    /// Base URL of the release-hosting REST API.
    pub api_url: String,
    /// Base URL of the app-listing site.
    pub app_info_url: String,
    /// Brand asset links, served as-is. Empty unless configured.
    pub branding: Vec<BrandingAsset>,
    /// Static profile of the owning organization, served as-is.
    pub info: OwnerInfo,
}

/// One brand asset (a logo variant and the like) by its public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingAsset {
    #[serde(rename = "assettype")]
    pub asset_type: String,
    pub url: String,
}

/// Static organization profile served alongside the live release data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerInfo {
    pub name: String,
    pub about: String,
    pub contact: Vec<Contact>,
    pub socials: Vec<Social>,
    pub donations: Donations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub method: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Donations {
    pub wallets: Vec<Wallet>,
    pub links: Vec<DonationLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub network: String,
    pub currency_code: String,
    pub address: String,
    pub preferred: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationLink {
    pub name: String,
    pub url: String,
    pub preferred: bool,
}

impl ApiConfig {
    /// Loads configuration from a TOML file. Fields the file does not
    /// name keep their production defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Bearer token for the hosting API, when the environment provides
    /// one. The token is optional; without it requests count against the
    /// anonymous rate limit.
    pub fn github_token() -> Option<String> {
        env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty())
    }

    /// A repository of the configured owner.
    pub fn repository(&self, name: &str) -> Repository {
        Repository::new(self.owner.clone(), name)
    }

    /// Repositories the tools listing aggregates over.
    pub fn tools_repositories(&self) -> Vec<Repository> {
        self.compat_repositories
            .iter()
            .filter(|&name| !self.tools_exclusions.contains(name))
            .map(|name| self.repository(name))
            .collect()
    }

    /// Repositories the contributors listing aggregates over. Unlike the
    /// tools listing, nothing is excluded here.
    pub fn contributor_repositories(&self) -> Vec<Repository> {
        self.compat_repositories
            .iter()
            .map(|name| self.repository(name))
            .collect()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            owner: "revanced".to_string(),
            default_repository: ".github".to_string(),
            patches_repository: "revanced-patches".to_string(),
            compat_repositories: [
                "revanced-patcher",
                "revanced-patches",
                "revanced-integrations",
                "revanced-manager",
                "revanced-cli",
                "revanced-website",
                "revanced-api",
                "revanced-releases-api",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            tools_exclusions: ["revanced-api", "revanced-releases-api", "revanced-website"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            api_url: "https://api.github.com".to_string(),
            app_info_url: "https://apk-dl.com".to_string(),
            branding: vec![],
            info: OwnerInfo::default(),
        }
    }
}

impl Default for OwnerInfo {
    fn default() -> Self {
        Self {
            name: "ReVanced".to_string(),
            about: "ReVanced was born out of Vanced's discontinuation and it is our goal \
                    to continue the legacy of what Vanced left behind. Thanks to ReVanced \
                    Patcher, it's possible to create long-lasting patches for nearly any \
                    Android app. ReVanced's patching system is designed to allow patches \
                    to work on new versions of the apps automatically with bare minimum \
                    maintenance."
                .to_string(),
            contact: vec![contact("mail", "contact@revanced.app")],
            socials: vec![
                social("Website", "https://revanced.app"),
                social("GitHub", "https://github.com/revanced"),
                social("Twitter", "https://twitter.com/revancedapp"),
                social("Discord", "https://revanced.app/discord"),
                social("Reddit", "https://www.reddit.com/r/revancedapp"),
                social("Telegram", "https://t.me/app_revanced"),
                social("YouTube", "https://www.youtube.com/@ReVanced"),
            ],
            donations: Donations {
                wallets: vec![
                    wallet(
                        "Bitcoin",
                        "BTC",
                        "bc1q4x8j6mt27y5gv0q625t8wkr87ruy8fprpy4v3f",
                        false,
                    ),
                    wallet("Dogecoin", "DOGE", "D8GH73rNjudgi6bS2krrXWEsU9KShedLXp", true),
                    wallet(
                        "Ethereum",
                        "ETH",
                        "0x7ab4091e00363654bf84B34151225742cd92FCE5",
                        false,
                    ),
                    wallet("Litecoin", "LTC", "LbJi8EuoDcwaZvykcKmcrM74jpjde23qJ2", false),
                    wallet(
                        "Monero",
                        "XMR",
                        "46YwWDbZD6jVptuk5mLHsuAmh1BnUMSjSNYacozQQEraWSQ93nb2yYVRHoMR6PmFYWEHsLHg9tr1cH5M8Rtn7YaaGQPCjSh",
                        false,
                    ),
                ],
                links: vec![
                    donation_link("Open Collective", "https://opencollective.com/revanced", true),
                    donation_link(
                        "Github Sponsors",
                        "https://github.com/sponsors/ReVanced",
                        false,
                    ),
                ],
            },
        }
    }
}

fn contact(method: &str, value: &str) -> Contact {
    Contact {
        method: method.to_string(),
        value: value.to_string(),
    }
}

fn social(name: &str, url: &str) -> Social {
    Social {
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn wallet(network: &str, currency_code: &str, address: &str, preferred: bool) -> Wallet {
    Wallet {
        network: network.to_string(),
        currency_code: currency_code.to_string(),
        address: address.to_string(),
        preferred,
    }
}

fn donation_link(name: &str, url: &str, preferred: bool) -> DonationLink {
    DonationLink {
        name: name.to_string(),
        url: url.to_string(),
        preferred,
    }
}
