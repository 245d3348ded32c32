//! App metadata scraped from the app-listing site.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{debug, warn};
use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::http::{check_status, HttpClient};

/// Labels bracketing the fields read off an app page.
const APP_NAME_LABEL: &str = "App Name";
const CATEGORY_LABEL: &str = "Category";

/// Application metadata assembled from an app-listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub category: String,
    /// Base64 `data:` URI of the logo, or `""` when no logo could be
    /// fetched.
    pub logo: String,
}

/// Source of app metadata keyed by Android package identifier.
#[async_trait]
pub trait AppInfoSource: Send + Sync {
    async fn app_info(&self, package: &str) -> Result<AppInfo, BackendError>;
}

/// App-info backend scraping the apk-dl listing site.
///
/// Requests to the listing site carry no headers beyond the client
/// defaults; in particular, the hosting-API token never travels here.
pub struct ApkDl {
    http: HttpClient,
    base_url: String,
}

impl ApkDl {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Best effort: any failure to fetch the logo degrades to the empty
    /// sentinel instead of failing the operation.
    async fn fetch_logo(&self, url: &str) -> String {
        match self.download_logo(url).await {
            Ok(logo) => logo,
            Err(error) => {
                warn!("Logo download from {} failed ({}), serving none", url, error);
                String::new()
            }
        }
    }

    async fn download_logo(&self, url: &str) -> Result<String, BackendError> {
        debug!("Downloading logo from {}...", url);

        let response = check_status(self.http.get(url, HeaderMap::new()).await?).await?;
        let bytes = response.bytes().await?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(&bytes)))
    }
}

#[async_trait]
impl AppInfoSource for ApkDl {
    #[tracing::instrument(skip(self))]
    async fn app_info(&self, package: &str) -> Result<AppInfo, BackendError> {
        let url = format!("{}/{}", self.base_url, package);

        debug!("Fetching app listing from {}...", url);

        let response = check_status(self.http.get(&url, HeaderMap::new()).await?).await?;
        let page = response.text().await?;
        let listing = extract_listing(&page, package)?;

        let logo = match &listing.logo_url {
            Some(logo_url) => self.fetch_logo(logo_url).await,
            None => String::new(),
        };

        Ok(AppInfo {
            name: listing.name,
            category: listing.category,
            logo,
        })
    }
}

struct Listing {
    name: String,
    category: String,
    logo_url: Option<String>,
}

/// Pulls the labeled fields and the logo URL out of an app page. Parsing
/// is fully synchronous; the DOM never crosses an await point.
fn extract_listing(page: &str, package: &str) -> Result<Listing, BackendError> {
    let document = Html::parse_document(page);

    let name = labeled_value(&document, APP_NAME_LABEL);
    let category = labeled_value(&document, CATEGORY_LABEL);
    let (Some(name), Some(category)) = (name, category) else {
        // A missing package and a changed page layout look the same from
        // here; both surface as one failure kind.
        return Err(BackendError::NotFound(format!(
            "app data for {} is incomplete or missing",
            package
        )));
    };

    Ok(Listing {
        name,
        category,
        logo_url: logo_url(&document),
    })
}

/// Finds the div whose entire text equals `label` and returns the text
/// of the next div sibling.
fn labeled_value(document: &Html, label: &str) -> Option<String> {
    let divs = selector("div");
    let labeled = document
        .select(&divs)
        .find(|element| element.text().collect::<String>().trim() == label)?;
    let value = labeled
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "div")?
        .text()
        .collect::<String>();
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn logo_url(document: &Html) -> Option<String> {
    let images = selector("div.logo img");
    document
        .select(&images)
        .next()?
        .value()
        .attr("src")
        .map(str::to_string)
}

fn selector(css: &str) -> Selector {
    // Only called with string constants; parsing them cannot fail.
    Selector::parse(css).expect("valid selector constant")
}
