//! Image source client
//!
//! Finds candidate images for a keyword and downloads them. A single attempt
//! is made per request; failures are reported, never retried.

use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{Error, Result};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Location of one candidate image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
}

/// Anything that can turn a keyword into image bytes
pub trait ImageSource: Send + Sync {
    /// At most `count` candidates for `keyword`
    fn search(&self, keyword: &str, count: usize) -> Result<Vec<ImageRef>>;

    /// Raw bytes of one candidate
    fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>>;
}

/// Scrapes the Bing image search results page
pub struct BingImageSource {
    client: Client,
    search_url: String,
}

impl BingImageSource {
    /// `search_url` must contain a `{query}` placeholder
    pub fn new(search_url: impl Into<String>) -> Result<Self> {
        let search_url = search_url.into();
        if !search_url.contains("{query}") {
            return Err(Error::InvalidInput(format!(
                "search URL '{search_url}' has no {{query}} placeholder"
            )));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, search_url })
    }

    fn search_url_for(&self, keyword: &str) -> String {
        self.search_url
            .replace("{query}", &urlencoding::encode(keyword.trim()))
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("{url} answered {status}")));
        }
        Ok(response)
    }
}

impl ImageSource for BingImageSource {
    fn search(&self, keyword: &str, count: usize) -> Result<Vec<ImageRef>> {
        let url = self.search_url_for(keyword);
        info!(keyword, "searching images");
        let html = self.get(&url)?.text()?;

        let mut urls = extract_image_urls(&html);
        if urls.is_empty() {
            return Err(Error::NoResults(keyword.to_string()));
        }
        urls.truncate(count);
        debug!(keyword, found = urls.len(), "search results");
        Ok(urls.into_iter().map(|url| ImageRef { url }).collect())
    }

    fn fetch(&self, image: &ImageRef) -> Result<Vec<u8>> {
        let bytes = self.get(&image.url)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

/// Pull image URLs out of a results page, thumbnails first, without duplicates.
///
/// Each result tile carries HTML-escaped JSON metadata with a `turl`
/// (thumbnail) and a `murl` (original) field.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    // Patterns are literals; compiling them cannot fail
    let Ok(field) = Regex::new(r#"(turl|murl)&quot;:&quot;(https?://.+?)&quot;"#) else {
        return Vec::new();
    };

    let mut thumbs = Vec::new();
    let mut originals = Vec::new();
    for caps in field.captures_iter(html) {
        let url = unescape_html(&caps[2]);
        match &caps[1] {
            "turl" => thumbs.push(url),
            _ => originals.push(url),
        }
    }

    let mut seen = std::collections::HashSet::new();
    thumbs
        .into_iter()
        .chain(originals)
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

fn unescape_html(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
