//! Resolve an object key to a viewable URL.

use askama::Template;
use imgdrop_shared::ObjectKey;

use crate::api::ApiClient;
use crate::error::ClientError;

#[derive(Template)]
#[template(path = "image_view.html")]
struct ImageViewTemplate<'a> {
    key: &'a str,
    signed_url: &'a str,
}

/// A stored image ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    key: ObjectKey,
    signed_url: String,
}

impl ImageView {
    /// Request a download credential for `key`. Not cached; every call asks
    /// the API again.
    pub async fn fetch(api: &ApiClient, key: &ObjectKey) -> Result<Self, ClientError> {
        let credential = api.request_download_credential(key).await?;
        Ok(Self {
            key: key.clone(),
            signed_url: credential.signed_url,
        })
    }

    /// The key that was requested (the URL may point at its variant).
    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// The signed URL.
    #[must_use]
    pub fn signed_url(&self) -> &str {
        &self.signed_url
    }

    /// `Image URL: <url>`
    #[must_use]
    pub fn render_text(&self) -> String {
        format!("Image URL: {}", self.signed_url)
    }

    /// HTML fragment with the URL as text and the image inline. Values are
    /// escaped by the template.
    pub fn render_html(&self) -> Result<String, ClientError> {
        let template = ImageViewTemplate {
            key: self.key.as_str(),
            signed_url: &self.signed_url,
        };
        Ok(template.render()?)
    }
}
