use std::marker::PhantomData;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::traits::ListingSource;
use crate::api::types::{Ack, ItemEnvelope, ListEnvelope};
use crate::error::{Error, Result};
use crate::models::Listing;
use crate::session::AuthScope;
use crate::validation::Submission;

/// Public listing endpoints for one listing type.
pub struct ListingsApi<L> {
    client: ApiClient,
    _listing: PhantomData<fn() -> L>,
}

impl<L> Clone for ListingsApi<L> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _listing: PhantomData,
        }
    }
}

impl<L: Listing> ListingsApi<L> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _listing: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<L>> {
        let envelope: ListEnvelope<L> = self
            .client
            .get(&[L::KIND.path()], AuthScope::User)
            .await?;
        Ok(envelope.into_items())
    }

    /// One listing. The backend counts this as a view.
    pub async fn get(&self, id: &str) -> Result<L> {
        let envelope: ItemEnvelope<L> = self
            .client
            .get(&[L::KIND.path(), id], AuthScope::User)
            .await?;
        Ok(envelope.into_item())
    }

    /// Submit a new listing for review, images included.
    pub async fn create<S: Submission>(&self, submission: &S) -> Result<Ack> {
        if submission.kind() != L::KIND {
            return Err(Error::validation(
                "kind",
                format!("cannot submit a {} as a {}", submission.kind(), L::KIND),
            ));
        }
        if !self.client.session().is_signed_in() {
            return Err(Error::Unauthenticated);
        }

        let mut form = Form::new();
        for (name, value) in submission.fields() {
            form = form.text(name, value);
        }
        for path in submission.images() {
            form = form.part("images", image_part(path).await?);
        }

        let request = self
            .client
            .request(Method::POST, &[L::KIND.path()], AuthScope::User)
            .multipart(form);
        let ack = self.client.send_ack(request).await?;
        info!("Submitted {} with {} image(s)", L::KIND, submission.images().len());
        Ok(ack)
    }
}

#[async_trait]
impl<L: Listing> ListingSource<L> for ListingsApi<L> {
    async fn fetch_all(&self) -> Result<Vec<L>> {
        self.list().await
    }

    fn source_name(&self) -> &'static str {
        L::KIND.path()
    }
}

async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|source| Error::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(image_mime(path))?)
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
