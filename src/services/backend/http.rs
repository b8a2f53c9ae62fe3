use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::BookingApi;
use crate::models::{Barber, Booking, BookingStatus, Product, ProductDraft};

pub struct HttpBookingApi {
    base_url: Url,
    barbershop_id: String,
    token: String,
    client: reqwest::Client,
}

impl HttpBookingApi {
    pub fn new(
        base_url: String,
        barbershop_id: String,
        token: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        let base_url = Url::parse(&base_url)
            .with_context(|| format!("invalid booking API URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("booking API URL cannot carry a path: {base_url}");
        }

        Ok(Self {
            base_url,
            barbershop_id,
            token,
            client,
        })
    }

    /// Builds `<base>/barbershops/<id>/<segments...>`. Each segment is
    /// percent-encoded on its own, so ids cannot add or climb path levels.
    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("booking API URL cannot carry a path"))?
            .pop_if_empty()
            .push("barbershops")
            .push(&self.barbershop_id)
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> anyhow::Result<T> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .with_context(|| format!("failed to call booking API ({what})"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("booking API error ({what}, {status}): {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("failed to parse booking API response ({what})"))
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn list_bookings(&self) -> anyhow::Result<Vec<Booking>> {
        let req = self.client.get(self.url(&["bookings"])?);
        self.send_json(req, "list bookings").await
    }

    async fn list_barbers(&self) -> anyhow::Result<Vec<Barber>> {
        let req = self.client.get(self.url(&["barbers"])?);
        self.send_json(req, "list barbers").await
    }

    async fn update_status(&self, booking_id: &str, status: &BookingStatus) -> anyhow::Result<Booking> {
        let req = self
            .client
            .put(self.url(&["bookings", booking_id, "status"])?)
            .json(&json!({ "status": status.as_str() }));
        self.send_json(req, "update booking status").await
    }

    async fn delete_booking(&self, booking_id: &str) -> anyhow::Result<()> {
        let url = self.url(&["bookings", booking_id])?;
        self.authorized(self.client.delete(url))
            .send()
            .await
            .context("failed to call booking API (delete booking)")?
            .error_for_status()
            .context("booking API returned error (delete booking)")?;
        Ok(())
    }

    async fn dashboard_metrics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<serde_json::Value> {
        let req = self.client.get(self.url(&["dashboard-metrics"])?).query(&[
            ("startDate", start.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
        ]);
        self.send_json(req, "dashboard metrics").await
    }

    async fn list_products(&self) -> anyhow::Result<Vec<Product>> {
        let req = self.client.get(self.url(&["products"])?);
        self.send_json(req, "list products").await
    }

    async fn create_product(&self, draft: &ProductDraft) -> anyhow::Result<Product> {
        let req = self.client.post(self.url(&["products"])?).json(draft);
        self.send_json(req, "create product").await
    }
}
