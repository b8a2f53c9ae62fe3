pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Barber, Booking, BookingStatus, Product, ProductDraft};

/// The booking platform's REST backend, scoped to one barbershop.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_bookings(&self) -> anyhow::Result<Vec<Booking>>;

    async fn list_barbers(&self) -> anyhow::Result<Vec<Barber>>;

    async fn update_status(&self, booking_id: &str, status: &BookingStatus) -> anyhow::Result<Booking>;

    async fn delete_booking(&self, booking_id: &str) -> anyhow::Result<()>;

    async fn dashboard_metrics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<serde_json::Value>;

    async fn list_products(&self) -> anyhow::Result<Vec<Product>>;

    async fn create_product(&self, draft: &ProductDraft) -> anyhow::Result<Product>;
}
