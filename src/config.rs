use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub admin_token: String,
    pub booking_api_url: String,
    pub barbershop_id: String,
    pub booking_api_token: String,
    pub request_timeout_secs: u64,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            booking_api_url: env::var("BOOKING_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            barbershop_id: env::var("BARBERSHOP_ID").unwrap_or_else(|_| "default".to_string()),
            booking_api_token: env::var("BOOKING_API_TOKEN").unwrap_or_default(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_default(),
        }
    }
}
