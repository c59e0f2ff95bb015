use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    // directory backing the local key-value storage
    pub storage_dir: String,

    pub quote_base_url: String,

    pub emailjs_base_url: String,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
    pub emailjs_user_id: String,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let storage_dir = env::var("STORAGE_DIR").unwrap_or_else(|_| ".stockwatch".to_string());

    let quote_base_url = env::var("QUOTE_BASE_URL")
        .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string());

    let emailjs_base_url =
        env::var("EMAILJS_BASE_URL").unwrap_or_else(|_| "https://api.emailjs.com".to_string());
    let emailjs_service_id = env::var("EMAILJS_SERVICE_ID").unwrap_or_default();
    let emailjs_template_id = env::var("EMAILJS_TEMPLATE_ID").unwrap_or_default();
    let emailjs_user_id = env::var("EMAILJS_USER_ID").unwrap_or_default();

    Settings {
        host,
        port,
        storage_dir,
        quote_base_url,
        emailjs_base_url,
        emailjs_service_id,
        emailjs_template_id,
        emailjs_user_id,
    }
}
