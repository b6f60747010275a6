use poem_openapi::payload::PlainText;

use crate::readarr_client::ReadarrClient;

pub struct HealthService<'a> {
    pub client: &'a ReadarrClient,
}

impl<'a> HealthService<'a> {
    pub fn new(client: &'a ReadarrClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn status_text(&self) -> PlainText<String> {
        match self.client.system_status().await {
            Ok(s) => PlainText(format!(
                "Readarr app={} version={}",
                s.app_name.unwrap_or_default(),
                s.version
            )),
            Err(e) => PlainText(format!("error: {}", e)),
        }
    }
}
