use serde::Serialize;

#[derive(Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub method: String,
    pub path: String,
}
