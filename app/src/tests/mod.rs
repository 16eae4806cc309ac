
use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};
use soapbox_api::{ApiError, ApiResponse, Transport};

/// Transport answering GETs from a route table: url -> (body, Link header).
#[derive(Default)]
pub(crate) struct RouteTransport {
    routes: HashMap<String, (Value, Option<String>)>,
    requests: Mutex<Vec<String>>,
}

impl RouteTransport {
    pub(crate) fn route(mut self, url: &str, body: Value, next: Option<&str>) -> Self {
        let link = next.map(|next| format!("<{next}>; rel=\"next\""));
        self.routes.insert(url.to_string(), (body, link));
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for RouteTransport {
    async fn get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some((body, link)) => Ok(ApiResponse {
                status: 200,
                link: link.clone(),
                total_count: None,
                body: body.to_string(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                message: format!("no route for {url}"),
            }),
        }
    }
}

pub(crate) fn status(id: &str) -> Value {
    json!({ "id": id, "content": format!("<p>{id}</p>"), "account": { "id": "a1", "acct": "alex" } })
}
