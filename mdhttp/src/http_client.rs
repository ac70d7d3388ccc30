use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    util,
};
use async_trait::async_trait;
use hyper::{body, client::HttpConnector, Body, Request, Uri};
use hyper_tls::HttpsConnector;
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

/// Performs a single HTTP exchange. Implementations must report connection
/// failures as errors rather than fabricating a response.
#[async_trait]
pub trait HttpClient: Debug {
    async fn make_request(&self, request_data: &RequestData) -> Result<ResponseData, Error>;
}

#[derive(Debug)]
pub struct HyperHttpClient {
    client: hyper::Client<HttpsConnector<HttpConnector>>,
}

impl HyperHttpClient {
    pub fn new() -> Self {
        Self {
            client: hyper::Client::builder().build(HttpsConnector::new()),
        }
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn make_request(&self, request_data: &RequestData) -> Result<ResponseData, Error> {
        let uri: Uri = request_data
            .url
            .parse()
            .map_err(|_| Error::InvalidUri(request_data.url.clone()))?;
        let mut request_builder = Request::builder()
            .uri(uri)
            .method(request_data.method.as_str());

        if let Some(headers_mut) = request_builder.headers_mut() {
            util::put_headers(headers_mut, &request_data.headers)?;
        }

        let body = match &request_data.body {
            Some(body) => Body::from(body.clone()),
            None => Body::empty(),
        };
        let request: Request<Body> = request_builder.body(body)?;

        let response = self.client.request(request).await?;

        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = body::to_bytes(response.into_body()).await?;
        let body: String = String::from_utf8_lossy(&body).into();

        Ok(ResponseData {
            status_code,
            body,
            headers,
        })
    }
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Sends requests through an [`HttpClient`], adding a `Content-Length`
/// header for bodies that don't declare one.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: Arc<dyn HttpClient + Send + Sync>,
}

impl Transport {
    pub fn new(http_client: Arc<dyn HttpClient + Send + Sync>) -> Self {
        Self { http_client }
    }

    pub async fn send(&self, mut request_data: RequestData) -> Result<ResponseData, Error> {
        with_content_length(&mut request_data);

        debug!(
            method = request_data.method.as_str(),
            url = request_data.url.as_str(),
            "sending request"
        );
        let response = self.http_client.make_request(&request_data).await?;
        debug!(status = response.status_code, "received response");

        Ok(response)
    }
}

fn with_content_length(request_data: &mut RequestData) {
    let length = match &request_data.body {
        Some(body) => body.len(),
        None => return,
    };

    let declared = request_data
        .headers
        .keys()
        .any(|key| key.eq_ignore_ascii_case("content-length"));

    if !declared {
        request_data
            .headers
            .insert(String::from("Content-Length"), length.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Headers, Method};

    fn request(body: Option<&str>, headers: &[(&str, &str)]) -> RequestData {
        RequestData {
            method: Method::Post,
            url: String::from("http://localhost/"),
            headers: headers
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<Headers>(),
            body: body.map(String::from),
        }
    }

    #[test]
    fn absent_body_gets_no_content_length() {
        let mut request_data = request(None, &[]);

        with_content_length(&mut request_data);

        assert!(request_data.headers.is_empty());
    }

    #[test]
    fn body_gets_byte_length() {
        let mut request_data = request(Some("{\"name\": \"ü\"}"), &[]);

        with_content_length(&mut request_data);

        assert_eq!(request_data.headers["Content-Length"], "14");
    }

    #[test]
    fn declared_content_length_is_kept() {
        let mut request_data = request(Some("abc"), &[("content-length", "99")]);

        with_content_length(&mut request_data);

        assert_eq!(request_data.headers.len(), 1);
        assert_eq!(request_data.headers["content-length"], "99");
    }
}
