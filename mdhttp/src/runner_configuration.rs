use crate::{
    expression::Value,
    http_client::{HttpClient, HyperHttpClient},
    interpolation::{InterpolationMode, Store},
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// When a response body is decoded as JSON for `this.json`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JsonPolicy {
    /// Only when the `content-type` header mentions `json`. Without a
    /// `content-type` header `this.json` is `undefined`.
    ContentType,
    /// Every non-empty body.
    Always,
}

impl Default for JsonPolicy {
    fn default() -> Self {
        JsonPolicy::ContentType
    }
}

#[derive(Debug)]
pub struct RunnerConfiguration {
    document_path: PathBuf,
    interpolation_mode: InterpolationMode,
    json_policy: JsonPolicy,
    color: bool,
    variables: Store,
    http_client: Option<Arc<dyn HttpClient + Send + Sync>>,
}

impl RunnerConfiguration {
    pub fn new<P: Into<PathBuf>>(document_path: P) -> Self {
        Self {
            document_path: document_path.into(),
            interpolation_mode: InterpolationMode::default(),
            json_policy: JsonPolicy::default(),
            color: true,
            variables: Store::new(),
            http_client: None,
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn set_interpolation_mode(&mut self, mode: InterpolationMode) {
        self.interpolation_mode = mode;
    }

    pub fn interpolation_mode(&self) -> InterpolationMode {
        self.interpolation_mode
    }

    pub fn set_json_policy(&mut self, policy: JsonPolicy) {
        self.json_policy = policy;
    }

    pub fn json_policy(&self) -> JsonPolicy {
        self.json_policy
    }

    pub fn set_color(&mut self, value: bool) {
        self.color = value;
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Seeds the interpolation store before the first request.
    pub fn set_variable<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn variables(&self) -> &Store {
        &self.variables
    }

    pub fn http_client(&self) -> Arc<dyn HttpClient + Send + Sync> {
        self.http_client
            .clone()
            .unwrap_or_else(|| Arc::new(HyperHttpClient::new()))
    }

    pub fn set_http_client(&mut self, http_client: Arc<dyn HttpClient + Send + Sync>) {
        self.http_client = Some(http_client);
    }
}
