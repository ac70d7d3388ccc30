mod data;
mod error;
pub mod expression;
mod http_client;
pub mod interpolation;
pub mod markdown;
pub mod output;
pub mod request;
mod runner;
mod runner_configuration;
mod util;

pub use data::{RequestData, ResponseData};
pub use error::Error;
pub use http_client::{HttpClient, HyperHttpClient, Transport};
pub use interpolation::{InterpolationMode, Store};
pub use mdhttp_codegen::markdown_http_test;
pub use runner::{RunSummary, Runner};
pub use runner_configuration::{JsonPolicy, RunnerConfiguration};

/// Loads the configured document and runs its request blocks, printing
/// progress to stdout.
pub async fn run_document(configuration: RunnerConfiguration) -> Result<RunSummary, Error> {
    let document = markdown::load_document(configuration.document_path())?;
    let blocks = markdown::find_requests(&document);

    Runner::new(&configuration).run(&blocks).await
}

/// [`run_document`] on a single-threaded runtime of its own.
pub fn run_blocking(configuration: RunnerConfiguration) -> Result<RunSummary, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_document(configuration))
}
