#[cfg(test)]
mod server {
    use hyper::{
        body,
        service::{make_service_fn, service_fn},
        Body, Method, Request, Response, Server,
    };
    use std::{convert::Infallible, net::SocketAddr, sync::mpsc, sync::Once, thread};
    use tokio::runtime::Runtime;

    pub const ADDRESS: &str = "http://127.0.0.1:61417";

    static START_SERVER: Once = Once::new();

    pub fn start_once() {
        START_SERVER.call_once(|| {
            let (ready_sender, ready_receiver) = mpsc::channel();

            thread::spawn(move || {
                Runtime::new().unwrap().block_on(async move {
                    let addr = SocketAddr::from(([127, 0, 0, 1], 61417));

                    let server = Server::bind(&addr).serve(make_service_fn(|_| async {
                        Ok::<_, Infallible>(service_fn(handle_request))
                    }));
                    ready_sender.send(()).unwrap();

                    if let Err(e) = server.await {
                        eprintln!("Test server error: {}", e);
                    }
                });
            });

            ready_receiver.recv().unwrap();
        });
    }

    async fn handle_request(request: Request<Body>) -> Result<Response<Body>, Infallible> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let declared_length = request
            .headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = body::to_bytes(request.into_body()).await.unwrap_or_default();
        let body = String::from_utf8_lossy(&body);

        let response = match (method, path.as_str()) {
            (Method::POST, "/topics") => json_response(
                201,
                format!(
                    "{{\"id\": 1, \"length\": {:?}, \"echo\": {}}}",
                    declared_length.unwrap_or_default(),
                    body
                ),
            ),
            (Method::GET, "/topics/1") => json_response(200, r#"{"id": 1, "title": "hello"}"#),
            (Method::GET, "/health") => Response::builder()
                .status(200)
                .header("content-type", "text/plain")
                .body(Body::from("ok"))
                .unwrap(),
            _ => Response::builder()
                .status(404)
                .body(Body::empty())
                .unwrap(),
        };

        Ok(response)
    }

    fn json_response<B: Into<Body>>(status: u16, body: B) -> Response<Body> {
        Response::builder()
            .status(status)
            .header("content-type", "application/json; charset=utf-8")
            .body(body.into())
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::server;
    use mdhttp::{markdown_http_test, InterpolationMode, RunnerConfiguration};
    use std::path::Path;

    fn configure(configuration: &mut RunnerConfiguration) {
        configuration.set_variable("host", server::ADDRESS);
        configuration.set_color(false);
    }

    fn configure_strict(configuration: &mut RunnerConfiguration) {
        configure(configuration);
        configuration.set_interpolation_mode(InterpolationMode::Strict);
    }

    #[markdown_http_test("markdown/empty.md")]
    fn document_without_requests_passes() {}

    #[markdown_http_test("markdown/topics.md", configure)]
    fn topics_walkthrough() {
        server::start_once();
    }

    #[markdown_http_test("markdown/topics.md", configure_strict)]
    fn topics_walkthrough_with_strict_placeholders() {
        server::start_once();
    }

    #[test]
    fn failures_are_isolated_per_request() {
        server::start_once();

        let mut configuration = RunnerConfiguration::new(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("markdown/failures.md"),
        );
        configure(&mut configuration);

        let summary = mdhttp::run_blocking(configuration).unwrap();

        assert_eq!(summary.total_count(), 4);
        assert_eq!(summary.success_count(), 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn missing_document_is_an_error() {
        let configuration = RunnerConfiguration::new("markdown/does-not-exist.md");

        assert!(mdhttp::run_blocking(configuration).is_err());
    }
}
