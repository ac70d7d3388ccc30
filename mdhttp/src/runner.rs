use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    expression::{Assertion, Context, SideEffect, Value},
    http_client::Transport,
    interpolation::{self, InterpolationMode, Store},
    output::{add_to_lines, ansi, Output},
    request::{parse_request, RequestSpec, Trailer},
    runner_configuration::{JsonPolicy, RunnerConfiguration},
};
use std::{
    fmt::Display,
    io::{self, Write},
};
use tracing::{debug, info, warn};

/// Requests attempted and requests whose assertions all passed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    success_count: usize,
    total_count: usize,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_success(&self) -> bool {
        self.success_count == self.total_count
    }

    fn record(&mut self, passed: bool) {
        self.total_count += 1;
        if passed {
            self.success_count += 1;
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} tests passed",
            self.success_count, self.total_count
        )
    }
}

enum Step {
    Assert(Assertion),
    Execute(SideEffect),
}

/// Runs request blocks one at a time, in order. Values written to the store
/// by one request are visible to the placeholders of every later one.
#[derive(Debug)]
pub struct Runner<W: Write, E: Write> {
    transport: Transport,
    interpolation_mode: InterpolationMode,
    json_policy: JsonPolicy,
    store: Store,
    out: Output<W>,
    err: Output<E>,
}

impl Runner<io::Stdout, io::Stderr> {
    pub fn new(configuration: &RunnerConfiguration) -> Self {
        Self::with_writers(configuration, io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> Runner<W, E> {
    pub fn with_writers(configuration: &RunnerConfiguration, out: W, err: E) -> Self {
        Self {
            transport: Transport::new(configuration.http_client()),
            interpolation_mode: configuration.interpolation_mode(),
            json_policy: configuration.json_policy(),
            store: configuration.variables().clone(),
            out: Output::new(out, configuration.color()),
            err: Output::new(err, configuration.color()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out.into_inner(), self.err.into_inner())
    }

    /// Runs every block and prints the summary. A failing block is reported
    /// and counted, then the next one runs; only a broken console aborts
    /// the run.
    pub async fn run<S: AsRef<str>>(&mut self, blocks: &[S]) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();
        info!(blocks = blocks.len(), "running request blocks");

        for (index, block) in blocks.iter().enumerate() {
            let number = index + 1;

            match self.run_block(block.as_ref()).await {
                Ok(passed) => {
                    debug!(request = number, passed, "request finished");
                    summary.record(passed);
                }
                Err(error) => {
                    warn!(request = number, %error, "request aborted");
                    summary.record(false);
                    self.report_error(number, &error)?;
                }
            }

            self.out.insert_line_feeds(2)?;
        }

        let color = if summary.is_success() {
            ansi::GREEN
        } else {
            ansi::RED
        };
        self.out.format(color);
        self.out.log(summary)?;
        self.out.format(ansi::RESET);
        self.out.flush()?;

        Ok(summary)
    }

    async fn run_block(&mut self, block: &str) -> Result<bool, Error> {
        let request = parse_request(block)?;
        let steps = compile_steps(&request)?;
        let request_data = self.resolve(&request)?;

        self.echo_request(&request_data)?;
        let response = self.transport.send(request_data).await?;
        self.echo_response_headers(&response)?;

        let json = self.decode_json(&response)?;
        if let Some(json) = &json {
            self.out.format(ansi::CYAN);
            self.out
                .log(add_to_lines("< ", &serde_json::to_string_pretty(json)?))?;
            self.out.format(ansi::RESET);
        }

        let json = json.map(Value::from).unwrap_or(Value::Undefined);
        let context = Context {
            status: response.status_code,
            json: &json,
            body: &response.body,
            headers: &response.headers,
        };

        let mut passed = true;
        for step in &steps {
            match step {
                Step::Assert(assertion) => {
                    let result = assertion.evaluate(&context, &self.store)?;
                    self.report_assertion(assertion.source().trim(), result)?;
                    passed &= result;
                }
                Step::Execute(side_effect) => {
                    side_effect.execute(&context, &mut self.store)?;
                }
            }
        }

        Ok(passed)
    }

    fn resolve(&self, request: &RequestSpec) -> Result<RequestData, Error> {
        let mode = self.interpolation_mode;

        Ok(RequestData {
            method: request.method,
            url: interpolation::interpolate(&request.url, &self.store, mode)?,
            headers: interpolation::interpolate_headers(&request.headers, &self.store, mode)?,
            body: interpolation::interpolate_optional(request.body.as_deref(), &self.store, mode)?,
        })
    }

    fn decode_json(&self, response: &ResponseData) -> Result<Option<serde_json::Value>, Error> {
        let looks_like_json = match self.json_policy {
            JsonPolicy::Always => true,
            JsonPolicy::ContentType => response
                .header("content-type")
                .map(|content_type| content_type.to_ascii_lowercase().contains("json"))
                .unwrap_or(false),
        };

        if !looks_like_json || response.body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&response.body)?))
    }

    fn echo_request(&mut self, request_data: &RequestData) -> io::Result<()> {
        self.out
            .log(format!("> {} {}", request_data.method, request_data.url))?;
        for (key, value) in &request_data.headers {
            self.out.log(format!("> {}: {}", key, value))?;
        }

        if let Some(body) = &request_data.body {
            self.out.format(ansi::CYAN);
            self.out.log(add_to_lines("> ", body))?;
            self.out.format(ansi::RESET);
        }

        Ok(())
    }

    fn echo_response_headers(&mut self, response: &ResponseData) -> io::Result<()> {
        for (key, value) in &response.headers {
            self.out.log(format!("< {}: {}", key, value))?;
        }

        Ok(())
    }

    fn report_assertion(&mut self, source: &str, passed: bool) -> io::Result<()> {
        let (color, verdict) = if passed {
            (ansi::GREEN, "passed")
        } else {
            (ansi::RED, "failed")
        };

        self.out.log(format!(
            "{}test: [ {} ] has {}{}",
            self.out.code(color),
            source,
            verdict,
            self.out.code(ansi::RESET)
        ))
    }

    fn report_error(&mut self, number: usize, error: &Error) -> io::Result<()> {
        self.out.reset()?;

        self.err.format(ansi::RED);
        self.err
            .log(format!("[ERROR] request #{} aborted: {}", number, error))?;
        self.err.format(ansi::RESET);
        self.err.reset()
    }
}

fn compile_steps(request: &RequestSpec) -> Result<Vec<Step>, Error> {
    let steps = request
        .trailers
        .iter()
        .map(|trailer| match trailer {
            Trailer::Assertion(source) => Assertion::compile(source.as_str()).map(Step::Assert),
            Trailer::SideEffect(source) => SideEffect::compile(source.as_str()).map(Step::Execute),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(steps)
}
