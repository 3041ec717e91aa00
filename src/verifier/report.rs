use super::result::{InteractionResult, VerificationResult};
use crate::domain::contract::{header_value_string, Contract};
use serde_json::{Map, Value as JsonValue};
use std::io::{self, Write};

/// Human-readable and JSON renderings of a [`VerificationResult`], plus a
/// plain overview of a contract document.
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, verbose: false }
    }

    /// Also print request/response lines for passing interactions.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn report(&mut self, result: &VerificationResult) -> io::Result<()> {
        for interaction in &result.interactions {
            if interaction.success {
                writeln!(self.out, "  ✓ {} - passed", interaction.description)?;
                if self.verbose {
                    self.request_line(interaction)?;
                }
            } else {
                writeln!(self.out, "  ✗ {} - failed", interaction.description)?;
                self.failure_details(interaction)?;
            }
        }

        writeln!(
            self.out,
            "\nSummary: {} passed, {} failed (total: {})",
            result.passed_count(),
            result.failed_count(),
            result.interactions.len()
        )
    }

    pub fn report_json(&mut self, result: &VerificationResult) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, result)?;
        writeln!(self.out)
    }

    /// Pacticipants, then each interaction's states, request and response.
    pub fn describe(&mut self, contract: &Contract) -> io::Result<()> {
        writeln!(self.out, "Contract: {} -> {}", contract.consumer.name, contract.provider.name)?;
        writeln!(self.out)?;
        writeln!(self.out, "Consumer: {}", contract.consumer.name)?;
        writeln!(self.out, "Provider: {}", contract.provider.name)?;
        writeln!(self.out)?;

        writeln!(self.out, "Interactions ({}):", contract.interactions.len())?;
        for (i, interaction) in contract.interactions.iter().enumerate() {
            writeln!(self.out, "\n  [{}] {}", i + 1, interaction.description)?;
            let states = interaction.state_names();
            if !states.is_empty() {
                writeln!(self.out, "      Provider State: {}", states.join(", "))?;
            }

            let request = &interaction.request;
            writeln!(self.out, "      Request:")?;
            writeln!(self.out, "        Method: {}", request.method)?;
            writeln!(self.out, "        Path: {}", request.path)?;
            self.header_block("        ", request.headers.as_ref())?;
            if let Some(body) = request.body.as_ref() {
                writeln!(self.out, "        Body: {}", pretty(body, "        "))?;
            }

            let response = &interaction.response;
            writeln!(self.out, "      Response:")?;
            writeln!(self.out, "        Status: {}", response.status)?;
            self.header_block("        ", response.headers.as_ref())?;
            if let Some(body) = response.body.as_ref() {
                writeln!(self.out, "        Body: {}", pretty(body, "        "))?;
            }
        }
        Ok(())
    }

    fn request_line(&mut self, interaction: &InteractionResult) -> io::Result<()> {
        let request = &interaction.request;
        writeln!(self.out, "    Request: {} {}", request.method, request.path)?;
        if let Some(actual) = interaction.actual.as_ref() {
            writeln!(self.out, "    Response: {}", actual.status)?;
        }
        Ok(())
    }

    fn failure_details(&mut self, interaction: &InteractionResult) -> io::Result<()> {
        if let Some(error) = interaction.error.as_deref() {
            writeln!(self.out, "    Error: {}", error)?;
        }
        if let Some(diff) = interaction.diff.as_deref() {
            writeln!(self.out, "    Diff: {}", diff)?;
        }
        writeln!(self.out)?;

        if !interaction.provider_states.is_empty() {
            writeln!(self.out, "    Provider State: {}", interaction.provider_states.join(", "))?;
        }

        let request = &interaction.request;
        writeln!(self.out, "    Request:")?;
        writeln!(self.out, "      {} {}", request.method, request.path)?;
        self.header_block("      ", request.headers.as_ref())?;
        if let Some(body) = request.body.as_ref() {
            writeln!(self.out, "      Body: {}", pretty(body, "      "))?;
        }

        let expected = &interaction.expected;
        writeln!(self.out, "    Expected Response:")?;
        writeln!(self.out, "      Status: {}", expected.status)?;
        self.header_block("      ", expected.headers.as_ref())?;
        if let Some(body) = expected.body.as_ref() {
            writeln!(self.out, "      Body: {}", pretty(body, "      "))?;
        }

        writeln!(self.out, "    Actual Response:")?;
        match interaction.actual.as_ref() {
            Some(actual) => {
                writeln!(self.out, "      Status: {}", actual.status)?;
                if !actual.headers.is_empty() {
                    writeln!(self.out, "      Headers:")?;
                    for (name, value) in actual.headers.iter() {
                        writeln!(self.out, "        {}: {}", name, value)?;
                    }
                }
                if let Some(body) = actual.body.as_ref() {
                    writeln!(self.out, "      Body: {}", pretty(body, "      "))?;
                } else if !actual.raw_body.is_empty() {
                    writeln!(self.out, "      Body (raw): {}", actual.raw_body)?;
                }
            }
            None => writeln!(self.out, "      (no response)")?,
        }

        writeln!(self.out)
    }

    fn header_block(&mut self, indent: &str, headers: Option<&Map<String, JsonValue>>) -> io::Result<()> {
        let Some(headers) = headers.filter(|h| !h.is_empty()) else {
            return Ok(());
        };
        writeln!(self.out, "{}Headers:", indent)?;
        for (name, value) in headers {
            writeln!(self.out, "{}  {}: {}", indent, name, header_value_string(value))?;
        }
        Ok(())
    }
}

/// Pretty JSON with continuation lines indented under the `Body:` label.
fn pretty(value: &JsonValue, indent: &str) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .replace('\n', &format!("\n{}", indent))
}
