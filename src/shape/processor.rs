//! Line and file processing API
//!
//! This module runs the engine over single lines, multi-line text or whole files and renders
//! the outcome in one of several output formats. What to produce is described by a
//! [ProcessingSpec] string of the form `<stage>-<format>`:
//!
//!     token-simple    token-json    token-yaml
//!     shape-simple    shape-json    shape-yaml    shape-dump    shape-treeviz
//!
//! The `token` stage only runs the scanner. The `shape` stage runs the full parse; `dump` and
//! `treeviz` render its element tree and only make sense there.
//!
//! Every line is bounded before it reaches the engine: it is cut at
//! [LimitsConfig::max_line_bytes](crate::shape::config::LimitsConfig) and its token stream
//! ends after `max_tokens` tokens. Both events are logged as warnings.

use crate::shape::config::ShapeConfig;
use crate::shape::formats::{result_to_dump_str, result_to_treeviz_str};
use crate::shape::parser::{Column, DataParser, ParseResult};
use crate::shape::scanner::{Capped, Scanner, TokenKind, TokenSource};
use crate::shape::schema::SchemaId;
use crate::shape::span::{InputLine, Span};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Represents the processing stage (what data to extract)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Token,
    Shape,
}

/// Represents the output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Simple,
    Json,
    Yaml,
    Dump,
    Treeviz,
}

/// Represents a complete processing specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSpec {
    pub stage: ProcessingStage,
    pub format: OutputFormat,
}

impl ProcessingStage {
    fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Token => "token",
            ProcessingStage::Shape => "shape",
        }
    }
}

impl OutputFormat {
    fn name(&self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Dump => "dump",
            OutputFormat::Treeviz => "treeviz",
        }
    }
}

impl ProcessingSpec {
    /// Parse a format string like "shape-json" or "token-simple"
    pub fn from_string(format_str: &str) -> Result<Self, ProcessingError> {
        let Some((stage, format)) = format_str.split_once('-') else {
            return Err(ProcessingError::InvalidFormat(format_str.to_string()));
        };

        let stage = match stage {
            "token" => ProcessingStage::Token,
            "shape" => ProcessingStage::Shape,
            _ => return Err(ProcessingError::InvalidStage(stage.to_string())),
        };

        let format = match format {
            "simple" => OutputFormat::Simple,
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            "dump" => OutputFormat::Dump,
            "treeviz" => OutputFormat::Treeviz,
            _ => return Err(ProcessingError::InvalidFormatType(format.to_string())),
        };

        if stage == ProcessingStage::Token
            && matches!(format, OutputFormat::Dump | OutputFormat::Treeviz)
        {
            return Err(ProcessingError::InvalidFormatType(format!(
                "Format '{}' only works with the shape stage",
                format.name()
            )));
        }

        Ok(ProcessingSpec { stage, format })
    }

    /// Get all available processing specifications
    pub fn available_specs() -> Vec<ProcessingSpec> {
        use OutputFormat::*;

        let token = [Simple, Json, Yaml].map(|format| ProcessingSpec {
            stage: ProcessingStage::Token,
            format,
        });
        let shape = [Simple, Json, Yaml, Dump, Treeviz].map(|format| ProcessingSpec {
            stage: ProcessingStage::Shape,
            format,
        });
        token.into_iter().chain(shape).collect()
    }
}

impl fmt::Display for ProcessingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stage.name(), self.format.name())
    }
}

/// Errors that can occur during processing
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid stage: {0}")]
    InvalidStage(String),
    #[error("Invalid format type: {0}")]
    InvalidFormatType(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Get all available format strings
pub fn available_formats() -> Vec<String> {
    ProcessingSpec::available_specs()
        .into_iter()
        .map(|spec| spec.to_string())
        .collect()
}

/// What the shape stage reports for one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line: usize,
    pub format: &'static str,
    pub schema: SchemaId,
    /// Set when the byte, token or depth limit changed what was parsed
    pub truncated: bool,
    pub columns: Vec<Column>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_row: Option<Vec<String>>,
}

/// What the token stage reports for one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub line: usize,
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenEntry {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Cuts `line` to at most `max_bytes`, backing off to a char boundary
pub fn bound_line(line: &str, max_bytes: usize) -> (&str, bool) {
    if line.len() <= max_bytes {
        return (line, false);
    }
    let mut end = max_bytes;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    (&line[..end], true)
}

struct Analysis<'a> {
    text: &'a str,
    truncated: bool,
    result: ParseResult,
}

fn analyze<'a>(line_no: usize, line: &'a str, config: &ShapeConfig) -> Analysis<'a> {
    let (text, truncated) = bound_line(line, config.limits.max_line_bytes);
    if truncated {
        warn!(
            line = line_no,
            length = line.len(),
            limit = config.limits.max_line_bytes,
            "line truncated"
        );
    }

    let source = Capped::new(Scanner::new(text), config.limits.max_tokens);
    let (result, source) = DataParser::new(source)
        .with_max_depth(config.limits.max_depth)
        .parse_with_source();
    if source.was_cut() {
        warn!(
            line = line_no,
            limit = config.limits.max_tokens,
            "token limit reached"
        );
    }
    if result.depth_limited {
        warn!(
            line = line_no,
            limit = config.limits.max_depth,
            "bracket depth limit reached"
        );
    }

    Analysis {
        text,
        truncated: truncated || source.was_cut() || result.depth_limited,
        result,
    }
}

fn line_report(line_no: usize, analysis: &Analysis<'_>, config: &ShapeConfig) -> LineReport {
    let input = InputLine::new(analysis.text);
    let free_row = config.output.include_free_row.then(|| {
        analysis
            .result
            .free_row
            .iter()
            .filter(|element| !element.is_whitespace())
            .map(|element| input.substring(element.span()).into_owned())
            .collect()
    });

    LineReport {
        line: line_no,
        format: analysis.result.format.name,
        schema: analysis.result.schema,
        truncated: analysis.truncated,
        columns: analysis
            .result
            .columns_with_prefix(input, &config.output.blank_key_prefix),
        free_row,
    }
}

fn token_report(line_no: usize, line: &str, config: &ShapeConfig) -> TokenReport {
    let (text, _) = bound_line(line, config.limits.max_line_bytes);
    let input = InputLine::new(text);
    let mut source = Capped::new(Scanner::new(text), config.limits.max_tokens);
    let mut tokens = Vec::new();
    while let Some(token) = source.next_token() {
        tokens.push(TokenEntry {
            kind: token.kind,
            span: token.span,
            text: input.substring(token.span).into_owned(),
        });
    }
    TokenReport {
        line: line_no,
        tokens,
    }
}

fn format_simple_tokens(report: &TokenReport) -> String {
    let mut result = String::new();
    for token in &report.tokens {
        if token.kind == TokenKind::Whitespace {
            result.push_str(&token.kind.to_string());
        } else {
            result.push_str(&format!("<{}:{}>", token.kind.short_name(), token.text));
        }
    }
    result.push('\n');
    result
}

fn format_simple_report(report: &LineReport) -> String {
    let schema = if report.schema.is_empty() {
        "-".to_string()
    } else {
        report.schema.to_string()
    };
    let mut result = format!("{}: {} {}\n", report.line, report.format, schema);
    for column in &report.columns {
        result.push_str(&format!("  {} = {}\n", column.name, column.value));
    }
    for text in report.free_row.iter().flatten() {
        result.push_str(&format!("  ~ {}\n", text));
    }
    result
}

/// Process a single line according to the given specification
pub fn process_line(
    line: &str,
    spec: &ProcessingSpec,
    config: &ShapeConfig,
) -> Result<String, ProcessingError> {
    process_lines(std::iter::once(line), spec, config)
}

/// Process multi-line text, one report per line
pub fn process_str(
    text: &str,
    spec: &ProcessingSpec,
    config: &ShapeConfig,
) -> Result<String, ProcessingError> {
    process_lines(text.lines(), spec, config)
}

/// Process a log file according to the given specification
pub fn process_file<P: AsRef<Path>>(
    file_path: P,
    spec: &ProcessingSpec,
    config: &ShapeConfig,
) -> Result<String, ProcessingError> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path)?;
    debug!(path = %file_path.display(), bytes = content.len(), spec = %spec, "processing file");
    process_str(&content, spec, config)
}

fn process_lines<'a>(
    lines: impl Iterator<Item = &'a str>,
    spec: &ProcessingSpec,
    config: &ShapeConfig,
) -> Result<String, ProcessingError> {
    let numbered = lines.enumerate().map(|(index, line)| (index + 1, line));

    match spec.stage {
        ProcessingStage::Token => {
            let reports: Vec<TokenReport> = numbered
                .map(|(line_no, line)| token_report(line_no, line, config))
                .collect();
            match spec.format {
                OutputFormat::Simple => Ok(reports.iter().map(format_simple_tokens).collect()),
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&reports)?),
                OutputFormat::Yaml => Ok(serde_yaml::to_string(&reports)?),
                OutputFormat::Dump | OutputFormat::Treeviz => {
                    Err(ProcessingError::InvalidFormatType(format!(
                        "Format '{}' only works with the shape stage",
                        spec.format.name()
                    )))
                }
            }
        }
        ProcessingStage::Shape => {
            let analyses: Vec<(usize, Analysis<'a>)> = numbered
                .map(|(line_no, line)| (line_no, analyze(line_no, line, config)))
                .collect();
            match spec.format {
                OutputFormat::Dump => Ok(render_trees(&analyses, result_to_dump_str)),
                OutputFormat::Treeviz => Ok(render_trees(&analyses, result_to_treeviz_str)),
                OutputFormat::Simple | OutputFormat::Json | OutputFormat::Yaml => {
                    let reports: Vec<LineReport> = analyses
                        .iter()
                        .map(|(line_no, analysis)| line_report(*line_no, analysis, config))
                        .collect();
                    match spec.format {
                        OutputFormat::Json => Ok(serde_json::to_string_pretty(&reports)?),
                        OutputFormat::Yaml => Ok(serde_yaml::to_string(&reports)?),
                        _ => Ok(reports.iter().map(format_simple_report).collect()),
                    }
                }
            }
        }
    }
}

/// Renders each line's tree, separating lines with a blank line
fn render_trees(
    analyses: &[(usize, Analysis<'_>)],
    render: fn(InputLine<'_>, &ParseResult) -> String,
) -> String {
    analyses
        .iter()
        .map(|(_, analysis)| render(InputLine::new(analysis.text), &analysis.result))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses one line under the configured limits; the flag reports whether any limit applied
pub fn parse_bounded(line: &str, config: &ShapeConfig) -> (ParseResult, bool) {
    let analysis = analyze(1, line, config);
    (analysis.result, analysis.truncated)
}
