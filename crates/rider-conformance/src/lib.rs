#![forbid(unsafe_code)]

//! Conformance packets for descriptor layout resolution.
//!
//! A packet is a JSON fixture of descriptor requests and the layout (or
//! error kind) each must resolve to. [`run_layout_packet`] replays a packet
//! through [`rider_layout::resolve_descriptor`] and reports per-case parity.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use blake3::hash;
use rider_layout::{
    ArrayType, DescriptorRequest, EvidenceLedger, LayoutError, LayoutErrorKind, LayoutOptions,
    ResolutionEvidence, RuntimeMode, TransformDescriptor, resolve_descriptor_with_evidence,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Evidence entries kept per packet run when the caller brings no ledger.
pub const DEFAULT_EVIDENCE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub fixture_root: PathBuf,
    pub artifact_root: PathBuf,
    /// Only run cases in this mode.
    pub mode_filter: Option<RuntimeMode>,
}

impl HarnessConfig {
    #[must_use]
    pub fn default_paths() -> Self {
        let fixture_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        Self {
            artifact_root: fixture_root.join("artifacts"),
            fixture_root,
            mode_filter: None,
        }
    }

    #[must_use]
    pub fn artifact_dir_for(&self, packet_id: &str) -> PathBuf {
        self.artifact_root.join(packet_id)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("fixture load failed for {path}: {source}")]
    FixtureIo { path: PathBuf, source: io::Error },
    #[error("fixture parse failed for {path}: {source}")]
    FixtureParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact write failed for {path}: {source}")]
    ArtifactIo { path: PathBuf, source: io::Error },
    #[error("artifact serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedOutcome {
    Resolved {
        input_type: ArrayType,
        output_type: ArrayType,
        input_stride: Vec<usize>,
        output_stride: Vec<usize>,
        #[serde(default)]
        input_distance: Option<usize>,
        #[serde(default)]
        output_distance: Option<usize>,
    },
    Error {
        error: LayoutErrorKind,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutCase {
    pub case_id: String,
    #[serde(default)]
    pub mode: RuntimeMode,
    pub request: DescriptorRequest,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutPacketFixture {
    pub packet_id: String,
    pub family: String,
    pub cases: Vec<LayoutCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseResult {
    pub case_id: String,
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PacketReport {
    pub packet_id: String,
    pub family: String,
    pub fixture_blake3: String,
    pub case_results: Vec<CaseResult>,
    pub passed_cases: usize,
    pub failed_cases: usize,
    pub generated_unix_ms: u128,
}

impl PacketReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_cases == 0
    }
}

/// Fixture file names under `fixture_root`, sorted.
pub fn discover_packets(config: &HarnessConfig) -> Result<Vec<String>, HarnessError> {
    let entries = fs::read_dir(&config.fixture_root).map_err(|source| HarnessError::FixtureIo {
        path: config.fixture_root.clone(),
        source,
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| HarnessError::FixtureIo {
                path: config.fixture_root.clone(),
                source,
            })?
            .path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            names.push(name.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

pub fn load_layout_fixture(path: &Path) -> Result<(LayoutPacketFixture, Vec<u8>), HarnessError> {
    let raw = fs::read(path).map_err(|source| HarnessError::FixtureIo {
        path: path.to_path_buf(),
        source,
    })?;
    let fixture = serde_json::from_slice(&raw).map_err(|source| HarnessError::FixtureParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((fixture, raw))
}

pub fn run_layout_packet(
    config: &HarnessConfig,
    fixture_name: &str,
) -> Result<PacketReport, HarnessError> {
    let mut ledger = EvidenceLedger::new(DEFAULT_EVIDENCE_CAPACITY);
    run_layout_packet_with_evidence(config, fixture_name, &mut ledger)
}

/// [`run_layout_packet`], recording every resolution in `ledger`.
pub fn run_layout_packet_with_evidence(
    config: &HarnessConfig,
    fixture_name: &str,
    ledger: &mut EvidenceLedger<ResolutionEvidence>,
) -> Result<PacketReport, HarnessError> {
    let fixture_path = config.fixture_root.join(fixture_name);
    let (fixture, raw) = load_layout_fixture(&fixture_path)?;

    let mut case_results = Vec::with_capacity(fixture.cases.len());
    for case in &fixture.cases {
        if config.mode_filter.is_some_and(|mode| mode != case.mode) {
            continue;
        }
        let options = LayoutOptions::default().with_mode(case.mode);
        let outcome = resolve_descriptor_with_evidence(&case.request, &options, ledger);
        let result = evaluate_case(case, &outcome);
        if result.passed {
            debug!(packet = %fixture.packet_id, case = %case.case_id, "case passed");
        } else {
            warn!(
                packet = %fixture.packet_id,
                case = %case.case_id,
                "case failed: {}",
                result.message
            );
        }
        case_results.push(result);
    }

    let report = build_packet_report(
        fixture.packet_id,
        fixture.family,
        hash(&raw).to_hex().to_string(),
        case_results,
    );
    info!(
        packet = %report.packet_id,
        passed = report.passed_cases,
        failed = report.failed_cases,
        "packet finished"
    );
    Ok(report)
}

/// Compare one observed resolution against the case's expectation.
#[must_use]
pub fn evaluate_case(
    case: &LayoutCase,
    outcome: &Result<TransformDescriptor, LayoutError>,
) -> CaseResult {
    let (passed, message) = match (&case.expected, outcome) {
        (
            ExpectedOutcome::Resolved {
                input_type,
                output_type,
                input_stride,
                output_stride,
                input_distance,
                output_distance,
            },
            Ok(actual),
        ) => {
            let pass = actual.input_type() == *input_type
                && actual.output_type() == *output_type
                && actual.input_stride() == input_stride.as_slice()
                && actual.output_stride() == output_stride.as_slice()
                && input_distance.is_none_or(|distance| distance == actual.input_distance())
                && output_distance.is_none_or(|distance| distance == actual.output_distance());
            let msg = if pass {
                "layout matched expected contract".to_owned()
            } else {
                format!(
                    "mismatch: expected {input_type}->{output_type} istride={input_stride:?} ostride={output_stride:?} idist={input_distance:?} odist={output_distance:?}; got {}->{} istride={:?} ostride={:?} idist={} odist={}",
                    actual.input_type(),
                    actual.output_type(),
                    actual.input_stride(),
                    actual.output_stride(),
                    actual.input_distance(),
                    actual.output_distance()
                )
            };
            (pass, msg)
        }
        (ExpectedOutcome::Error { error }, Err(actual)) => {
            let pass = *error == actual.kind();
            let msg = if pass {
                "error matched expected contract".to_owned()
            } else {
                format!("mismatch: expected error `{error}`, got `{}` ({actual})", actual.kind())
            };
            (pass, msg)
        }
        (ExpectedOutcome::Resolved { .. }, Err(actual)) => (
            false,
            format!("expected a resolved layout, got error `{}` ({actual})", actual.kind()),
        ),
        (ExpectedOutcome::Error { error }, Ok(actual)) => (
            false,
            format!(
                "expected error `{error}`, got resolved layout istride={:?} ostride={:?}",
                actual.input_stride(),
                actual.output_stride()
            ),
        ),
    };

    CaseResult {
        case_id: case.case_id.clone(),
        passed,
        message,
    }
}

/// Write `report` as `<artifact_root>/<packet_id>/report.json`.
pub fn write_packet_report(
    config: &HarnessConfig,
    report: &PacketReport,
) -> Result<PathBuf, HarnessError> {
    let output_dir = create_artifact_dir(config, &report.packet_id)?;
    let report_path = output_dir.join("report.json");
    let report_bytes = serde_json::to_vec_pretty(report)?;
    fs::write(&report_path, report_bytes).map_err(|source| HarnessError::ArtifactIo {
        path: report_path.clone(),
        source,
    })?;
    Ok(report_path)
}

/// Write the retained ledger entries as JSON lines, oldest first, to
/// `<artifact_root>/<packet_id>/evidence.jsonl`. Each line carries its
/// `sequence`, so a gap at the start means earlier entries were dropped.
pub fn write_evidence_log(
    config: &HarnessConfig,
    packet_id: &str,
    ledger: &EvidenceLedger<ResolutionEvidence>,
) -> Result<PathBuf, HarnessError> {
    let output_dir = create_artifact_dir(config, packet_id)?;
    let log_path = output_dir.join("evidence.jsonl");
    let mut buffer = Vec::new();
    for entry in ledger.sequenced() {
        serde_json::to_writer(&mut buffer, entry)?;
        buffer
            .write_all(b"\n")
            .map_err(|source| HarnessError::ArtifactIo {
                path: log_path.clone(),
                source,
            })?;
    }
    fs::write(&log_path, buffer).map_err(|source| HarnessError::ArtifactIo {
        path: log_path.clone(),
        source,
    })?;
    Ok(log_path)
}

fn create_artifact_dir(config: &HarnessConfig, packet_id: &str) -> Result<PathBuf, HarnessError> {
    let output_dir = config.artifact_dir_for(packet_id);
    fs::create_dir_all(&output_dir).map_err(|source| HarnessError::ArtifactIo {
        path: output_dir.clone(),
        source,
    })?;
    Ok(output_dir)
}

fn build_packet_report(
    packet_id: String,
    family: String,
    fixture_blake3: String,
    case_results: Vec<CaseResult>,
) -> PacketReport {
    let passed_cases = case_results.iter().filter(|r| r.passed).count();
    let failed_cases = case_results.len().saturating_sub(passed_cases);
    PacketReport {
        packet_id,
        family,
        fixture_blake3,
        case_results,
        passed_cases,
        failed_cases,
        generated_unix_ms: now_unix_ms(),
    }
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis())
}
