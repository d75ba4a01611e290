#![forbid(unsafe_code)]

use rider_conformance::{
    HarnessConfig, HarnessError, PacketReport, discover_packets, run_layout_packet_with_evidence,
    write_evidence_log, write_packet_report,
};
use rider_layout::{EvidenceLedger, RuntimeMode};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EVIDENCE_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
struct CliArgs {
    fixture_root: PathBuf,
    artifact_root: PathBuf,
    packet_filter: Option<String>,
    mode_filter: Option<RuntimeMode>,
}

#[derive(Debug, Clone)]
enum CliParseError {
    Help,
    Message(String),
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, CliParseError> {
    let defaults = HarnessConfig::default_paths();
    let mut fixture_root = defaults.fixture_root;
    let mut artifact_root = defaults.artifact_root;
    let mut packet_filter = None;
    let mut mode_filter = None;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Err(CliParseError::Help),
            "--fixture-root" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --fixture-root",
                    )));
                };
                fixture_root = PathBuf::from(value);
                index += 2;
            }
            "--artifact-root" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --artifact-root",
                    )));
                };
                artifact_root = PathBuf::from(value);
                index += 2;
            }
            "--packet" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --packet",
                    )));
                };
                packet_filter = Some(value.clone());
                index += 2;
            }
            "--mode" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --mode",
                    )));
                };
                mode_filter = Some(value.parse().map_err(CliParseError::Message)?);
                index += 2;
            }
            unknown => {
                return Err(CliParseError::Message(format!(
                    "unrecognized argument `{unknown}`"
                )));
            }
        }
    }

    Ok(CliArgs {
        fixture_root,
        artifact_root,
        packet_filter,
        mode_filter,
    })
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [--fixture-root <path>] [--artifact-root <path>] [--packet <id>] [--mode <strict|hardened>]"
    );
    eprintln!("  --fixture-root <path>   root containing packet fixture json files");
    eprintln!("  --artifact-root <path>  root receiving report.json and evidence.jsonl per packet");
    eprintln!("  --packet <id>           run only the packet whose fixture file stem matches");
    eprintln!("  --mode <mode>           run only cases in this runtime mode");
}

fn packet_stem(fixture_name: &str) -> &str {
    Path::new(fixture_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(fixture_name)
}

fn run_packets(
    config: &HarnessConfig,
    packet_filter: Option<&str>,
) -> Result<Vec<PacketReport>, HarnessError> {
    let mut reports = Vec::new();
    for fixture_name in discover_packets(config)? {
        if packet_filter.is_some_and(|filter| filter != packet_stem(&fixture_name)) {
            continue;
        }
        let mut ledger = EvidenceLedger::new(EVIDENCE_CAPACITY);
        let report = run_layout_packet_with_evidence(config, &fixture_name, &mut ledger)?;
        let report_path = write_packet_report(config, &report)?;
        let log_path = write_evidence_log(config, &report.packet_id, &ledger)?;
        if ledger.dropped() > 0 {
            tracing::warn!(
                packet = %report.packet_id,
                recorded = ledger.recorded(),
                dropped = ledger.dropped(),
                "evidence log truncated to the newest entries"
            );
        }
        tracing::info!(
            packet = %report.packet_id,
            report = %report_path.display(),
            evidence = %log_path.display(),
            "artifacts written"
        );
        reports.push(report);
    }
    Ok(reports)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("layout_conformance"));

    let args = match parse_cli_args(&argv[1..]) {
        Ok(args) => args,
        Err(CliParseError::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(CliParseError::Message(message)) => {
            eprintln!("{message}");
            print_usage(&program);
            return ExitCode::from(2);
        }
    };

    let config = HarnessConfig {
        fixture_root: args.fixture_root,
        artifact_root: args.artifact_root,
        mode_filter: args.mode_filter,
    };

    match run_packets(&config, args.packet_filter.as_deref()) {
        Ok(reports) if reports.is_empty() => {
            eprintln!("no packets matched under {}", config.fixture_root.display());
            ExitCode::from(2)
        }
        Ok(reports) => {
            for report in &reports {
                let status = if report.all_passed() { "PASS" } else { "FAIL" };
                eprintln!(
                    "{status} packet={} family={} passed={} failed={}",
                    report.packet_id, report.family, report.passed_cases, report.failed_cases
                );
                for case in report.case_results.iter().filter(|case| !case.passed) {
                    eprintln!("  FAIL case={} {}", case.case_id, case.message);
                }
            }
            if reports.iter().all(PacketReport::all_passed) {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(error) => {
            eprintln!("conformance error: {error}");
            ExitCode::from(2)
        }
    }
}
