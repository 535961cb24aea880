//! Command implementations.
//!
//! Each command builds a fresh service, loads the input export when one
//! is given, runs one engine operation, and prints the result as pretty
//! JSON on stdout.

use std::fs;
use std::path::Path;

use namaste_engine::{
    CacheConfig, ClassificationClient, IcdApiClient, IcdApiConfig, IngestReport, MatchConfig,
    OfflineClient, TermError, TermResult, TerminologyService,
};

use crate::cli::{Cli, Command, ExpandArgs, GenerateArgs, OutputArgs, SearchArgs, TranslateArgs};

/// Runs the parsed command, returning the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let (service, report) = match build_service(&cli) {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("error: {error}");
            return 1;
        }
    };

    let outcome = match &cli.command {
        Command::Ingest => run_ingest(&service, report),
        Command::Search(args) => run_search(&service, args),
        Command::Translate(args) => run_translate(&service, args).await,
        Command::Expand(args) => run_expand(&service, args).await,
        Command::Summary => run_summary(&service),
        Command::Codesystem(args) => emit(&service.code_system(), args),
        Command::Conceptmap(args) => emit(&service.concept_map(), args),
        Command::Generate(args) => run_generate(&service, args),
    };

    match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

/// Builds the service and loads the input export when one is given.
fn build_service(cli: &Cli) -> TermResult<(TerminologyService, Option<IngestReport>)> {
    let client: Box<dyn ClassificationClient> = match IcdApiConfig::from_env() {
        Some(config) => {
            tracing::info!("WHO ICD-11 API credentials found, live resolution enabled");
            Box::new(IcdApiClient::new(config)?)
        }
        None => {
            tracing::info!("no API credentials, resolving from the bundled fallback table");
            Box::new(OfflineClient)
        }
    };

    let cache_config = CacheConfig {
        cache_file: cli.cache_file.clone(),
        ..CacheConfig::default()
    };

    let service = TerminologyService::new(client, MatchConfig::default(), cache_config);

    let report = match &cli.input {
        Some(input) => {
            let report = service.ingest_path(input)?;
            if report.rejected > 0 {
                tracing::warn!(rejected = report.rejected, "some rows were rejected");
            }
            Some(report)
        }
        None => None,
    };

    Ok((service, report))
}

fn run_ingest(service: &TerminologyService, report: Option<IngestReport>) -> TermResult<()> {
    let report =
        report.ok_or_else(|| TermError::validation("this command requires --input <CSV>"))?;

    print_json(&serde_json::json!({
        "accepted": report.accepted,
        "rejected": report.rejected,
        "stored": service.summary().total_records,
    }))
}

fn run_search(service: &TerminologyService, args: &SearchArgs) -> TermResult<()> {
    let hits = service.search(&args.query, args.limit, args.threshold)?;
    print_json(&hits)
}

async fn run_translate(service: &TerminologyService, args: &TranslateArgs) -> TermResult<()> {
    let translation = service.translate(&args.code, &args.system).await?;
    print_json(&translation)
}

async fn run_expand(service: &TerminologyService, args: &ExpandArgs) -> TermResult<()> {
    let filter = args.filter.as_deref().unwrap_or("");
    let expansion = service.expand(filter, args.count).await?;
    print_json(&expansion)
}

fn run_summary(service: &TerminologyService) -> TermResult<()> {
    print_json(&service.summary())
}

fn emit<T: serde::Serialize>(value: &T, args: &OutputArgs) -> TermResult<()> {
    match &args.output {
        Some(path) => write_json(path, value),
        None => print_json(value),
    }
}

fn run_generate(service: &TerminologyService, args: &GenerateArgs) -> TermResult<()> {
    fs::create_dir_all(&args.output_dir)?;

    let code_system = service.code_system();
    let concept_map = service.concept_map();

    write_json(&args.output_dir.join("namaste_codesystem.json"), &code_system)?;
    write_json(&args.output_dir.join("namaste_icd11_conceptmap.json"), &concept_map)?;

    tracing::info!(
        dir = %args.output_dir.display(),
        concepts = code_system.count,
        mapped = concept_map.group[0].element.len(),
        "documents written"
    );
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> TermResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> TermResult<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const SAMPLE: &str = "\
Code,Disease,Short_Definition,icd11_tm2_code,icd11_biomed_code
EA-3,Kasa,Cough,SB00,CA22
EE-3,Arsha,Hemorrhoids,,
";

    fn loaded_cli(input: std::path::PathBuf) -> Cli {
        Cli {
            command: Command::Summary,
            input: Some(input),
            cache_file: None,
        }
    }

    #[test]
    fn test_build_service_loads_input() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("export.csv");
        let mut file = fs::File::create(&csv_path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let (service, report) = build_service(&loaded_cli(csv_path)).unwrap();
        let report = report.unwrap();

        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(service.summary().total_records, 2);
    }

    #[test]
    fn test_generate_writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("export.csv");
        fs::write(&csv_path, SAMPLE).unwrap();

        let (service, _) = build_service(&loaded_cli(csv_path)).unwrap();
        let out_dir = dir.path().join("out");
        run_generate(
            &service,
            &GenerateArgs {
                output_dir: out_dir.clone(),
            },
        )
        .unwrap();

        let cs: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out_dir.join("namaste_codesystem.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(cs["resourceType"], "CodeSystem");
        assert_eq!(cs["count"], 2);

        let map: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out_dir.join("namaste_icd11_conceptmap.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(map["resourceType"], "ConceptMap");
        // Arsha has no stored codes and is excluded
        assert_eq!(map["group"][0]["element"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_ingest_without_input_is_a_validation_error() {
        let cli = Cli {
            command: Command::Ingest,
            input: None,
            cache_file: None,
        };
        let (service, report) = build_service(&cli).unwrap();
        assert!(matches!(
            run_ingest(&service, report),
            Err(TermError::Validation { .. })
        ));
    }
}
