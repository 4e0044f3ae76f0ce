use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_sarif::sarif::{
    self, ArtifactLocationBuilder, LocationBuilder, MessageBuilder, PhysicalLocationBuilder,
    PropertyBagBuilder, RegionBuilder, ReportingDescriptor, Result as SarifResult, ResultBuilder,
    RunBuilder, Sarif, SarifBuilder, Tool, ToolBuilder, ToolComponent, ToolComponentBuilder,
};

use crate::constants::SARIF_PROPERTY_FINGERPRINT;
use crate::file_utils::get_fingerprint_for_diagnostic;
use kernel::checks::ConfiguredCheck;
use kernel::constants::CARGO_VERSION;
use kernel::model::diagnostic::Severity;
use kernel::model::file_result::FileResult;

trait IntoSarif {
    type SarifType;

    fn into_sarif(self) -> Result<Self::SarifType>;
}

/// The `SarifReportMetadata` structure contains all metadata being added to the sarif report.
pub struct SarifReportMetadata {
    pub config_digest: String,
    pub execution_time_secs: u64,
}

impl IntoSarif for &ConfiguredCheck {
    type SarifType = ReportingDescriptor;

    fn into_sarif(self) -> Result<Self::SarifType> {
        let description = sarif::MultiformatMessageStringBuilder::default()
            .text(self.description)
            .build()?;
        let properties = PropertyBagBuilder::default()
            .tags(vec!["LOBSTER_CHECK_TYPE:TRACING".to_string()])
            .build()?;

        Ok(sarif::ReportingDescriptorBuilder::default()
            .id(&self.name)
            .short_description(description)
            .properties(properties)
            .build()?)
    }
}

// Generate the tool section that reports all the checks being run
fn generate_tool_section(
    checks: &[ConfiguredCheck],
    metadata: &SarifReportMetadata,
) -> Result<Tool> {
    let tags = vec![
        format!("LOBSTER_CONFIG_DIGEST:{}", metadata.config_digest),
        format!("LOBSTER_EXECUTION_TIME_SECS:{}", metadata.execution_time_secs),
    ];

    let driver: ToolComponent = ToolComponentBuilder::default()
        .name("lobster-tracing")
        .version(CARGO_VERSION)
        .information_uri("https://github.com/bmw-software-engineering/lobster")
        .rules(
            checks
                .iter()
                .map(IntoSarif::into_sarif)
                .collect::<Result<Vec<ReportingDescriptor>>>()?,
        )
        .properties(PropertyBagBuilder::default().tags(tags).build()?)
        .build()?;

    Ok(ToolBuilder::default().driver(driver).build()?)
}

/// Convert our severity enumeration into the corresponding SARIF values.
/// The main discrepancy here is that Notice maps to note.
fn get_level_from_severity(severity: Severity) -> String {
    match severity {
        Severity::Notice => "note",
        Severity::Warning => "warning",
        Severity::Error => "error",
        Severity::None => "none",
    }
    .to_string()
}

// Encode the file using percent to that filename "My Folder/file.c" is "My%20Folder/file.c"
fn encode_filename(filename: &str) -> String {
    const FRAGMENT: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'<')
        .add(b'>')
        .add(b'`')
        .add(b'[')
        .add(b']')
        .add(b'#')
        .add(b'%');

    utf8_percent_encode(filename, FRAGMENT).collect()
}

// Generate one SARIF result per diagnostic
fn generate_results(
    checks: &[ConfiguredCheck],
    file_results: &[FileResult],
    repository_directory: &str,
) -> Result<Vec<SarifResult>> {
    file_results
        .iter()
        .flat_map(|file_result| {
            // if we find the check for these diagnostics, reference it
            let mut result_builder = ResultBuilder::default();
            if let Some(rule_index) = checks
                .iter()
                .position(|c| c.name == file_result.check_name)
            {
                result_builder.rule_index(rule_index as i64);
            }

            file_result.diagnostics.iter().map(move |diagnostic| -> Result<SarifResult> {
                let mut tags = vec![];
                if let Some(subject) = diagnostic.subject.as_ref() {
                    tags.push(format!("LOBSTER_STATUS:{}", subject.status).to_uppercase());
                    tags.push(
                        format!("LOBSTER_KIND:{}", subject.kind)
                            .to_uppercase()
                            .replace(' ', "_"),
                    );
                    tags.push(format!("LOBSTER_FUNCTION:{}", subject.qualified_name));
                }

                let location = LocationBuilder::default()
                    .physical_location(
                        PhysicalLocationBuilder::default()
                            .artifact_location(
                                ArtifactLocationBuilder::default()
                                    .uri(encode_filename(&file_result.filename))
                                    .build()?,
                            )
                            .region(
                                RegionBuilder::default()
                                    .start_line(diagnostic.position.line)
                                    .start_column(diagnostic.position.col)
                                    .build()?,
                            )
                            .build()?,
                    )
                    .build()?;

                let partial_fingerprints: BTreeMap<String, String> =
                    get_fingerprint_for_diagnostic(
                        &file_result.check_name,
                        diagnostic,
                        Path::new(repository_directory),
                        Path::new(&file_result.filename),
                    )
                    .map(|fp| BTreeMap::from([(SARIF_PROPERTY_FINGERPRINT.to_string(), fp)]))
                    .unwrap_or_default();

                Ok(result_builder
                    .clone()
                    .rule_id(&file_result.check_name)
                    .level(get_level_from_severity(diagnostic.severity))
                    .locations([location])
                    .message(
                        MessageBuilder::default()
                            .text(diagnostic.message.clone())
                            .build()?,
                    )
                    .properties(PropertyBagBuilder::default().tags(tags).build()?)
                    .partial_fingerprints(partial_fingerprints)
                    .build()?)
            })
        })
        .collect()
}

// generate a SARIF report for a run.
// the checks parameter is the list of checks enabled for this run
// the file_results parameter is the list of results for this run.
pub fn generate_sarif_report(
    checks: &[ConfiguredCheck],
    file_results: &[FileResult],
    directory: &str,
    metadata: SarifReportMetadata,
) -> Result<Sarif> {
    let run = RunBuilder::default()
        .tool(generate_tool_section(checks, &metadata)?)
        .results(generate_results(checks, file_results, directory)?)
        .build()?;

    Ok(SarifBuilder::default()
        .version("2.1.0")
        .runs(vec![run])
        .build()?)
}
