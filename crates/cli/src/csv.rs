use anyhow::{anyhow, Result};
use csv::Writer;
use kernel::model::file_result::FileResult;

pub fn generate_csv_results(file_results: &[FileResult]) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record([
        "filename", "check", "severity", "kind", "function", "message", "line", "col",
    ])?;

    for r in file_results {
        for d in &r.diagnostics {
            let (kind, function) = d
                .subject
                .as_ref()
                .map(|s| (s.kind.to_string(), s.qualified_name.clone()))
                .unwrap_or_default();
            wtr.write_record(&[
                r.filename.to_string(),
                r.check_name.to_string(),
                d.severity.to_string(),
                kind,
                function,
                d.message.to_string(),
                d.position.line.to_string(),
                d.position.col.to_string(),
            ])?;
        }
    }

    let content = wtr
        .into_inner()
        .map_err(|e| anyhow!("cannot generate CSV file: {}", e.error()))?;
    Ok(String::from_utf8(content)?)
}
