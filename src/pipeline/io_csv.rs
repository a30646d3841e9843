// Primitives for writing the table of climbs in CSV format.

use std::path::Path;

use crate::pipeline::*;

pub fn records_to_csv(records: &[ClimbRecord]) -> PipelineResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(vec![]);
    for record in records {
        wtr.serialize(record).context(CsvWriteSnafu {})?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(CsvFlushSnafu {})?;
    let text = String::from_utf8(bytes).context(CsvEncodingSnafu {})?;
    Ok(text)
}

/// Writes the content to the given location: a file path or `stdout`.
pub fn write_output(content: &str, dest: &str) -> PipelineResult<()> {
    if dest == "stdout" {
        print!("{}", content);
        return Ok(());
    }
    if let Some(parent) = Path::new(dest).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu { path: dest })?;
        }
    }
    fs::write(dest, content).context(WritingFileSnafu { path: dest })?;
    info!("Written {:?}", dest);
    Ok(())
}

/// Reads a reference table, with the line endings normalized.
pub fn read_reference_csv(path: &str) -> PipelineResult<String> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    Ok(normalize_lines(&contents))
}

pub fn normalize_lines(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
        lines.pop();
    }
    let mut res = lines.join("\n");
    res.push('\n');
    res
}
