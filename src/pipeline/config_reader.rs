use crate::pipeline::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "guidebookName")]
    pub guidebook_name: Option<String>,
    #[serde(rename = "dataDir")]
    pub data_dir: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
}

impl OutputSettings {
    pub fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    pub fn output_file(&self) -> &str {
        self.output_file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Snapshot,
    CragScript,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    // The options below only apply to the crag_script provider.
    #[serde(rename = "pollsPath")]
    pub polls_path: Option<String>,
    #[serde(rename = "cragName")]
    pub crag_name: Option<String>,
    #[serde(rename = "cragUrl")]
    pub crag_url: Option<String>,
    #[serde(rename = "rockType")]
    pub rock_type: Option<String>,
    pub aspect: Option<String>,
}

impl FileSource {
    pub fn provider(&self) -> PipelineResult<Provider> {
        match self.provider.as_str() {
            "snapshot" => Ok(Provider::Snapshot),
            "crag_script" => Ok(Provider::CragScript),
            x => whatever!("Provider not implemented {:?}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub sources: Vec<FileSource>,
    #[serde(rename = "gradeTypes")]
    pub grade_types: Option<Vec<u32>>,
}

pub fn read_config(path: &str) -> PipelineResult<PipelineConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read_config: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Reads a count that may be given either as a JSON number or as a string.
pub fn read_js_int(x: &Option<JSValue>) -> Option<u32> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Some(JSValue::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
