use log::{debug, info, warn};

use grade_poll::*;
use snafu::{prelude::*, Snafu};

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::pipeline::config_reader::*;
use crate::pipeline::io_common::{clean_description, join_url, resolve_path};
use crate::pipeline::io_snapshot::{SiteClimb, SiteCrag, SitePoll};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_script;
pub mod io_snapshot;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_FILE: &str = "climbs.csv";
/// Grade type of the sport climbs.
pub const SPORT_GRADE_TYPE: u32 = 3;

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error parsing variable {key} of the crag script on line {lineno}"))]
    ParsingScript {
        source: serde_json::Error,
        key: String,
        lineno: usize,
    },
    #[snafu(display("Error decoding the crag script variables"))]
    DecodingScript { source: serde_json::Error },
    #[snafu(display("Variable {key} is missing from the crag script"))]
    MissingScriptVariable { key: String },
    #[snafu(display("Error writing CSV record"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error flushing CSV output"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("CSV output is not valid UTF-8"))]
    CsvEncoding { source: std::string::FromUtf8Error },
    #[snafu(display("Error building the summary"))]
    SummaryJson { source: serde_json::Error },
    #[snafu(display("Crag {crag}: no grade list for grade type {gradetype}"))]
    MissingGradeType { crag: String, gradetype: u32 },
    #[snafu(display("Crag {crag}: climb {climb} has grade {grade} which is not in the grade list"))]
    MissingGrade {
        crag: String,
        climb: String,
        grade: u32,
    },
    #[snafu(display("Crag {crag}: climb {climb} refers to unknown buttress {buttress}"))]
    MissingButtress {
        crag: String,
        climb: String,
        buttress: u32,
    },
    #[snafu(display("Invalid grade poll for {url}"))]
    InvalidPoll { source: PollError, url: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// One row of the table of climbs.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ClimbRecord {
    pub name: String,
    pub url: String,
    pub grade: String,
    pub stars: u32,
    pub logs: u32,
    pub poll_grade: String,
    #[serde(serialize_with = "serialize_poll_diff")]
    pub poll_diff: f64,
    pub crag: String,
    pub buttress: String,
    pub desc: String,
    pub symbols: String,
    pub approach_time: u32,
    pub rocktype: String,
    pub aspect: String,
    /// Guidebook score of the grade, used to order the summary.
    #[serde(skip)]
    pub grade_score: f64,
}

fn serialize_poll_diff<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.2}", x))
}

/// Where the results of a run go.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    /// File path or `stdout`.
    pub out: String,
    pub summary: Option<String>,
    pub reference: Option<String>,
    pub grade_types: Vec<u32>,
}

/// Resolves the poll of a climb and compares it with the guidebook grade.
///
/// A missing poll, or one whose columns do not line up, gives the bad poll
/// data comparison. A poll with invalid votes is an error.
fn climb_poll_comparison(
    poll: Option<&SitePoll>,
    guidebook_code: &str,
    grades: &GradeTable,
    climb_url: &str,
) -> PipelineResult<PollComparison> {
    let site_poll = match poll {
        Some(p) => p,
        None => return Ok(compare_poll(None, guidebook_code, grades)),
    };
    let vote_poll =
        PollBuilder::from_site_columns(&site_poll.bar_values(), &site_poll.grade_names)
            .context(InvalidPollSnafu { url: climb_url })?;
    match vote_poll {
        Some(vote_poll) => {
            let consensus = resolve_poll(&vote_poll);
            debug!("{}: poll consensus {:?}", climb_url, consensus);
            Ok(compare_poll(Some(&consensus), guidebook_code, grades))
        }
        None => {
            warn!("{}: poll bars and grade names do not match", climb_url);
            Ok(compare_poll(None, guidebook_code, grades))
        }
    }
}

fn climb_record(crag: &SiteCrag, climb: &SiteClimb) -> PipelineResult<ClimbRecord> {
    let url = match &climb.url {
        Some(u) => u.clone(),
        None => join_url(&crag.url, &climb.slug),
    };
    let grades = crag
        .grade_table(climb.gradetype)
        .context(MissingGradeTypeSnafu {
            crag: crag.name.clone(),
            gradetype: climb.gradetype,
        })?;
    let guidebook_code = climb.grade.to_string();
    let guidebook_grade = grades
        .get(&guidebook_code)
        .context(MissingGradeSnafu {
            crag: crag.name.clone(),
            climb: climb.name.clone(),
            grade: climb.grade,
        })?;
    let buttress = crag
        .buttress_data
        .get(&climb.buttress_id.to_string())
        .context(MissingButtressSnafu {
            crag: crag.name.clone(),
            climb: climb.name.clone(),
            buttress: climb.buttress_id,
        })?;

    let comparison =
        climb_poll_comparison(climb.poll.as_ref(), &guidebook_code, &grades, &url)?;

    Ok(ClimbRecord {
        name: climb.name.clone(),
        grade: guidebook_grade.name.clone(),
        grade_score: guidebook_grade.score,
        stars: climb.stars,
        logs: climb.logs,
        poll_grade: comparison.poll_grade_text,
        poll_diff: comparison.poll_diff,
        crag: crag.name.clone(),
        buttress: buttress.name.clone(),
        desc: clean_description(&climb.desc),
        symbols: crag.symbol_names(&climb.symbols).join(", "),
        approach_time: buttress.approach_time(),
        rocktype: crag.rocktype.clone(),
        aspect: crag.aspect.clone(),
        url,
    })
}

/// Builds the table of climbs of the given crags, keeping only the climbs of
/// the given grade types.
///
/// A climb that cannot be processed (unknown grade or buttress, invalid
/// poll) is reported and left out of the table.
pub fn process_crags(crags: &[SiteCrag], grade_types: &[u32]) -> Vec<ClimbRecord> {
    let kept_types: HashSet<u32> = grade_types.iter().cloned().collect();
    let selected: Vec<(&SiteCrag, Vec<&SiteClimb>)> = crags
        .iter()
        .map(|crag| {
            let climbs = crag
                .climbs
                .iter()
                .filter(|c| kept_types.contains(&c.gradetype))
                .collect();
            (crag, climbs)
        })
        .collect();
    let total_climbs: usize = selected.iter().map(|(_, climbs)| climbs.len()).sum();
    info!(
        "Processing {} climbs in {} crags, grade types {:?}",
        total_climbs,
        crags.len(),
        grade_types
    );

    let mut res: Vec<ClimbRecord> = Vec::new();
    let mut processed: usize = 0;
    let mut skipped: Vec<String> = Vec::new();
    for (n_crag, (crag, climbs)) in selected.iter().enumerate() {
        info!(
            "Processing crag {}/{} {}",
            n_crag + 1,
            selected.len(),
            crag.name
        );
        for (n_climb, climb) in climbs.iter().enumerate() {
            processed += 1;
            info!(
                "{:.1}% - processing climb {}/{}, crag {}/{} {}",
                processed as f64 * 100.0 / total_climbs as f64,
                n_climb + 1,
                climbs.len(),
                n_crag + 1,
                selected.len(),
                climb.name
            );
            match climb_record(crag, climb) {
                Ok(record) => res.push(record),
                Err(e) => {
                    warn!("Skipping climb {} of crag {}: {}", climb.name, crag.name, e);
                    skipped.push(climb.name.clone());
                }
            }
        }
    }
    if !skipped.is_empty() {
        warn!("{} climbs skipped: {:?}", skipped.len(), skipped);
    }
    res
}

/// Counts the climbs of every guidebook grade, split by poll grade.
/// Guidebook grades are ordered by score, poll grades by grade order. Poll
/// grades with an invalid label are left out of the split.
pub fn build_summary_js(guidebook: &str, records: &[ClimbRecord]) -> JSValue {
    let mut by_grade: Vec<(String, f64, BTreeMap<String, u64>)> = Vec::new();
    for r in records {
        let idx = match by_grade.iter().position(|(g, _, _)| *g == r.grade) {
            Some(idx) => idx,
            None => {
                by_grade.push((r.grade.clone(), r.grade_score, BTreeMap::new()));
                by_grade.len() - 1
            }
        };
        *by_grade[idx].2.entry(r.poll_grade.clone()).or_insert(0) += 1;
    }
    by_grade.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut grades: Vec<JSValue> = Vec::new();
    for (grade, _, poll_counts) in by_grade {
        let total: u64 = poll_counts.values().sum();
        let mut poll_grades: Vec<(GradeSortKey, String, u64)> = Vec::new();
        for (label, count) in poll_counts {
            match grade_sort_key(&label) {
                Ok(key) => poll_grades.push((key, label, count)),
                Err(e) => warn!("build_summary_js: dropping poll grade of {}: {}", grade, e),
            }
        }
        poll_grades.sort_by(|a, b| a.0.cmp(&b.0));
        let poll_js: Vec<JSValue> = poll_grades
            .iter()
            .map(|(_, label, count)| json!({"pollGrade": label, "climbs": count}))
            .collect();
        grades.push(json!({"grade": grade, "climbs": total, "pollGrades": poll_js}));
    }
    json!({"guidebook": guidebook, "grades": grades})
}

fn read_source(root: &Path, cfs: &FileSource) -> PipelineResult<Vec<SiteCrag>> {
    let path = resolve_path(root, &cfs.file_path);
    match cfs.provider()? {
        Provider::Snapshot => Ok(io_snapshot::read_snapshot(&path)?.crags),
        Provider::CragScript => {
            let polls_path = cfs.polls_path.as_ref().map(|p| resolve_path(root, p));
            let crag = io_script::read_crag_script(&path, polls_path.as_deref(), cfs)?;
            Ok(vec![crag])
        }
    }
}

fn guidebook_name(config: &PipelineConfig, root: &Path) -> PipelineResult<String> {
    if let Some(n) = &config.output_settings.guidebook_name {
        return Ok(n.clone());
    }
    // Fall back to the name recorded in the first snapshot.
    for cfs in config.sources.iter() {
        if cfs.provider()? == Provider::Snapshot {
            let snapshot = io_snapshot::read_snapshot(&resolve_path(root, &cfs.file_path))?;
            if let Some(n) = snapshot.guidebook {
                return Ok(n);
            }
        }
    }
    Ok("guidebook".to_string())
}

/// Runs the whole pipeline and returns the table of climbs.
///
/// Arguments:
/// * `config` the sources to read
/// * `root` the directory against which the source paths are resolved
/// * `settings` the outputs of the run
pub fn run_pipeline(
    config: &PipelineConfig,
    root: &Path,
    settings: &RunSettings,
) -> PipelineResult<Vec<ClimbRecord>> {
    info!("config: {:?}", config);
    if config.sources.is_empty() {
        whatever!("No sources found in the configuration");
    }

    let mut crags: Vec<SiteCrag> = Vec::new();
    for cfs in config.sources.iter() {
        let mut source_crags = read_source(root, cfs)?;
        crags.append(&mut source_crags);
    }

    let records = process_crags(&crags, &settings.grade_types);
    let csv_text = io_csv::records_to_csv(&records)?;
    io_csv::write_output(&csv_text, &settings.out)?;

    if let Some(summary_p) = &settings.summary {
        let summary_js = build_summary_js(&guidebook_name(config, root)?, &records);
        let pretty_js = serde_json::to_string_pretty(&summary_js).context(SummaryJsonSnafu {})?;
        io_csv::write_output(&format!("{}\n", pretty_js), summary_p)?;
    }

    // The reference table, if provided for comparison
    if let Some(reference_p) = &settings.reference {
        let reference = io_csv::read_reference_csv(reference_p)?;
        let produced = io_csv::normalize_lines(&csv_text);
        if reference != produced {
            warn!("Found differences with the reference table");
            print_diff(reference.as_str(), produced.as_str(), "\n");
            whatever!("Difference detected between the table of climbs and the reference table")
        }
        info!("The table of climbs matches the reference {:?}", reference_p);
    }

    Ok(records)
}

/// Merges the command line with the configuration file.
///
/// Returns the configuration, the directory against which its paths are
/// resolved, and the settings of the run.
pub fn merge_args(args: &Args) -> PipelineResult<(PipelineConfig, PathBuf, RunSettings)> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root: PathBuf = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => {
            if args.input.is_none() {
                whatever!("One of --config or --input must be provided")
            }
            let config = PipelineConfig {
                output_settings: OutputSettings::default(),
                sources: vec![],
                grade_types: None,
            };
            (config, PathBuf::new())
        }
    };

    // The input on the command line replaces the sources of the configuration.
    if let Some(input) = &args.input {
        config.sources = vec![FileSource {
            provider: args
                .input_type
                .clone()
                .unwrap_or_else(|| "snapshot".to_string()),
            file_path: input.clone(),
            polls_path: args.polls.clone(),
            crag_name: None,
            crag_url: None,
            rock_type: None,
            aspect: None,
        }];
        if args.config.is_some() {
            // Paths given on the command line are relative to the working directory.
            config.sources[0].file_path = absolute_from_cwd(input);
            config.sources[0].polls_path = args.polls.as_deref().map(absolute_from_cwd);
        }
    }

    let output_settings = &config.output_settings;
    let out = match &args.out {
        Some(o) => o.clone(),
        None => {
            let dir = resolve_path(&root, output_settings.data_dir());
            resolve_path(Path::new(&dir), output_settings.output_file())
        }
    };
    let summary = match (&args.summary, &output_settings.summary_file) {
        (Some(s), _) => Some(s.clone()),
        (None, Some(s)) => {
            let dir = resolve_path(&root, output_settings.data_dir());
            Some(resolve_path(Path::new(&dir), s))
        }
        (None, None) => None,
    };
    let grade_types = args
        .grade_type
        .clone()
        .or_else(|| config.grade_types.clone())
        .unwrap_or_else(|| vec![SPORT_GRADE_TYPE]);

    let settings = RunSettings {
        out,
        summary,
        reference: args.reference.clone(),
        grade_types,
    };
    debug!("merge_args: settings: {:?}", settings);
    Ok((config, root, settings))
}

/// Builds the configuration and the settings from the command line, then runs
/// the pipeline.
pub fn run_starchaser(args: &Args) -> PipelineResult<()> {
    let (config, root, settings) = merge_args(args)?;
    let records = run_pipeline(&config, &root, &settings)?;
    info!("{} climbs written to {}", records.len(), settings.out);
    Ok(())
}

fn absolute_from_cwd(path: &str) -> String {
    match std::env::current_dir() {
        Ok(cwd) => resolve_path(&cwd, path),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("starchaser-{}-{}", std::process::id(), name))
            .display()
            .to_string()
    }

    fn crag(climbs: JSValue) -> SiteCrag {
        serde_json::from_value(json!({
            "name": "Winspit",
            "url": "https://example.org/logbook/crags/winspit-77/",
            "rocktype": "Limestone",
            "aspect": "S",
            "grade_list": {
                "3": {
                    "35": {"name": "6a+", "score": 35},
                    "36": {"name": "6b", "score": 36},
                    "37": {"name": "6b+", "score": 37}
                },
                "2": {"12": {"name": "E1", "score": 12}}
            },
            "buttress_data": {
                "5": {"name": "Main Wall", "meta": {"approach_time": 10}},
                "6": {"name": "Quarry", "meta": null}
            },
            "climb_symbols": {"1": {"name": "Bolts"}, "2": {"name": "Polished"}},
            "climbs": climbs
        }))
        .unwrap()
    }

    fn reference_poll() -> JSValue {
        json!({
            "votes": [["37hard", "0"], ["37", "1"], ["37easy", "0"],
                      ["36hard", "0"], ["36", "3"], ["36easy", "1"],
                      ["35hard", "1"], ["35", "0"], ["35easy", "0"]],
            "grade_names": ["High 6b+", "Mid 6b+", "Low 6b+",
                            "High 6b", "Mid 6b", "Low 6b",
                            "High 6a+", "Mid 6a+", "Low 6a+"]
        })
    }

    #[test]
    fn records_of_a_crag() {
        let c = crag(json!([
            {"name": "Gallows", "slug": "gallows-2", "grade": 37, "gradetype": 3, "stars": 2,
             "logs": 40, "desc": "<p>Rockfax Description</p><p>Steep.</p>", "symbols": [2, 1, 7],
             "buttress_id": 5, "poll": reference_poll()},
            {"name": "Trad Line", "slug": "trad-line-3", "grade": 12, "gradetype": 2,
             "buttress_id": 5},
            {"name": "No Poll", "slug": "no-poll-4", "grade": 36, "gradetype": 3,
             "buttress_id": 6}
        ]));
        let records = process_crags(&[c], &[SPORT_GRADE_TYPE]);
        assert_eq!(records.len(), 2);

        let r = &records[0];
        assert_eq!(r.url, "https://example.org/logbook/crags/winspit-77/gallows-2");
        assert_eq!(r.grade, "6b+");
        assert_eq!(r.poll_grade, "Mid 6b");
        assert!((r.poll_diff - 1.0).abs() < 1e-9);
        assert_eq!(r.desc, "Steep.");
        assert_eq!(r.symbols, "Polished, Bolts");
        assert_eq!(r.buttress, "Main Wall");
        assert_eq!(r.approach_time, 10);

        let r = &records[1];
        assert_eq!(r.poll_grade, BAD_POLL_DATA);
        assert_eq!(r.poll_diff, NO_COMPARISON);
        assert_eq!(r.approach_time, 0);
        assert_eq!(r.symbols, "");
    }

    #[test]
    fn all_grade_types() {
        let c = crag(json!([
            {"name": "Trad Line", "slug": "trad-line-3", "grade": 12, "gradetype": 2,
             "buttress_id": 5},
        ]));
        let records = process_crags(&[c], &[2, 3]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].grade, "E1");
    }

    #[test]
    fn invalid_polls_skip_the_climb() {
        let c = crag(json!([
            {"name": "Negative", "slug": "negative-1", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "-2"]], "grade_names": ["Mid 6b"]}},
            {"name": "Mismatch", "slug": "mismatch-2", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "2"], ["35", "1"]], "grade_names": ["Mid 6b"]}},
            {"name": "Zero", "slug": "zero-3", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "0"], ["35", "0"]], "grade_names": ["Mid 6b", "Mid 6a+"]}},
            {"name": "Other scale", "slug": "other-4", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["12", 4]], "grade_names": ["Mid E1"]}},
            {"name": "Twice", "slug": "twice-5", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "1"], ["36", "2"]], "grade_names": ["Mid 6b", "Mid 6b"]}},
            {"name": "Words", "slug": "words-6", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "three"]], "grade_names": ["Mid 6b"]}}
        ]));
        let records = process_crags(&[c], &[SPORT_GRADE_TYPE]);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mismatch", "Zero", "Other scale"]);
        for r in records.iter().take(2) {
            assert_eq!(r.poll_grade, BAD_POLL_DATA, "{}", r.name);
            assert_eq!(r.poll_diff, NO_COMPARISON);
        }
        assert_eq!(records[2].poll_grade, "Mid E1");
        assert_eq!(records[2].poll_diff, NO_COMPARISON);
    }

    #[test]
    fn invalid_poll_is_an_error_of_the_climb() {
        let c = crag(json!([
            {"name": "Negative", "slug": "negative-1", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "-2"]], "grade_names": ["Mid 6b"]}}
        ]));
        let res = climb_record(&c, &c.climbs[0]);
        assert!(matches!(res, Err(PipelineError::InvalidPoll { .. })));
    }

    #[test]
    fn unknown_references_are_errors_of_the_climb() {
        let c = crag(json!([
            {"name": "Lost", "slug": "lost-1", "grade": 36, "gradetype": 3, "buttress_id": 99},
            {"name": "Odd", "slug": "odd-1", "grade": 99, "gradetype": 3, "buttress_id": 5},
            {"name": "Boulder", "slug": "boulder-1", "grade": 1, "gradetype": 9, "buttress_id": 5}
        ]));
        let res = climb_record(&c, &c.climbs[0]);
        assert!(matches!(res, Err(PipelineError::MissingButtress { buttress: 99, .. })));
        let res = climb_record(&c, &c.climbs[1]);
        assert!(matches!(res, Err(PipelineError::MissingGrade { grade: 99, .. })));
        let res = climb_record(&c, &c.climbs[2]);
        assert!(matches!(res, Err(PipelineError::MissingGradeType { gradetype: 9, .. })));
    }

    #[test]
    fn bad_climbs_do_not_stop_the_run() {
        let c = crag(json!([
            {"name": "Lost", "slug": "lost-1", "grade": 36, "gradetype": 3, "buttress_id": 99},
            {"name": "Gallows", "slug": "gallows-2", "grade": 37, "gradetype": 3,
             "buttress_id": 5, "poll": reference_poll()},
            {"name": "Odd", "slug": "odd-3", "grade": 99, "gradetype": 3, "buttress_id": 5},
            {"name": "Boulder", "slug": "boulder-4", "grade": 1, "gradetype": 9, "buttress_id": 5},
            {"name": "Negative", "slug": "negative-5", "grade": 36, "gradetype": 3, "buttress_id": 5,
             "poll": {"votes": [["36", "-2"]], "grade_names": ["Mid 6b"]}},
            {"name": "No Poll", "slug": "no-poll-6", "grade": 36, "gradetype": 3, "buttress_id": 6}
        ]));
        let records = process_crags(&[c], &[SPORT_GRADE_TYPE, 9]);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Gallows", "No Poll"]);
        assert_eq!(records[0].poll_grade, "Mid 6b");
    }

    #[test]
    fn summary_order() {
        let record = |grade: &str, score: f64, poll_grade: &str| ClimbRecord {
            name: "x".to_string(),
            url: "u".to_string(),
            grade: grade.to_string(),
            stars: 0,
            logs: 0,
            poll_grade: poll_grade.to_string(),
            poll_diff: 0.0,
            crag: "c".to_string(),
            buttress: "b".to_string(),
            desc: "".to_string(),
            symbols: "".to_string(),
            approach_time: 0,
            rocktype: "".to_string(),
            aspect: "".to_string(),
            grade_score: score,
        };
        let records = vec![
            record("7a", 41.0, "High 7a"),
            record("6b", 36.0, BAD_POLL_DATA),
            record("6b", 36.0, "Low 6b"),
            record("6b", 36.0, "Mid 6b+"),
            record("6b", 36.0, "Low 6b"),
            record("6b", 36.0, "Hard 6b"),
        ];
        let js = build_summary_js("Dorset", &records);
        assert_eq!(js["guidebook"], "Dorset");
        let grades = js["grades"].as_array().unwrap();
        assert_eq!(grades[0]["grade"], "6b");
        assert_eq!(grades[0]["climbs"], 5);
        let labels: Vec<&str> = grades[0]["pollGrades"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["pollGrade"].as_str().unwrap())
            .collect();
        // The invalid label is left out of the split, not of the count.
        assert_eq!(labels, vec!["Low 6b", "Mid 6b+", BAD_POLL_DATA]);
        assert_eq!(grades[0]["pollGrades"][0]["climbs"], 2);
        assert_eq!(grades[1]["grade"], "7a");
    }

    #[test]
    fn fixture_config_matches_reference() {
        let config_path = test_dir().join("dorset_config.json");
        let config = read_config(&config_path.display().to_string()).unwrap();
        let settings = RunSettings {
            out: temp_path("climbs.csv"),
            summary: Some(temp_path("summary.json")),
            reference: Some(test_dir().join("dorset_expected.csv").display().to_string()),
            grade_types: vec![SPORT_GRADE_TYPE],
        };
        let records = run_pipeline(&config, &test_dir(), &settings).unwrap();
        assert_eq!(records.len(), 6);

        let written = fs::read_to_string(&settings.out).unwrap();
        assert!(written.starts_with("name,url,grade,"));
        let summary: JSValue =
            serde_json::from_str(&fs::read_to_string(settings.summary.as_ref().unwrap()).unwrap())
                .unwrap();
        assert_eq!(summary["guidebook"], "Dorset");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let config = PipelineConfig {
            output_settings: OutputSettings::default(),
            sources: vec![FileSource {
                provider: "snapshot".to_string(),
                file_path: "dorset_snapshot.json".to_string(),
                polls_path: None,
                crag_name: None,
                crag_url: None,
                rock_type: None,
                aspect: None,
            }],
            grade_types: None,
        };
        let reference = temp_path("wrong_reference.csv");
        fs::write(&reference, "name,url\nnothing,here\n").unwrap();
        let settings = RunSettings {
            out: temp_path("mismatch.csv"),
            summary: None,
            reference: Some(reference),
            grade_types: vec![SPORT_GRADE_TYPE],
        };
        let res = run_pipeline(&config, &test_dir(), &settings);
        assert!(matches!(res, Err(PipelineError::Whatever { .. })));
    }

    fn args() -> Args {
        Args {
            config: None,
            input: None,
            input_type: None,
            polls: None,
            out: None,
            summary: None,
            reference: None,
            grade_type: None,
            verbose: false,
        }
    }

    fn config_arg() -> Option<String> {
        Some(test_dir().join("dorset_config.json").display().to_string())
    }

    #[test]
    fn settings_from_the_configuration() {
        let a = Args {
            config: config_arg(),
            ..args()
        };
        let (config, root, settings) = merge_args(&a).unwrap();
        assert_eq!(root, test_dir());
        assert_eq!(config.sources.len(), 2);
        let out_dir = test_dir().join("output");
        assert_eq!(
            settings.out,
            out_dir.join("dorset_climbs.csv").display().to_string()
        );
        assert_eq!(
            settings.summary,
            Some(out_dir.join("dorset_summary.json").display().to_string())
        );
        assert_eq!(settings.grade_types, vec![3]);
        assert_eq!(settings.reference, None);
    }

    #[test]
    fn command_line_overrides_the_configuration() {
        let a = Args {
            config: config_arg(),
            input: Some("tests/data/winspit_script.js".to_string()),
            input_type: Some("crag_script".to_string()),
            polls: Some("tests/data/winspit_polls.json".to_string()),
            out: Some("stdout".to_string()),
            summary: Some("summary.json".to_string()),
            grade_type: Some(vec![2, 3]),
            ..args()
        };
        let (config, root, settings) = merge_args(&a).unwrap();
        assert_eq!(config.sources.len(), 1);
        let source = &config.sources[0];
        assert_eq!(source.provider().unwrap(), Provider::CragScript);
        // Relative to the working directory, not to the configuration file.
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            source.file_path,
            cwd.join("tests/data/winspit_script.js").display().to_string()
        );
        assert_eq!(
            source.polls_path,
            Some(cwd.join("tests/data/winspit_polls.json").display().to_string())
        );
        assert_eq!(resolve_path(&root, &source.file_path), source.file_path);
        assert_eq!(settings.out, "stdout");
        assert_eq!(settings.summary, Some("summary.json".to_string()));
        assert_eq!(settings.grade_types, vec![2, 3]);
    }

    #[test]
    fn settings_without_a_configuration() {
        let a = Args {
            input: Some("dorset.json".to_string()),
            ..args()
        };
        let (config, root, settings) = merge_args(&a).unwrap();
        assert_eq!(root, PathBuf::new());
        assert_eq!(config.sources[0].provider().unwrap(), Provider::Snapshot);
        assert_eq!(config.sources[0].file_path, "dorset.json");
        assert_eq!(
            settings.out,
            Path::new("data").join("climbs.csv").display().to_string()
        );
        assert_eq!(settings.summary, None);
        assert_eq!(settings.grade_types, vec![SPORT_GRADE_TYPE]);

        assert!(merge_args(&args()).is_err());
    }

    #[test]
    fn command_line_run_matches_reference() {
        let a = Args {
            config: config_arg(),
            out: Some(temp_path("cli_climbs.csv")),
            summary: Some(temp_path("cli_summary.json")),
            reference: Some(test_dir().join("dorset_expected.csv").display().to_string()),
            ..args()
        };
        assert!(run_starchaser(&a).is_ok());
    }

    #[test]
    fn empty_configuration() {
        let config = PipelineConfig {
            output_settings: OutputSettings::default(),
            sources: vec![],
            grade_types: None,
        };
        let settings = RunSettings {
            out: temp_path("empty.csv"),
            summary: None,
            reference: None,
            grade_types: vec![SPORT_GRADE_TYPE],
        };
        assert!(run_pipeline(&config, &test_dir(), &settings).is_err());
    }
}
