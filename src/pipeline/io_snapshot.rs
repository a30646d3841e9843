// Site data structures, as published by the guidebook pages, and the reader
// for JSON snapshots of a whole guidebook.

use std::collections::HashMap;

use grade_poll::{GradeInfo, GradeTable};

use crate::pipeline::*;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteGrade {
    pub name: String,
    pub score: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteButtress {
    pub name: String,
    #[serde(default)]
    pub meta: Option<JSValue>,
}

impl SiteButtress {
    /// The approach time in minutes, 0 if the guidebook does not give one.
    pub fn approach_time(&self) -> u32 {
        let time = self
            .meta
            .as_ref()
            .and_then(|m| m.as_object())
            .and_then(|m| m.get("approach_time"))
            .cloned();
        read_js_int(&time).unwrap_or(0)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteSymbol {
    pub name: String,
}

/// The grade poll of a climb, as displayed by the poll widget.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SitePoll {
    /// The grade code of every bar with its vote count, hardest first.
    pub votes: Vec<(String, JSValue)>,
    /// The grade names displayed next to the bars.
    pub grade_names: Vec<String>,
}

impl SitePoll {
    /// The bars, with the vote counts as text.
    pub fn bar_values(&self) -> Vec<(String, String)> {
        self.votes
            .iter()
            .map(|(code, n)| {
                let count = match n {
                    JSValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (code.clone(), count)
            })
            .collect()
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteClimb {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub url: Option<String>,
    pub grade: u32,
    pub gradetype: u32,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub logs: u32,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub symbols: Vec<u32>,
    pub buttress_id: u32,
    #[serde(default)]
    pub poll: Option<SitePoll>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteCrag {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub nclimbs: Option<u32>,
    #[serde(default)]
    pub rocktype: String,
    #[serde(default)]
    pub aspect: String,
    /// Grade type -> grade code -> grade.
    pub grade_list: HashMap<String, HashMap<String, SiteGrade>>,
    pub buttress_data: HashMap<String, SiteButtress>,
    #[serde(default)]
    pub climb_symbols: HashMap<String, SiteSymbol>,
    pub climbs: Vec<SiteClimb>,
}

impl SiteCrag {
    pub fn grade_table(&self, gradetype: u32) -> Option<GradeTable> {
        self.grade_list.get(&gradetype.to_string()).map(|grades| {
            grades
                .iter()
                .map(|(code, g)| {
                    (
                        code.clone(),
                        GradeInfo {
                            name: g.name.clone(),
                            score: g.score,
                        },
                    )
                })
                .collect()
        })
    }

    /// The names of the given symbols. Unknown symbols are skipped.
    pub fn symbol_names(&self, symbols: &[u32]) -> Vec<String> {
        symbols
            .iter()
            .filter_map(|s| self.climb_symbols.get(&s.to_string()))
            .map(|s| s.name.clone())
            .collect()
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SiteGuidebook {
    #[serde(default)]
    pub guidebook: Option<String>,
    pub crags: Vec<SiteCrag>,
}

pub fn read_snapshot(path: &str) -> PipelineResult<SiteGuidebook> {
    info!("Attempting to read guidebook snapshot {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let guidebook: SiteGuidebook =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!(
        "read_snapshot: {:?}: {} crags",
        guidebook.guidebook,
        guidebook.crags.len()
    );
    Ok(guidebook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn buttress_approach_time() {
        let b: SiteButtress =
            serde_json::from_value(json!({"name": "Main", "meta": {"approach_time": "12"}})).unwrap();
        assert_eq!(b.approach_time(), 12);
        let b: SiteButtress = serde_json::from_value(json!({"name": "Main", "meta": null})).unwrap();
        assert_eq!(b.approach_time(), 0);
        let b: SiteButtress =
            serde_json::from_value(json!({"name": "Main", "meta": {"parking": 1}})).unwrap();
        assert_eq!(b.approach_time(), 0);
    }

    #[test]
    fn poll_bar_values() {
        let p: SitePoll = serde_json::from_value(json!({
            "votes": [["36hard", "0"], ["36", 3]],
            "grade_names": ["High 6b", "Mid 6b"]
        }))
        .unwrap();
        assert_eq!(
            p.bar_values(),
            vec![
                ("36hard".to_string(), "0".to_string()),
                ("36".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn read_fixture_snapshot() {
        let path = format!("{}/tests/data/dorset_snapshot.json", env!("CARGO_MANIFEST_DIR"));
        let guidebook = read_snapshot(&path).unwrap();
        assert_eq!(guidebook.guidebook.as_deref(), Some("Dorset"));
        assert_eq!(guidebook.crags.len(), 2);
        let crag = &guidebook.crags[0];
        let table = crag.grade_table(3).unwrap();
        assert_eq!(table.get("36").unwrap().name, "6b");
        assert!(crag.grade_table(42).is_none());
        assert_eq!(crag.symbol_names(&[1, 99, 2]), vec!["Bolts", "Polished"]);
    }
}
