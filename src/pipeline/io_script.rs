// Reader for the script element of a crag page. The crag data is declared as
// javascript variables, one per line:
//
//   let cragId = 12,
//       table_data = [...],
//       grade_list = {...};

use std::collections::HashMap;

use serde_json::Map as JSMap;

use crate::pipeline::{io_snapshot::*, *};

const SCRIPT_KEYS: [&str; 7] = [
    "cragId",
    "table_data",
    "grade_type_list",
    "grade_list",
    "buttress_data",
    "climb_symbols",
    "buttress_symbols",
];

/// The variables of a crag script that are used to build the table.
#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct CragScript {
    #[serde(rename = "cragId")]
    pub crag_id: Option<JSValue>,
    pub table_data: Option<Vec<SiteClimb>>,
    pub grade_list: Option<HashMap<String, HashMap<String, SiteGrade>>>,
    pub buttress_data: Option<HashMap<String, SiteButtress>>,
    pub climb_symbols: Option<HashMap<String, SiteSymbol>>,
}

/// Extracts the known variables of a crag script.
pub fn parse_crag_script(text: &str) -> PipelineResult<CragScript> {
    let body = text.trim();
    let body = body.strip_prefix("let").unwrap_or(body);
    let body = body.trim_end_matches(';');

    let mut vars: JSMap<String, JSValue> = JSMap::new();
    for (idx, line) in body.lines().enumerate() {
        let line = line.trim_start().trim_end().trim_end_matches(',');
        let (key, value) = match line.split_once('=') {
            Some(p) => p,
            None => continue,
        };
        let key = key.trim();
        if !SCRIPT_KEYS.contains(&key) {
            debug!("parse_crag_script: skipping line {}: {:?}", idx + 1, key);
            continue;
        }
        let value: JSValue = serde_json::from_str(value.trim()).context(ParsingScriptSnafu {
            key: key.to_string(),
            lineno: idx + 1,
        })?;
        vars.insert(key.to_string(), value);
    }
    debug!("parse_crag_script: found variables {:?}", vars.keys());

    serde_json::from_value(JSValue::Object(vars)).context(DecodingScriptSnafu {})
}

/// Reads a crag script and its polls, and assembles the crag with the
/// settings of the source.
pub fn read_crag_script(
    path: &str,
    polls_path: Option<&str>,
    cfs: &FileSource,
) -> PipelineResult<SiteCrag> {
    info!("Attempting to read crag script {:?}", path);
    let text = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let script = parse_crag_script(&text)?;

    let mut polls: HashMap<String, SitePoll> = match polls_path {
        Some(p) => {
            info!("Attempting to read grade polls {:?}", p);
            let contents = fs::read_to_string(p).context(OpeningFileSnafu { path: p })?;
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })?
        }
        None => {
            warn!("read_crag_script: no polls given for {:?}", path);
            HashMap::new()
        }
    };

    let mut climbs = script
        .table_data
        .context(MissingScriptVariableSnafu { key: "table_data" })?;
    for climb in climbs.iter_mut() {
        if climb.poll.is_none() {
            climb.poll = polls.remove(&climb.slug);
        }
    }
    if !polls.is_empty() {
        warn!(
            "read_crag_script: polls without a climb: {:?}",
            polls.keys().collect::<Vec<_>>()
        );
    }

    let name = match (&cfs.crag_name, &script.crag_id) {
        (Some(n), _) => n.clone(),
        (None, Some(id)) => format!("crag {}", id),
        (None, None) => "unknown crag".to_string(),
    };

    Ok(SiteCrag {
        name,
        url: cfs.crag_url.clone().unwrap_or_default(),
        nclimbs: Some(climbs.len() as u32),
        rocktype: cfs.rock_type.clone().unwrap_or_default(),
        aspect: cfs.aspect.clone().unwrap_or_default(),
        grade_list: script
            .grade_list
            .context(MissingScriptVariableSnafu { key: "grade_list" })?,
        buttress_data: script
            .buttress_data
            .context(MissingScriptVariableSnafu { key: "buttress_data" })?,
        climb_symbols: script.climb_symbols.unwrap_or_default(),
        climbs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        let cragId = 12,
            pageSize = 25,
            table_data = [{"name": "Gallows", "slug": "gallows-2", "grade": 36, "gradetype": 3, "stars": 2, "logs": 40, "desc": "", "symbols": [], "buttress_id": 5}],
            grade_list = {"3": {"36": {"name": "6b", "score": 36}}},
            buttress_data = {"5": {"name": "Main Wall", "meta": null}},
            climb_symbols = {};
    "#;

    #[test]
    fn parse_script_variables() {
        let script = parse_crag_script(SCRIPT).unwrap();
        assert_eq!(script.crag_id, Some(serde_json::json!(12)));
        let climbs = script.table_data.unwrap();
        assert_eq!(climbs.len(), 1);
        assert_eq!(climbs[0].slug, "gallows-2");
        assert_eq!(climbs[0].poll, None);
        assert!(script.grade_list.unwrap().contains_key("3"));
        assert_eq!(script.climb_symbols, Some(HashMap::new()));
    }

    #[test]
    fn broken_variable() {
        let res = parse_crag_script("let cragId = 12,\n    table_data = [{\"name\": ,\n");
        assert!(matches!(res, Err(PipelineError::ParsingScript { lineno: 2, .. })));
    }

    #[test]
    fn read_fixture_script() {
        let root = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
        let cfs = FileSource {
            provider: "crag_script".to_string(),
            file_path: "winspit_script.js".to_string(),
            polls_path: Some("winspit_polls.json".to_string()),
            crag_name: Some("Winspit".to_string()),
            crag_url: Some("https://example.org/logbook/crags/winspit-77/".to_string()),
            rock_type: Some("Limestone".to_string()),
            aspect: Some("S".to_string()),
        };
        let crag = read_crag_script(
            &format!("{}/winspit_script.js", root),
            Some(&format!("{}/winspit_polls.json", root)),
            &cfs,
        )
        .unwrap();
        assert_eq!(crag.name, "Winspit");
        assert_eq!(crag.climbs.len(), 3);
        assert!(crag.climbs[0].poll.is_some());
        assert!(crag.climbs.iter().any(|c| c.poll.is_none()));
    }
}
