use std::path::Path;

use crate::error::{Error, Result};

use super::types::SubwayRecord;

/// Parse and validate a map document: a JSON array of line records.
pub fn parse_subways(json: &str) -> Result<Vec<SubwayRecord>> {
    let subways: Vec<SubwayRecord> = serde_json::from_str(json)?;

    for subway in &subways {
        if let Some(pos) = subway.stations.iter().find(|pos| !pos.is_finite()) {
            return Err(Error::InvalidInput {
                message: format!(
                    "line '{}' has a non-finite station coordinate ({}, {})",
                    subway.label, pos.x, pos.y
                ),
            });
        }
        if !subway.cars.is_finite() {
            return Err(Error::InvalidInput {
                message: format!("line '{}' has a non-finite cars position", subway.label),
            });
        }
    }

    tracing::debug!(lines = subways.len(), "map document parsed");
    Ok(subways)
}

/// Read a map document from `-` (stdin), an `http(s)://` URL, or a file path.
pub fn load_subways(source: &str) -> Result<Vec<SubwayRecord>> {
    let json = read_source(source)?;
    parse_subways(&json)
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer).map_err(|e| {
            Error::Io {
                path: "<stdin>".to_string(),
                source: e,
            }
        })?;
        return Ok(buffer);
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        tracing::debug!(url = source, "fetching map document");
        let fetch_err = |e: ureq::Error| Error::Fetch {
            url: source.to_string(),
            message: e.to_string(),
        };
        let mut response = ureq::get(source).call().map_err(fetch_err)?;
        return response.body_mut().read_to_string().map_err(fetch_err);
    }

    std::fs::read_to_string(Path::new(source)).map_err(|e| Error::Io {
        path: source.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const METRO: &str = r##"[
        {"label": "1", "color": "#e53935", "cars": [0, 1], "size": 3, "points": [10, 4],
         "stations": [[2, 1], [3, 1], [4, 2]]},
        {"label": "2", "color": "#1e88e5", "cars": [0, 3], "size": 2, "points": [8, 2],
         "stations": [[4, 2], [3, 1]]}
    ]"##;

    #[test]
    fn parses_line_records() {
        let subways = parse_subways(METRO).unwrap();
        assert_eq!(subways.len(), 2);
        assert_eq!(subways[0].label, "1");
        assert_eq!(subways[1].stations.len(), 2);
        assert_eq!(subways[1].size, 2);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_subways(r#"[{"label": "1"}]"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn loads_from_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(METRO.as_bytes()).unwrap();

        let subways = load_subways(file.path().to_str().unwrap()).unwrap();
        assert_eq!(subways.len(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_subways("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == "/definitely/not/here.json"));
    }
}
