use assert_cmd::Command;
use std::fs;

const METRO: &str = r##"[
    {"label": "1", "color": "#e53935", "cars": [0, 1], "size": 3, "points": [10, 4],
     "stations": [[2, 1], [3, 1], [4, 2], [5, 2]]},
    {"label": "2", "color": "#1e88e5", "cars": [0, 3], "size": 2, "points": [8, 2],
     "stations": [[5, 2], [4, 2], [3, 1], [3, 3]]}
]"##;

fn write_map(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("metro.json");
    fs::write(&path, METRO).unwrap();
    path
}

#[test]
fn renders_svg_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_map(&dir);
    let output = dir.path().join("metro.svg");

    Command::cargo_bin("metromap")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<polyline").count(), 2);
    assert!(svg.contains(r#"id="station-0""#));
}

#[test]
fn reads_stdin_with_preset() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("metro.svg");

    Command::cargo_bin("metromap")
        .unwrap()
        .args(["-", "--preset", "compact", "-o"])
        .arg(&output)
        .write_stdin(METRO)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn rejects_unknown_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_map(&dir);

    let assert = Command::cargo_bin("metromap")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("metro.gif"))
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("unsupported output format"));
}

#[test]
fn rejects_duplicate_line_labels() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dup.json");
    fs::write(
        &input,
        r##"[{"label":"1","color":"#000","cars":[0,0],"size":1,"stations":[[0,0]]},
            {"label":"1","color":"#fff","cars":[0,1],"size":1,"stations":[[1,0]]}]"##,
    )
    .unwrap();

    let assert = Command::cargo_bin("metromap")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("dup.svg"))
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("more than one line"));
}

#[test]
fn prints_geometry_warnings_regardless_of_log_filter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("stutter.json");
    fs::write(
        &input,
        r##"[{"label":"A","color":"#000","cars":[0,0],"size":1,"stations":[[0,0],[0,0],[1,0]]}]"##,
    )
    .unwrap();

    let assert = Command::cargo_bin("metromap")
        .unwrap()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("stutter.svg"))
        .env("RUST_LOG", "off")
        .assert()
        .success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Warning: line 'A' has a zero-length segment"));
}

#[test]
fn layout_dump_reports_shared_corridors() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_map(&dir);

    let assert = Command::cargo_bin("metromap-layout")
        .unwrap()
        .arg(&input)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let layout: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let tracks = layout["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 2);
    // Lines 1 and 2 share (3,1)-(4,2)-(5,2), walked in opposite directions.
    let shared = tracks[0]["segments"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["slot_count"] == 2)
        .count();
    assert_eq!(shared, 2);
    assert_eq!(layout["stations"].as_array().unwrap().len(), 5);
}
