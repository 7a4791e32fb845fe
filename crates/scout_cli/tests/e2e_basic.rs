use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn bin() -> Command {
    let path = assert_cmd::cargo::cargo_bin!("scout");
    Command::new(path)
}

const JUNIOR_PROFILE: &str = "Computer Science junior interested in Generative AI";

#[test]
fn match_filters_by_eligibility_over_a_jsonl_pool() {
    let dir = tempfile::tempdir().unwrap();
    let pool = dir.path().join("pool.jsonl");
    std::fs::write(
        &pool,
        concat!(
            r#"{"id":"L1","title":"Open hack","topic":"AI","description":"open event","eligibility":"Open to all."}"#,
            "\n",
            r#"{"id":"L2","title":"Pro seminar","topic":"AI","description":"experts only","eligibility":"Must have 2+ years professional ML experience."}"#,
            "\n",
        ),
    )
    .unwrap();

    // Threshold 0 with the lexical backend: cosine is never negative, so
    // every record reaches the eligibility rule.
    let assert = bin()
        .args([
            "match",
            "--listings",
            pool.to_str().unwrap(),
            "--profile",
            JUNIOR_PROFILE,
            "--threshold",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("id=L1"))
        .stdout(predicate::str::contains("verdict=accepted"))
        .stdout(predicate::str::contains("eligible=false"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let accepted_line = stdout
        .lines()
        .find(|l| l.contains("verdict=accepted"))
        .expect("one accepted line");
    assert!(accepted_line.contains("id=L1"));
    let rejected_line = stdout
        .lines()
        .find(|l| l.contains("verdict=rejected"))
        .expect("one rejected line");
    assert!(rejected_line.contains("id=L2"));
    assert!(stdout.contains("pool=2 accepted=1 rejected=1 skipped=0"));
}

#[test]
fn match_writes_accepted_records_as_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("accepted.jsonl");

    bin()
        .args([
            "match",
            "--sample",
            "--profile",
            JUNIOR_PROFILE,
            "--threshold",
            "0",
            "--output",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    // Sample pool at threshold 0: the student hackathon and the
    // open-to-all workshop pass, the experience-gated seminar does not.
    let ids: Vec<String> = written
        .lines()
        .map(|l| {
            let json: Value = serde_json::from_str(l).unwrap();
            assert_eq!(json["eligibility_ok"], true);
            assert!(json["similarity_score"].as_f64().unwrap() >= 0.0);
            json["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(ids, ["HACK-001", "CONF-005"]);
}

#[test]
fn run_writes_an_agenda_for_accepted_listings() {
    let dir = tempfile::tempdir().unwrap();
    let agenda = dir.path().join("agenda.jsonl");

    bin()
        .args([
            "run",
            "--sample",
            "--profile",
            JUNIOR_PROFILE,
            "--threshold",
            "0",
            "--agenda",
            agenda.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scout Run Complete"))
        .stdout(predicate::str::contains("Relevant and eligible:  2"));

    let written = std::fs::read_to_string(&agenda).unwrap();
    let entries: Vec<Value> = written
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // Two accepted listings, each with an event and a deadline entry.
    assert_eq!(entries.len(), 4);
    assert!(entries
        .iter()
        .any(|e| e["kind"] == "deadline" && e["listing_id"] == "HACK-001"));
    assert!(entries
        .iter()
        .any(|e| e["kind"] == "event" && e["listing_id"] == "CONF-005"));
}

#[test]
fn missing_model_files_fail_distinctly_not_as_zero_matches() {
    bin()
        .args([
            "match",
            "--sample",
            "--model-path",
            "/nonexistent/model.safetensors",
            "--tokenizer-path",
            "/nonexistent/tokenizer.json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("embedding model unavailable"));
}

#[test]
fn listings_or_sample_is_required() {
    bin()
        .args(["match"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--listings or --sample"));
}
