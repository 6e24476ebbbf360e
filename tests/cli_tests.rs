mod common;

use common::{run_javasema, write_java};
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const ORDERS: &str = indoc! {r#"
    import java.util.List;

    class Orders {
        private List<String> names;

        void process(int count, boolean done) {
            int seen = 0;
            names.add("order");
            for (int i = 0; i < count; i++) {
                seen++;
            }
            if (count > 0 && !done) {
                seen = names.size();
            }
            switch (count) {
                case 1:
                    seen = 1;
                    break;
                default:
                    seen = 2;
            }
        }
    }
"#};

fn json(stdout: &str) -> Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}):\n{stdout}"))
}

#[test]
fn test_side_effects_json_report() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let result = run_javasema(
        &["side-effects", path.to_str().unwrap(), "--format", "json"],
        temp.path(),
    );
    assert!(result.success, "{}", result.stderr);
    let report = json(&result.stdout);
    let statements = report["statements"].as_array().unwrap();
    let verdicts: Vec<(&str, &str)> = statements
        .iter()
        .map(|s| {
            (
                s["statement"]["text"].as_str().unwrap(),
                s["verdict"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(verdicts[0], ("int seen = 0;", "yes"));
    assert_eq!(verdicts[1], ("names.add(\"order\");", "yes"));
    assert_eq!(statements.len(), 5);
    assert_eq!(statements[1]["effects"][0]["text"], "names.add(\"order\")");
}

#[test]
fn test_side_effects_non_local_filter() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let result = run_javasema(
        &[
            "side-effects",
            path.to_str().unwrap(),
            "--non-local",
            "--line",
            "7",
            "-f",
            "json",
        ],
        temp.path(),
    );
    assert!(result.success, "{}", result.stderr);
    let report = json(&result.stdout);
    assert_eq!(report["statements"].as_array().unwrap().len(), 1);
    assert_eq!(report["statements"][0]["verdict"], "no");
}

#[test]
fn test_loops_text_report() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let result = run_javasema(&["loops", path.to_str().unwrap()], temp.path());
    assert!(result.success, "{}", result.stderr);
    assert!(
        result.stdout.contains("int i from 0 up to count)"),
        "{}",
        result.stdout
    );
    assert!(result.stdout.contains("counting"), "{}", result.stdout);
}

#[test]
fn test_negate_report_and_apply() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);

    let report = run_javasema(
        &["negate", path.to_str().unwrap(), "-f", "json"],
        temp.path(),
    );
    assert!(report.success, "{}", report.stderr);
    let report = json(&report.stdout);
    let negated: Vec<&str> = report["conditions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["negated"].as_str().unwrap())
        .collect();
    assert_eq!(negated, vec!["i >= count", "count <= 0 || done"]);

    let applied = run_javasema(
        &["negate", path.to_str().unwrap(), "--line", "12", "--apply"],
        temp.path(),
    );
    assert!(applied.success, "{}", applied.stderr);
    assert!(
        applied.stdout.contains("if (count <= 0 || done) {"),
        "{}",
        applied.stdout
    );
    assert_eq!(applied.stdout.lines().count(), ORDERS.lines().count());
}

#[test]
fn test_negate_apply_requires_line() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let result = run_javasema(&["negate", path.to_str().unwrap(), "--apply"], temp.path());
    assert!(!result.success);
    assert!(result.stderr.contains("--line"), "{}", result.stderr);
}

#[test]
fn test_switches_and_unwrap_breaks() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);

    let report = run_javasema(
        &["switches", path.to_str().unwrap(), "--format", "json"],
        temp.path(),
    );
    assert!(report.success, "{}", report.stderr);
    let report = json(&report.stdout);
    let switch = &report["switches"][0];
    assert_eq!(switch["switch"]["line"], 15);
    assert_eq!(switch["rule_format"], false);
    assert_eq!(switch["branches"]["cases"], 1);
    assert_eq!(switch["branches"]["has_default"], true);
    assert_eq!(switch["breaks"]["replaced"][0][1], "return;");

    let unwrapped = run_javasema(
        &["unwrap-breaks", path.to_str().unwrap(), "--line", "15"],
        temp.path(),
    );
    assert!(unwrapped.success, "{}", unwrapped.stderr);
    assert!(!unwrapped.stdout.contains("break;"), "{}", unwrapped.stdout);
    assert!(unwrapped.stdout.contains("return;"), "{}", unwrapped.stdout);
}

#[test]
fn test_unwrap_breaks_reports_missing_switch() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let result = run_javasema(
        &["unwrap-breaks", path.to_str().unwrap(), "--line", "3"],
        temp.path(),
    );
    assert!(!result.success);
    assert!(result.stderr.contains("No switch starts on line 3"), "{}", result.stderr);
}

#[test]
fn test_missing_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = run_javasema(&["loops", "Nope.java"], temp.path());
    assert!(!result.success);
    assert!(result.stderr.contains("Failed to read"), "{}", result.stderr);
}

#[test]
fn test_explicit_config_is_used() {
    let temp = TempDir::new().unwrap();
    let path = write_java(temp.path(), "Orders.java", ORDERS);
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "[side_effects]\ninheritor_search_limit = 0\n").unwrap();
    let result = run_javasema(
        &[
            "loops",
            path.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ],
        temp.path(),
    );
    assert!(!result.success);
    assert!(
        result.stderr.contains("inheritor_search_limit"),
        "{}",
        result.stderr
    );
}
