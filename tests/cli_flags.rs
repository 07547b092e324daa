use assert_cmd::Command;

fn combined_output(output: &std::process::Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn uvolenc() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("uvolenc"))
}

#[test]
fn top_level_help_lists_pipeline_commands() {
    let output = uvolenc().arg("--help").output().expect("--help runs");
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("encode"), "help text missing encode: {text}");
    assert!(
        text.contains("reconcile"),
        "help text missing reconcile: {text}"
    );
}

#[test]
fn encode_help_includes_mismatch_policy() {
    let output = uvolenc()
        .arg("encode")
        .arg("--help")
        .output()
        .expect("encode --help runs");
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("--on-mismatch"),
        "help text missing --on-mismatch: {text}"
    );
    assert!(text.contains("abort"), "help text missing abort: {text}");
    assert!(text.contains("proceed"), "help text missing proceed: {text}");
}

#[test]
fn reconcile_help_includes_mismatch_policy() {
    let output = uvolenc()
        .arg("reconcile")
        .arg("--help")
        .output()
        .expect("reconcile --help runs");
    assert!(output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("--on-mismatch"),
        "help text missing --on-mismatch: {text}"
    );
}

#[test]
fn encode_rejects_a_missing_config() {
    let output = uvolenc()
        .arg("encode")
        .arg("no-such-project.json")
        .output()
        .expect("encode runs");
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("reading config"),
        "missing config error context: {text}"
    );
}
