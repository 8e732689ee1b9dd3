//! CLI arg parsing tests for sitepulse (client)
use std::process::Command;

#[test]
fn help_mentions_token_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_sitepulse"))
        .arg("--help")
        .output()
        .expect("run sitepulse --help");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.status.success());
    assert!(
        text.contains("Usage:") && text.contains("--token") && text.contains("-t"),
        "help text missing expected flags (--token/-t)\n{text}"
    );
}

#[test]
fn help_wins_over_other_flags() {
    let exe = env!("CARGO_BIN_EXE_sitepulse");
    for args in [
        vec!["--token", "abc", "--help"],
        vec!["-t", "abc", "-h"],
        vec!["http://127.0.0.1:9", "--help"],
    ] {
        let out = Command::new(exe).args(&args).output().expect("run sitepulse");
        assert!(out.status.success(), "{args:?} did not succeed");
        assert!(String::from_utf8_lossy(&out.stderr).contains("Usage:"));
    }
}
