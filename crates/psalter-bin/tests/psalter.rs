use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn psalter() -> Command {
    Command::cargo_bin("psalter").unwrap()
}

#[test]
fn resolve_text_with_definition() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", r"Hello \def{who}!", "-d", "who=World"]);
    cmd.assert().success().stdout("Hello World!\n");
}

#[test]
fn resolve_prints_footnotes() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", r"a\footnote{one} b\footnote{x|two}"]);
    cmd.assert()
        .success()
        .stdout("a[1] bx[2]\n[1] one\n[2] two\n");
}

#[test]
fn resolve_legacy_font() {
    let mut cmd = psalter();
    cmd.args([
        "resolve",
        "--text",
        r"Pjoeic (\trslit{en|Pjoeic})",
        "--language",
        "cop",
        "--font",
        "CS Avva Shenouda",
    ]);
    cmd.assert().success().stdout("Ⲡϫⲟⲉⲓⲥ (Pjoeis)\n");
}

#[test]
fn resolve_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", r"\lines{ - |a|b}").unwrap();
    let mut cmd = psalter();
    cmd.arg("resolve").arg(file.path());
    cmd.assert().success().stdout("a - b\n");
}

#[test]
fn resolve_line_separator_setting() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", r"\lines{|a|b}", "--line-separator", " * "]);
    cmd.assert().success().stdout("a * b\n");
}

#[test]
fn resolve_missing_definition() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", r"\def{missing}"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no definition with key `missing`"));
}

#[test]
fn resolve_unknown_command() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", r"\defn{missing}"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(r"unknown command \defn"));
}

#[test]
fn resolve_cycle_with_max_depth() {
    let mut cmd = psalter();
    cmd.args([
        "resolve",
        "--text",
        r"\def{a}",
        "-d",
        r"a=\def{b}",
        "-d",
        r"b=\def{a}",
        "--max-depth",
        "20",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nested more than 20 levels deep"));
}

#[test]
fn resolve_invalid_definition_flag() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", "a", "-d", "novalue"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("key=value"));
}

#[test]
fn resolve_invalid_language() {
    let mut cmd = psalter();
    cmd.args(["resolve", "--text", "a", "--language", "cop-"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("is not a language tag"));
}

#[test]
fn doc_for_one_command() {
    let mut cmd = psalter();
    cmd.args(["doc", "def"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Insert the text of another definition"));
}

#[test]
fn doc_lists_every_command() {
    let mut cmd = psalter();
    cmd.arg("doc");
    cmd.assert().success().stdout(
        predicate::str::contains("ternary")
            .and(predicate::str::contains("trslit"))
            .and(predicate::str::contains("footnote")),
    );
}

#[test]
fn doc_for_unknown_command() {
    let mut cmd = psalter();
    cmd.args(["doc", "nosuch"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(r"Unknown command \nosuch"));
}

#[test]
fn doc_for_abv_describes_its_language() {
    let mut cmd = psalter();
    cmd.args(["doc", "abv"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no secondary language is added"));
}
