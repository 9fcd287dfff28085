// tests/discovery.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{MockFileSystem, RUNNABLE_JS, TestResult, UTILITY_JS, init_tracing};

use testherd::discovery::{Classification, ClassifyRules, discover, scan};

fn paths(candidates: &[testherd::model::CandidateTest]) -> Vec<&str> {
    candidates.iter().map(|c| c.file_path.as_str()).collect()
}

#[test]
fn discovers_runnable_files_sorted_by_path() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("./tests/zeta.test.js", RUNNABLE_JS);
    fs.add_file("./tests/api/alpha.test.js", RUNNABLE_JS);
    fs.add_file("./tests/login.py", "if __name__ == \"__main__\":\n    main()\n");
    fs.add_file("./src/not-a-test.js", RUNNABLE_JS);

    let cfg = ConfigFileBuilder::new().build();
    let found = discover(&fs, &cfg.discovery)?;

    assert_eq!(
        paths(&found),
        vec!["tests/api/alpha.test.js", "tests/login.py", "tests/zeta.test.js"]
    );
    assert!(found.iter().all(|c| c.is_executable));
    assert_eq!(found[0].file_name, "alpha.test.js");
    Ok(())
}

#[test]
fn discovery_is_idempotent() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("./tests/b.js", RUNNABLE_JS);
    fs.add_file("./tests/a.js", RUNNABLE_JS);
    fs.add_file("./tests/helpers.js", UTILITY_JS);

    let cfg = ConfigFileBuilder::new().build();
    let first = discover(&fs, &cfg.discovery)?;
    let second = discover(&fs, &cfg.discovery)?;

    assert_eq!(first, second);
    assert_eq!(paths(&first), vec!["tests/a.js", "tests/b.js"]);
    Ok(())
}

#[test]
fn overlapping_patterns_do_not_duplicate_candidates() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./tests/smoke.js", RUNNABLE_JS);

    let cfg = ConfigFileBuilder::new()
        .patterns(&["tests/**/*.js", "tests/*.js", "**/smoke.js"])
        .build();
    let found = discover(&fs, &cfg.discovery)?;

    assert_eq!(paths(&found), vec!["tests/smoke.js"]);
    Ok(())
}

#[test]
fn excluded_names_and_globs_are_dropped() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./tests/Run-All-Tests.js", RUNNABLE_JS);
    fs.add_file("./tests/legacy/old.js", RUNNABLE_JS);
    fs.add_file("./tests/keep.js", RUNNABLE_JS);

    let cfg = ConfigFileBuilder::new().exclude("tests/legacy/**").build();
    let found = discover(&fs, &cfg.discovery)?;

    assert_eq!(paths(&found), vec!["tests/keep.js"]);
    Ok(())
}

#[test]
fn skipped_dirs_are_not_walked() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./tests/node_modules/pkg/index.js", RUNNABLE_JS);
    fs.add_file("./tests/real.js", RUNNABLE_JS);

    let cfg = ConfigFileBuilder::new().build();
    let found = discover(&fs, &cfg.discovery)?;

    assert_eq!(paths(&found), vec!["tests/real.js"]);
    Ok(())
}

#[test]
fn unreadable_file_is_skipped_not_fatal() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_unreadable_file("./tests/locked.js");
    fs.add_file("./tests/open.js", RUNNABLE_JS);

    let cfg = ConfigFileBuilder::new().build();
    let found = discover(&fs, &cfg.discovery)?;

    assert_eq!(paths(&found), vec!["tests/open.js"]);
    Ok(())
}

#[test]
fn pattern_matching_nothing_yields_empty_list() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./README.md", "# hi");

    let cfg = ConfigFileBuilder::new().build();
    assert!(discover(&fs, &cfg.discovery)?.is_empty());
    Ok(())
}

#[test]
fn scan_keeps_non_executable_matches() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("./tests/page.js", RUNNABLE_JS);
    fs.add_file("./tests/shared.js", UTILITY_JS);
    fs.add_file("./tests/notes.js", "// nothing runs here\n");

    let cfg = ConfigFileBuilder::new().build();
    let all = scan(&fs, &cfg.discovery)?;

    let flags: Vec<_> = all
        .iter()
        .map(|c| (c.file_path.as_str(), c.is_executable))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("tests/notes.js", false),
            ("tests/page.js", true),
            ("tests/shared.js", false),
        ]
    );
    Ok(())
}

#[test]
fn classify_prefers_utility_signals_over_entry_markers() {
    let rules = ClassifyRules::from_section(&ConfigFileBuilder::new().build().discovery);

    let both = "module.exports = class LoginPage {}\nif (require.main === module) { selfTest(); }";
    assert!(matches!(
        rules.classify("login-page.js", both),
        Classification::UtilityModule { .. }
    ));

    let spaced = "module.exports   =\n  {\n a: 1 }";
    assert!(matches!(
        rules.classify("shared.js", spaced),
        Classification::UtilityModule { .. }
    ));
}

#[test]
fn classify_detects_helper_names_by_stem() {
    let rules = ClassifyRules::from_section(&ConfigFileBuilder::new().build().discovery);

    assert_eq!(
        rules.classify("test-utils.js", RUNNABLE_JS),
        Classification::HelperName {
            name: "utils".to_string()
        }
    );
    assert!(matches!(
        rules.classify("config.js", RUNNABLE_JS),
        Classification::HelperName { .. }
    ));
    // A test about the config page is still a test.
    assert!(rules.classify("config-page.test.js", RUNNABLE_JS).is_executable());
}

#[test]
fn classify_requires_an_entry_marker() {
    let rules = ClassifyRules::from_section(&ConfigFileBuilder::new().build().discovery);

    assert_eq!(
        rules.classify("plain.js", "const x = 1;\n"),
        Classification::NoEntryPoint
    );
    assert!(
        rules
            .classify("browser.js", "const b = await puppeteer.launch({ headless: true });")
            .is_executable()
    );
    assert!(
        rules
            .classify("checks.py", "if __name__ == '__main__':\n    run()")
            .is_executable()
    );
}
