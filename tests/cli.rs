use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

fn fmm() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin(assert_cmd::pkg_name!())?)
}

#[test]
fn prints_summary_with_overrides() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["-c", "32", "-d", "s", "-n", "500", "--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ncrit                : 32\n"))
        .stdout(predicate::str::contains("distribution         : sphere\n"))
        .stdout(predicate::str::contains("numBodies            : 500\n"))
        .stdout(predicate::str::contains("threads              : 2\n"))
        .stdout(predicate::str::contains("wavenumber           : 20.000000\n"));
    Ok(())
}

#[test]
fn unknown_option_shows_usage_and_exits_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .arg("--bogus")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage:"))
        .stderr(predicate::str::contains("--numBodies (-n)"));
    Ok(())
}

#[test]
fn bad_distribution_before_unknown_option_aborts() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["-d", "x", "--bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid distribution x"));
    Ok(())
}

#[test]
fn usage_reports_values_given_before_unknown_option() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["-c", "32", "--bogus"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Number of bodies per leaf node (32)"));
    Ok(())
}

#[test]
fn abbreviated_and_stray_arguments_resolve() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["stray", "--num", "5", "-c", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("numBodies            : 5\n"))
        .stdout(predicate::str::contains("ncrit                : 3\n"));
    Ok(())
}

#[test]
fn help_flag_takes_usage_path() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .arg("--help")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Usage:"));
    Ok(())
}

#[test]
fn invalid_distribution_aborts() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["--distribution", "x"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid distribution x"));
    Ok(())
}

#[test]
fn config_file_is_layered_under_cli() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[kernel]\norder = 9\nwavenumber = 1.5\n\n[tree]\nmaxlevel = 3")?;

    fmm()?
        .arg("--config")
        .arg(file.path())
        .args(["-l", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P                    : 9\n"))
        .stdout(predicate::str::contains("maxlevel             : 7\n"))
        .stdout(predicate::str::contains("wavenumber           : 1.500000\n"));
    Ok(())
}

#[test]
fn missing_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    fmm()?
        .args(["--config", "/nonexistent/fmm.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/fmm.toml"));
    Ok(())
}
