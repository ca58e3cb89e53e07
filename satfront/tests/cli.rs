use std::{
    fs,
    io::{BufRead, BufReader, Read, Write},
    os::unix::process::ExitStatusExt,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn satfront() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_satfront"));
    command.env_remove("SATFRONT_LOG");
    command
}

fn run_with_input(args: &[&str], input: &str) -> Output {
    let mut child = satfront()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("satfront-cli-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn satisfiable_with_witness() {
    let output = run_with_input(&[], "p cnf 3 2\n1 -2 0\n-1 2 3 0\n");
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(10));
    assert!(out.contains("\ns SATISFIABLE\n"));
    let values: Vec<i32> = out
        .lines()
        .filter(|line| line.starts_with('v'))
        .flat_map(|line| line[1..].split_whitespace())
        .map(|value| value.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 4);
    assert_eq!(values[3], 0);
    for (var, &value) in (1..=3).zip(&values) {
        assert_eq!(value.abs(), var);
    }
    assert!(out.contains("c parsing '<stdin>'\n"));
    assert!(out.contains("c parsed 'p cnf 3 2' header\n"));
    assert!(out.contains("c ---- [ statistics ] ----\n"));
    assert!(out.ends_with("c exit 10\n"));
}

#[test]
fn unsatisfiable() {
    let output = run_with_input(&[], "p cnf 1 2\n1 0\n-1 0\n");

    assert_eq!(output.status.code(), Some(20));
    let out = stdout(&output);
    assert!(out.contains("\ns UNSATISFIABLE\n"));
    assert!(!out.lines().any(|line| line.starts_with('v')));
}

#[test]
fn no_witness() {
    let output = run_with_input(&["-n"], "p cnf 1 1\n1 0\n");

    assert_eq!(output.status.code(), Some(10));
    assert!(!stdout(&output).lines().any(|line| line.starts_with('v')));
}

#[test]
fn quiet_prints_result_lines_only() {
    let output = run_with_input(&["-q"], "c comment\np cnf 2 1\n1 2 0\n");

    assert_eq!(output.status.code(), Some(10));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "s SATISFIABLE");
    assert!(lines[1..].iter().all(|line| line.starts_with("v ")));
}

#[test]
fn reads_file() {
    let path = temp_file("formula.cnf", "p cnf 2 2\n1 0\n-1 2 0\n");
    let output = satfront().arg(&path).output().unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(output.status.code(), Some(10));
    let out = stdout(&output);
    assert!(out.contains("v 1 2 0\n"));
    assert!(out.contains(&format!("c closed '{}'\n", path.display())));
}

#[test]
fn reads_gzip_compressed_file() {
    if Command::new("gzip").arg("--version").output().is_err() {
        return;
    }
    let path = temp_file("compressed.cnf", "p cnf 1 2\n1 0\n-1 0\n");
    assert!(Command::new("gzip")
        .arg("-f")
        .arg(&path)
        .status()
        .unwrap()
        .success());
    let compressed = format!("{}.gz", path.display());

    let output = satfront().arg(&compressed).output().unwrap();
    fs::remove_file(&compressed).unwrap();

    assert_eq!(output.status.code(), Some(20));
}

#[test]
fn help_and_version() {
    let output = satfront().arg("-h").output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("usage: satfront"));

    let output = satfront().args(["--version", "--bogus"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), format!("{}\n", env!("CARGO_PKG_VERSION")));
    assert_eq!(stderr(&output), "");
}

#[test]
fn err_options_checked_left_to_right() {
    let output = satfront().args(["a.cnf", "b.cnf", "-h"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "satfront: error: multiple files 'a.cnf' and 'b.cnf' (try '-h')\n"
    );
    assert_eq!(stdout(&output), "");

    for args in [&["--"][..], &["--", "-q"], &["-nq"], &["-"]] {
        let output = satfront().args(args).output().unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert_eq!(
            stderr(&output),
            format!("satfront: error: invalid command option '{}' (try '-h')\n", args[0])
        );
    }
}

#[test]
fn err_invalid_option() {
    let output = satfront().arg("--bogus").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--bogus"));
}

#[test]
fn err_conflicting_options() {
    let output = satfront().args(["-q", "-v"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "satfront: error: can not combine '--quiet' and '--verbose'\n"
    );
}

#[test]
fn err_inaccessible_file() {
    let output = satfront()
        .arg("/nonexistent/formula.cnf")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "satfront: error: can not access '/nonexistent/formula.cnf'\n"
    );
}

#[test]
fn err_missing_terminating_zero() {
    let output = run_with_input(&[], "p cnf 2 1\n1 2\n");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "satfront: parse error at line 3 in '<stdin>': terminating zero after literal '2' missing\n"
    );
}

#[test]
fn err_extra_clause() {
    let output = run_with_input(&[], "p cnf 2 1\n1 0\n2 0\n");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "satfront: parse error at line 3 in '<stdin>': more clauses than specified\n"
    );
}

#[test]
fn repeated_signal_reports_once() {
    let mut child = satfront()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    // Keep the input open so the process blocks while parsing.
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"p cnf 2 1\n1 ").unwrap();
    stdin.flush().unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0);
        if line == "c parsed 'p cnf 2 1' header\n" {
            break;
        }
    }

    let pid = child.id() as libc::pid_t;
    unsafe {
        assert_eq!(libc::kill(pid, libc::SIGTERM), 0);
        libc::kill(pid, libc::SIGTERM);
    }

    let status = child.wait().unwrap();
    drop(stdin);
    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();

    assert_eq!(status.signal(), Some(libc::SIGTERM));
    assert_eq!(rest.matches("caught signal").count(), 1);
    assert_eq!(rest.matches("raising signal").count(), 1);
    assert!(rest.contains(&format!("c caught signal {} ('SIGTERM')\n", libc::SIGTERM)));
    assert!(rest.contains("c added literals:"));
}

#[test]
fn quiet_signal_prints_nothing() {
    let mut child = satfront()
        .arg("-q")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"p cnf 2 1\n1 ").unwrap();
    stdin.flush().unwrap();
    // Nothing is printed in quiet mode, so give the process time to block on the input.
    std::thread::sleep(std::time::Duration::from_millis(300));

    let pid = child.id() as libc::pid_t;
    unsafe {
        assert_eq!(libc::kill(pid, libc::SIGTERM), 0);
        libc::kill(pid, libc::SIGTERM);
    }

    let status = child.wait().unwrap();
    drop(stdin);
    let mut out = String::new();
    child.stdout.take().unwrap().read_to_string(&mut out).unwrap();

    assert_eq!(status.signal(), Some(libc::SIGTERM));
    assert_eq!(out, "");
}
