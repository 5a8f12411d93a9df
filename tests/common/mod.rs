#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use jacocov::diff::ChangeSource;

/// A change source that returns a fixed list of paths.
pub struct FixedChanges(pub Vec<String>);

impl FixedChanges {
    pub fn new(paths: &[&str]) -> Self {
        Self(paths.iter().map(|p| p.to_string()).collect())
    }
}

impl ChangeSource for FixedChanges {
    fn changed_files(&self, _base_branch: &str) -> jacocov::error::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Build a one-package, one-class, one-method JaCoCo report with lines
/// `1..=n`; odd lines are covered, every third line has a 1/2 branch.
pub fn single_method_report(n: u32) -> String {
    let mut lines = String::new();
    for nr in 1..=n {
        let ci = nr % 2;
        let (mb, cb) = if nr % 3 == 0 { (1, 1) } else { (0, 0) };
        lines.push_str(&format!(
            "<line nr=\"{nr}\" mi=\"{}\" ci=\"{ci}\" mb=\"{mb}\" cb=\"{cb}\"/>\n",
            1 - ci
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<report name="single">
  <sessioninfo id="s" start="1234567" dump="1234999"/>
  <package name="org/demo">
    <class name="org/demo/Only" sourcefilename="Only.java">
      <method name="work" desc="()V" line="1">
        <counter type="LINE" missed="1" covered="1"/>
      </method>
      <counter type="LINE" missed="1" covered="1"/>
    </class>
    <sourcefile name="Only.java">
{lines}    </sourcefile>
  </package>
</report>
"#
    )
}

/// Returns false when git is not installed.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a throwaway identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}
