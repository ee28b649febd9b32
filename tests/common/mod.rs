#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{TempDir, tempdir};

pub const MESSY_ORDERS: &str = "\
Order #,Customer Name,Revenue ($),Discount %,Order Date,Notes
1001, Ann Lee ,\"$1,000\",10%,01/15/2024,first
1002,Bob Stone,\"$2,500.50\",25%,02/20/2024,
1003,Cy Young,,5%,03/10/2024,rush
";

pub const CLEAN_ORDERS: &str = "\
id,customer,amount,ordered_on
1,Ann,10.50,2024-01-15
2,Bob,3,2024-02-01
";

/// Binary under test.
pub fn csv_tidy() -> Command {
    Command::cargo_bin("csv-tidy").expect("csv-tidy binary")
}

/// Scratch directory that disappears with the test.
pub struct TestWorkspace {
    root: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            root: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Writes `contents` to `name`, creating parent directories as needed.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.join(name)).expect("read workspace file")
    }

    /// The single run log under `dir`.
    pub fn only_log(&self, dir: &str) -> String {
        let entries: Vec<PathBuf> = fs::read_dir(self.join(dir))
            .expect("list log dir")
            .map(|entry| entry.expect("dir entry").path())
            .collect();
        assert_eq!(entries.len(), 1, "expected one log in {dir}: {entries:?}");
        fs::read_to_string(&entries[0]).expect("read log")
    }
}
