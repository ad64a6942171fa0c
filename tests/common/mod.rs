#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub const HEADER: &str = "          E          YC          XC          ZE          AZ          NE         NMU     ESUMHAD        NHAD           T           P          GT          MT         YMD         HMS           R          EV         AGE";

/// Scratch directory with a UTF-8 path.
pub struct Scratch {
    _dir: TempDir,
    pub root: Utf8PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        Scratch { _dir: dir, root }
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write a KCDC file made of the standard header and `lines`.
    pub fn kcdc_file(&self, name: &str, lines: &[String]) -> Utf8PathBuf {
        let path = self.path(name);
        let mut text = format!("{HEADER}\n");
        for l in lines {
            text.push_str(l);
            text.push('\n');
        }
        fs::write(&path, text).unwrap();
        path
    }
}

/// One synthetic record with the given selection and direction fields.
pub fn record_line(
    energy: f64,
    zenith: f64,
    azimuth: f64,
    ymd: u64,
    hms: u64,
    event: u64,
) -> String {
    format!(
        "{energy:.4} 10.0 -20.0 {zenith:.4} {azimuth:.4} 4.5 3.9 -1.0 -1 15.0 1000.0 900000000 0 {ymd} {hms} 1000 {event} 1.2"
    )
}

/// A deterministic spread of events over a few days and the visible sky.
pub fn synthetic_events(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let energy = 5.0 + (i % 40) as f64 * 0.1;
            let zenith = (i * 7 % 60) as f64 + 0.25;
            let azimuth = (i * 37 % 360) as f64 + 0.5;
            let ymd = 19980701 + (i / 200) as u64;
            let secs = (i * 131 % 86_400) as u64;
            let hms = secs / 3600 * 10_000 + secs % 3600 / 60 * 100 + secs % 60;
            record_line(energy, zenith, azimuth, ymd, hms, i as u64)
        })
        .collect()
}

/// Parse an exported sky map into rows of counts.
pub fn read_map(path: &Utf8Path) -> Vec<Vec<u64>> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split(' ').map(|v| v.parse().unwrap()).collect())
        .collect()
}

pub fn map_total(map: &[Vec<u64>]) -> u64 {
    map.iter().flatten().sum()
}
