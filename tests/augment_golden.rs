use std::fs;

use kcdc_sky::params::KcdcParams;
use kcdc_sky::pipeline::{augment, augment::augmented_header};
use kcdc_sky::KcdcError;

mod common;
use common::{Scratch, HEADER};

const INPUT_1: &str = "    15.0428     43.7400     79.5148     44.2007      7.4743      3.9608      3.8254     -1.0000          -1     20.2800   1001.3107   899391407   756894400    19980702      145647        1000       10007      1.1117";
const INPUT_2: &str = "14.6021    -12.3300     25.1100     12.5000    200.0000      4.1200      3.5500     -1.0000          -1     12.1000    998.2000   947342400   123456000    20000108      033015        1001       20011      0.9500";

const GOLDEN_1: &str = "    15.0428     43.7400     79.5148     44.2007      7.4743      3.9608      3.8254     -1.0000          -1     20.2800   1001.3107   899391407   756894400    19980702      145647        1000       10007      1.1117    -103.4510     83.9679    116.7085     29.6641      2450997.122766     80.5673";
const GOLDEN_2: &str = "    14.6021    -12.3300     25.1100     12.5000    200.0000      4.1200      3.5500     -1.0000          -1     12.1000    998.2000   947342400   123456000    20000108       33015        1001       20011      0.9500     145.8025     37.2118   -173.5805     49.3446      2451551.646007    261.9190";

fn write_input(scratch: &Scratch) -> camino::Utf8PathBuf {
    scratch.kcdc_file("kcdc.txt", &[INPUT_1.to_string(), INPUT_2.to_string()])
}

#[test]
fn augmented_file_matches_reference_lines() {
    let scratch = Scratch::new();
    let input = write_input(&scratch);
    let output = scratch.path("kcdc_aug.txt");

    let summary = augment(&input, &output, &KcdcParams::default()).unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.written, 2);

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec![augmented_header(HEADER).as_str(), GOLDEN_1, GOLDEN_2]);
}

#[test]
fn distance_cut_keeps_nearby_records() {
    let scratch = Scratch::new();
    let input = write_input(&scratch);
    let output = scratch.path("kcdc_near.txt");

    // DIST is ~80.6 and ~261.9
    let params = KcdcParams::builder().max_distance(100.0).build().unwrap();
    let summary = augment(&input, &output, &params).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.filtered, 1);

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().nth(1), Some(GOLDEN_1));
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn missing_input_is_reported() {
    let scratch = Scratch::new();
    let err = augment(
        &scratch.path("absent.txt"),
        &scratch.path("out.txt"),
        &KcdcParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, KcdcError::OpenFile { .. }));
}

#[test]
fn empty_input_has_no_header() {
    let scratch = Scratch::new();
    let input = scratch.path("empty.txt");
    fs::write(&input, "").unwrap();

    let err = augment(&input, &scratch.path("out.txt"), &KcdcParams::default()).unwrap_err();
    assert!(matches!(err, KcdcError::MissingHeader(_)));
}
