use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn analyze_runs_offline_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tiles = dir.path().join("srtm");
    fs::create_dir_all(&tiles).expect("tile dir");
    let out = dir.path().join("out");

    Command::cargo_bin("analyze")
        .expect("analyze bin")
        .env_remove("GOOGLE_API_KEY")
        .args([
            "--srtm-dir",
            tiles.to_str().unwrap(),
            "--samples",
            "31",
            "--output-dir",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verdict: CLEAR"))
        .stdout(predicate::str::contains("Target @ 5.0 DME: 1620 ft"));

    let samples = fs::read_to_string(out.join("samples.csv")).expect("samples csv");
    assert_eq!(samples.lines().count(), 32);
    assert!(out.join("profile.csv").exists());
    assert!(out.join("overlays.csv").exists());
    assert!(out.join("summary.json").exists());
}

#[test]
fn analyze_can_fail_on_violation() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("analyze")
        .expect("analyze bin")
        .args([
            "--srtm-dir",
            dir.path().to_str().unwrap(),
            "--buffer-ft",
            "800",
            "--no-export",
            "--fail-on-violation",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CONFLICTS FOUND"));
}

#[test]
fn analyze_rejects_invalid_overrides() {
    Command::cargo_bin("analyze")
        .expect("analyze bin")
        .args(["--samples", "1", "--no-export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("samples must be between 2"));

    Command::cargo_bin("analyze")
        .expect("analyze bin")
        .args(["--sources", "srtm,bing", "--no-export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown elevation source"));
}

#[test]
fn profile_plot_renders_png_and_gif() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");
    let fixes = dir.path().join("fixes.csv");
    fs::write(&fixes, "distance_nm,altitude_ft,label\n3.5,1350,DUYET\n").expect("fixes");

    Command::cargo_bin("analyze")
        .expect("analyze bin")
        .args([
            "--srtm-dir",
            dir.path().to_str().unwrap(),
            "--samples",
            "12",
            "--sdf",
            fixes.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let png = dir.path().join("chart.png");
    let gif = dir.path().join("descent.gif");
    Command::cargo_bin("profile_plot")
        .expect("profile_plot bin")
        .args([
            "--samples",
            out.join("samples.csv").to_str().unwrap(),
            "--profile",
            out.join("profile.csv").to_str().unwrap(),
            "--overlays",
            out.join("overlays.csv").to_str().unwrap(),
            "--summary",
            out.join("summary.json").to_str().unwrap(),
            "--output",
            png.to_str().unwrap(),
            "--gif",
            gif.to_str().unwrap(),
            "--frame-stride",
            "4",
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 frames)"));

    assert!(fs::metadata(&png).expect("png metadata").len() > 0);
    assert!(fs::metadata(&gif).expect("gif metadata").len() > 0);
}

#[test]
fn profile_plot_warns_on_unreadable_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let samples = dir.path().join("samples.csv");
    fs::write(
        &samples,
        "distance_nm,latitude_deg,longitude_deg,elevation_m,terrain_ft,altitude_ft,terrain_conflict,below_mda\n\
         6.0,37.7,-122.3,,,1800.00,false,false\n\
         n/a,37.7,-122.3,,,1500.00,false,false\n\
         3.0,37.6,-122.3,30.0,98.4,1260.00,false,false\n\
         0.0,37.6,-122.3,3.0,9.8,720.00,false,false\n",
    )
    .expect("samples");
    let png = dir.path().join("chart.png");

    Command::cargo_bin("profile_plot")
        .expect("profile_plot bin")
        .env_remove("RUST_LOG")
        .args([
            "--samples",
            samples.to_str().unwrap(),
            "--mda-ft",
            "720",
            "--output",
            png.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping row"));

    assert!(fs::metadata(&png).expect("png metadata").len() > 0);
}

#[test]
fn precache_requires_a_tile_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("precache_srtm")
        .expect("precache bin")
        .args([
            "--lat",
            "37.6",
            "--lon",
            "-122.4",
            "--tile-dir",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no tile URL"));
}
