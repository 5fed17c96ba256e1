use assert_cmd::prelude::*;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn rmahjong(tmp: &TempDir, args: &[&str]) -> Output {
    let mut cmd = Command::cargo_bin("rmahjong").expect("binary exists");
    cmd.current_dir(tmp.path())
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(tmp.path().join("data"))
        .args(args)
        .output()
        .expect("run rmahjong")
}

fn ok(tmp: &TempDir, args: &[&str]) -> String {
    let out = rmahjong(tmp, args);
    assert!(
        out.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf-8 stdout")
}

fn setup_players(tmp: &TempDir) {
    for p in ["A", "B", "C", "D"] {
        ok(tmp, &["player", "add", p]);
    }
    ok(tmp, &["settings", "roster", "A", "B", "C", "D"]);
}

#[test]
fn record_undo_settle_flow() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);

    let out = ok(&tmp, &["--json", "record", "A=32000", "B=28000", "C=24000", "D=16000,y=-1"]);
    let record: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(record["results"][0]["score_diff"], 17_000);
    assert_eq!(record["results"][3]["position"], 4);
    assert_eq!(record["results"][3]["yakuman"], -1);

    let out = ok(&tmp, &["--json", "session"]);
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 4);

    ok(&tmp, &["undo"]);
    let out = rmahjong(&tmp, &["undo"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("取り消すゲーム記録がありません"));

    ok(&tmp, &["record", "A=32000", "B=28000", "C=24000", "D=16000"]);
    ok(&tmp, &["settle"]);
    let out = rmahjong(&tmp, &["undo"]);
    assert!(!out.status.success());

    let out = ok(&tmp, &["--json", "stats"]);
    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(rows[0]["player"], "A");
    assert_eq!(rows[0]["total_score"], 17_000);
}

#[test]
fn mismatched_scores_are_rejected() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    let out = rmahjong(&tmp, &["record", "A=32000", "B=28000", "C=24000", "D=15000"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("差額 -1000"));
    let out = ok(&tmp, &["--json", "history"]);
    assert_eq!(out.trim(), "[]");
}

#[test]
fn out_of_range_scores_fail_cleanly() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    let out = rmahjong(&tmp, &["record", "A=9223372036854775807", "B=1", "C=0", "D=0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("範囲外"));
    let out = rmahjong(&tmp, &["preview", "A=25000,y=11", "B=25000", "C=25000", "D=25000"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn negative_scores_and_flags_are_parsed() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    let out = ok(
        &tmp,
        &["--json", "preview", "A=52000,dealt", "B=30000", "C=20000", "D=-2000,bust"],
    );
    let preview: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(preview["validation"]["valid"], true);
    assert_eq!(preview["results"][0]["score"], 62_000);
    assert_eq!(preview["results"][3]["special"], "跳び");
    // preview は保存しない
    assert!(!tmp.path().join("data").join("mahjong_history.json").exists());
}

#[test]
fn csv_export_has_bom_and_header() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    ok(&tmp, &["record", "A=32000", "B=28000", "C=24000", "D=16000"]);
    ok(&tmp, &["settle"]);
    let path = tmp.path().join("stats.csv");
    ok(&tmp, &["export-csv", "--output", path.to_str().unwrap()]);
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.starts_with("順位,プレイヤー,総合勝ち得点"));
    assert!(text.contains("1,A,17000,1,0,0,0,0,0,0,1700"));
}

#[test]
fn settings_and_config_file() {
    let tmp = TempDir::new().unwrap();
    let out = ok(&tmp, &["--json", "settings", "game-type", "three"]);
    let settings: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(settings["game_type"], "三麻");
    assert_eq!(settings["roster"].as_array().unwrap().len(), 3);

    let out = rmahjong(&tmp, &["settings", "uma", "three", "10", "0", "-5", "-5"]);
    assert!(!out.status.success());
    ok(&tmp, &["settings", "uma", "three", "20", "0", "-20"]);
    let out = ok(&tmp, &["--json", "settings", "rate", "0.5"]);
    let settings: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(settings["rate"], 0.5);
    assert_eq!(settings["uma_three"][0], 20);

    // 設定ファイルの data_dir はコマンドライン指定で上書きされる
    let cfg = tmp.path().join("custom.toml");
    fs::write(&cfg, "data_dir = \"elsewhere\"\nlog_level = \"warn\"\n").unwrap();
    let out = ok(&tmp, &["--config", cfg.to_str().unwrap(), "--json", "status"]);
    let status: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(status["settings"]["rate"], 0.5);
    assert!(!tmp.path().join("elsewhere").exists());
}

#[test]
fn rename_purge_and_clear() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    ok(&tmp, &["record", "A=32000", "B=28000", "C=24000", "D=16000"]);
    ok(&tmp, &["settle"]);
    ok(&tmp, &["player", "rename", "A", "田中"]);
    let out = rmahjong(&tmp, &["player", "rename", "B", "田中"]);
    assert!(!out.status.success());

    // 参加中のプレイヤーは削除できない
    let out = rmahjong(&tmp, &["player", "purge", "B"]);
    assert!(!out.status.success());
    ok(&tmp, &["settings", "roster", "田中", "C", "D", "プレイヤー1"]);
    let out = ok(&tmp, &["player", "purge", "B"]);
    assert!(out.contains("B の成績を削除しました"));

    let out = rmahjong(&tmp, &["clear"]);
    assert!(!out.status.success());
    ok(&tmp, &["clear", "--yes"]);
    let out = ok(&tmp, &["--json", "stats"]);
    assert_eq!(out.trim(), "[]");
}

#[test]
fn unreadable_store_is_reported_and_defaulted() {
    let tmp = TempDir::new().unwrap();
    setup_players(&tmp);
    ok(&tmp, &["record", "A=32000", "B=28000", "C=24000", "D=16000"]);
    fs::write(tmp.path().join("data").join("mahjong_history.json"), "{ broken").unwrap();

    let mut cmd = Command::cargo_bin("rmahjong").expect("binary exists");
    let out = cmd
        .current_dir(tmp.path())
        .env("RUST_LOG", "error")
        .arg("--data-dir")
        .arg(tmp.path().join("data"))
        .args(["--json", "status"])
        .output()
        .expect("run rmahjong");
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Warning: history の読み込みに失敗しました"), "{stderr}");
    let status: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(status["rounds"], 0);
}

#[test]
fn backup_is_written() {
    let tmp = TempDir::new().unwrap();
    let copy = tmp.path().join("backup.json.gz");
    let out = ok(&tmp, &["backup", "--output", copy.to_str().unwrap()]);
    let location = out.trim();
    assert!(location.contains("mahjong_backup_"));
    assert!(fs::metadata(location).unwrap().len() > 0);
    assert!(copy.exists());
}
