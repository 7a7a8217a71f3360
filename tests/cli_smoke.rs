mod support;

use predicates::str::contains;

use support::{taskboard_cmd, TestBoard};

#[test]
fn taskboard_help_works() {
    taskboard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Kanban task board"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "init", "add", "edit", "show", "rm", "board", "ls", "move", "drag", "sync", "pull",
    ];

    for cmd in subcommands {
        taskboard_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn commands_require_an_initialized_board() {
    let board = TestBoard::empty();
    board
        .cmd()
        .arg("board")
        .assert()
        .code(2)
        .stderr(contains("Board not initialized"))
        .stderr(contains("hint: taskboard init"));
}

#[test]
fn init_is_idempotent() {
    let board = TestBoard::init();
    assert!(board.path().join(".taskboard.toml").exists());
    assert!(board.path().join(".taskboard").join("board.json").exists());

    board
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn dir_flag_and_env_select_the_board() {
    let board = TestBoard::empty();
    let target = board.path().join("nested");

    taskboard_cmd()
        .arg("--dir")
        .arg(&target)
        .args(["init", "--sample"])
        .assert()
        .success();

    taskboard_cmd()
        .env("TASKBOARD_DIR", &target)
        .arg("board")
        .assert()
        .success()
        .stdout(contains("Design user interface mockups"));
}

#[test]
fn json_errors_use_the_envelope() {
    let board = TestBoard::sample();
    board
        .cmd()
        .args(["--json", "show", "nope"])
        .assert()
        .code(2)
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("\"command\": \"show\""))
        .stdout(contains("\"kind\": \"user_error\""));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let board = TestBoard::sample();
    let output = board
        .cmd()
        .args(["--verbose", "--json", "drag", "3", "--over", "done"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
    assert!(stderr.contains("drag end"));
}
