use rlquiz::{Error, QuestionBank, QuizConfig};
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_config_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "quiz.toml",
        r#"
        [agent]
        epsilon_decay = 0.9
        layer_sizes = [16]

        [selector]
        bond_dim = 2
        dt = 0.05

        [session]
        episodes = 10
        transcript = "run.log"
        "#,
    );

    let config = QuizConfig::load(&path).unwrap();
    assert_eq!(config.agent.epsilon_decay, 0.9);
    assert_eq!(config.agent.layer_sizes, vec![16]);
    assert_eq!(config.selector.bond_dim, 2);
    assert_eq!(config.selector.dt, 0.05);
    assert_eq!(config.session.episodes, 10);
    assert_eq!(config.session.transcript, PathBuf::from("run.log"));
    assert_eq!(config.session.mastery_step, 0.1);
}

#[test]
fn missing_files_report_their_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    match QuizConfig::load(&missing) {
        Err(Error::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected an io error, got {other:?}"),
    }
    assert!(matches!(
        QuestionBank::load(dir.path().join("nope.json")),
        Err(Error::Io { .. })
    ));
}

#[test]
fn rejects_zero_bond_dimension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "quiz.toml", "[selector]\nbond_dim = 0\n");
    assert!(matches!(QuizConfig::load(&path), Err(Error::Config(_))));
}

#[test]
fn loads_bank_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bank.json",
        r#"[{"topic": 1, "question": "q", "options": ["a", "b"], "answer": 1}]"#,
    );

    let bank = QuestionBank::load(&path).unwrap();
    assert_eq!(bank.len(), 1);
    assert_eq!(bank.num_topics(), 2);
    assert_eq!(bank.get(0).unwrap().difficulty, 0);
}

#[test]
fn rejects_question_without_options() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bank.json",
        r#"[{"topic": 0, "question": "q", "options": [], "answer": 0}]"#,
    );
    assert!(matches!(
        QuestionBank::load(&path),
        Err(Error::InvalidBank(_))
    ));
}
