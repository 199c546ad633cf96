use gator_core::{Command, Config};

fn words(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|w| w.to_string()).collect()
}

#[test]
fn from_words_lowercases_the_verb_only() {
    let cmd = Command::from_words(&words(&["LOGIN", "Alice"])).unwrap();
    assert_eq!(cmd, Command::new("login", ["Alice"]));
}

#[test]
fn from_words_requires_a_verb() {
    assert!(Command::from_words(&[]).is_none());
}

#[test]
fn username_arity_is_validated() {
    let missing = Command::new("login", Vec::<String>::new());
    assert_eq!(
        missing.username().unwrap_err().to_string(),
        "a username is required"
    );

    let blank = Command::new("register", ["   "]);
    assert!(blank.username().unwrap_err().is_usage());

    let extra = Command::new("login", ["alice", "bob"]);
    assert_eq!(
        extra.username().unwrap_err().to_string(),
        "login command expects a single argument, the username"
    );

    let ok = Command::new("login", ["alice"]);
    assert_eq!(ok.username().unwrap(), "alice");
}

#[test]
fn no_arg_commands_reject_arguments() {
    assert!(Command::new("users", Vec::<String>::new())
        .expect_no_args()
        .is_ok());
    let err = Command::new("reset", ["now"]).expect_no_args().unwrap_err();
    assert_eq!(err.to_string(), "reset command takes no arguments");
}

#[test]
fn config_reads_the_two_known_fields() {
    let parsed: Config = serde_json::from_str(
        r#"{"db_url":"sqlite://gator.db","current_user_name":"kira","extra":1}"#,
    )
    .unwrap();
    assert_eq!(parsed.db_url, "sqlite://gator.db");
    assert_eq!(parsed.current_user_name, "kira");

    let fresh: Config = serde_json::from_str(r#"{"db_url":"x"}"#).unwrap();
    assert_eq!(fresh.current_user_name, "");

    assert!(serde_json::from_str::<Config>(r#"{"current_user_name":"x"}"#).is_err());
}
