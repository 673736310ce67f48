use clap::Parser;
use domain::vote::VoteChoice;
use presentation::cli::{Cli, Command};

#[test]
fn vote_command_parses_choice() {
    let cli = Cli::try_parse_from(["naitssu", "vote", "42", "disagree", "--yes"]).unwrap();
    match cli.command {
        Command::Vote { id, choice, yes } => {
            assert_eq!(id, 42);
            assert_eq!(choice, VoteChoice::Disagree);
            assert!(yes);
        }
        _ => panic!("expected vote"),
    }
}

#[test]
fn unknown_choice_is_rejected() {
    assert!(Cli::try_parse_from(["naitssu", "vote", "42", "maybe"]).is_err());
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "naitssu",
        "bills",
        "--page",
        "2",
        "--api-url",
        "http://localhost:8080",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8080"));
    assert!(matches!(cli.command, Command::Bills { page: 2, .. }));
}

#[test]
fn chat_scopes_are_exclusive() {
    assert!(Cli::try_parse_from(["naitssu", "chat", "--bill", "1", "--meeting", "2"]).is_err());
}
