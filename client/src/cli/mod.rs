use crate::error::ClientError;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "client",
    version,
    about = "Task scheduler client CLI",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Schedule a command: add <-r|-a> <spec> [-i <spec>] <command...>
    #[command(name = "add")]
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },
    /// Remove a scheduled task by id
    #[command(name = "cancel")]
    Cancel { id: u64 },
    /// List every task that has not completed
    #[command(name = "display")]
    Display,
    /// Shut the server down
    #[command(name = "stop")]
    Stop,
}

/// Split the raw `add` tokens into the time-spec text and the command
/// text. The first two tokens are the schedule flag and its value; an
/// `-i` right after pulls in two more. Everything left is the command,
/// rendered with one trailing space per token.
pub fn split_add_tokens(tokens: &[String]) -> Result<(String, String), ClientError> {
    let spec_len = if tokens.len() > 2 && tokens[2] == "-i" {
        4
    } else {
        2
    };
    if tokens.len() <= spec_len {
        return Err(ClientError::UsageError(
            String::from("add needs a time spec followed by a command"),
            format!("got {} token(s)", tokens.len()),
        ));
    }

    let time_spec = tokens[..spec_len].join(" ");
    let mut task = String::new();
    for token in &tokens[spec_len..] {
        task.push_str(token);
        task.push(' ');
    }
    Ok((time_spec, task))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn relative_spec_without_interval() {
        let (spec, task) =
            split_add_tokens(&tokens(&["-r", "0-0-0-0-5", "/bin/echo", "hi"])).expect("split");
        assert_eq!(spec, "-r 0-0-0-0-5");
        assert_eq!(task, "/bin/echo hi ");
    }

    #[test]
    fn interval_flag_extends_the_spec() {
        let (spec, task) = split_add_tokens(&tokens(&[
            "-a",
            "01.01.2030-12:00:00",
            "-i",
            "0-0-0-1-0",
            "touch",
            "/tmp/x",
        ]))
        .expect("split");
        assert_eq!(spec, "-a 01.01.2030-12:00:00 -i 0-0-0-1-0");
        assert_eq!(task, "touch /tmp/x ");
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(split_add_tokens(&tokens(&["-r", "0-0-0-0-5"])).is_err());
        assert!(split_add_tokens(&tokens(&["-r", "0-0-0-0-5", "-i", "0-0-0-0-1"])).is_err());
        assert!(split_add_tokens(&[]).is_err());
    }

    #[test]
    fn verbs_parse() {
        let cli = Cli::try_parse_from(["client", "cancel", "3"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Cancel { id: 3 })));

        let cli = Cli::try_parse_from(["client", "display"]).expect("parse");
        assert!(matches!(cli.command, Some(Commands::Display)));

        let cli = Cli::try_parse_from(["client"]).expect("parse");
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["client", "bogus"]).is_err());
    }

    #[test]
    fn add_keeps_hyphen_tokens() {
        let cli = Cli::try_parse_from(["client", "add", "-r", "0-0-0-0-5", "/bin/echo", "hi"])
            .expect("parse");
        match cli.command {
            Some(Commands::Add { tokens }) => {
                assert_eq!(tokens, vec!["-r", "0-0-0-0-5", "/bin/echo", "hi"]);
            }
            other => panic!("expected Add, got {:?}", other),
        }
    }
}
