//! Parsing of shell input lines.

use fittrack_client::Route;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        email: String,
        password: String,
        confirm: String,
        full_name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,
    List,
    Show {
        id: String,
    },
    Add {
        title: String,
        description: String,
    },
    Edit {
        id: String,
        title: String,
        /// `None` keeps the stored description.
        description: Option<String>,
    },
    Remove {
        id: String,
    },
    Route,
    Go(Route),
    Back,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command: {0}. Type `help` for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown destination: {0}. Try home, workouts, settings, login or register.")]
    UnknownRoute(String),
}

pub const HELP: &str = "\
Commands:
  register <email> <password> <confirm> <full name>
  login <email> <password>
  logout
  whoami
  list
  show <id>
  add <title> [| description]
  edit <id> <title> [| description]
  rm <id>
  route
  go <home|workouts|settings|login|register>
  back
  help
  quit";

impl Command {
    /// Parse a non-empty input line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Result<Command, ParseError>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        Some(Self::parse_verb(&verb.to_lowercase(), rest))
    }

    fn parse_verb(verb: &str, rest: &str) -> Result<Command, ParseError> {
        let mut args = rest.split_whitespace();
        let command = match verb {
            "register" => {
                let usage = ParseError::Usage("register <email> <password> <confirm> <full name>");
                let email = args.next().ok_or(usage.clone())?;
                let password = args.next().ok_or(usage.clone())?;
                let confirm = args.next().ok_or(usage)?;
                Command::Register {
                    email: email.to_string(),
                    password: password.to_string(),
                    confirm: confirm.to_string(),
                    full_name: args.collect::<Vec<_>>().join(" "),
                }
            }
            "login" => {
                let usage = ParseError::Usage("login <email> <password>");
                let email = args.next().ok_or(usage.clone())?;
                let password = args.next().ok_or(usage)?;
                Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                }
            }
            "logout" => Command::Logout,
            "whoami" => Command::Whoami,
            "list" | "ls" => Command::List,
            "show" => Command::Show {
                id: required_id(rest, "show <id>")?,
            },
            "add" => {
                let (title, description) = split_description(rest);
                if title.is_empty() {
                    return Err(ParseError::Usage("add <title> [| description]"));
                }
                Command::Add {
                    title,
                    description: description.unwrap_or_default(),
                }
            }
            "edit" => {
                let usage = ParseError::Usage("edit <id> <title> [| description]");
                let (id, rest) = rest.split_once(char::is_whitespace).ok_or(usage.clone())?;
                let (title, description) = split_description(rest);
                if title.is_empty() {
                    return Err(usage);
                }
                Command::Edit {
                    id: id.to_string(),
                    title,
                    description,
                }
            }
            "rm" | "delete" => Command::Remove {
                id: required_id(rest, "rm <id>")?,
            },
            "route" => Command::Route,
            "go" => Command::Go(parse_route(rest)?),
            "back" => Command::Back,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required_id(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    match rest.split_whitespace().next() {
        Some(id) => Ok(id.to_string()),
        None => Err(ParseError::Usage(usage)),
    }
}

/// Split `title | description` on the first bar.
fn split_description(rest: &str) -> (String, Option<String>) {
    match rest.split_once('|') {
        Some((title, description)) => (title.trim().to_string(), Some(description.trim().to_string())),
        None => (rest.trim().to_string(), None),
    }
}

fn parse_route(name: &str) -> Result<Route, ParseError> {
    match name.trim().to_lowercase().as_str() {
        "home" => Ok(Route::Home),
        "workouts" | "tasks" => Ok(Route::Workouts),
        "settings" => Ok(Route::Settings),
        "login" => Ok(Route::Login),
        "register" => Ok(Route::Register),
        "" => Err(ParseError::Usage("go <home|workouts|settings|login|register>")),
        other => Err(ParseError::UnknownRoute(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn parse(line: &str) -> Result<Command, ParseError> {
        Command::parse(line).expect("line is not blank")
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(Command::parse("   ").is_none());
    }

    #[test]
    fn register_joins_the_full_name() {
        assert_eq!(
            parse("register a@x.com secret1 secret1 Sam  Lifter"),
            Ok(Command::Register {
                email: "a@x.com".into(),
                password: "secret1".into(),
                confirm: "secret1".into(),
                full_name: "Sam Lifter".into(),
            })
        );
    }

    #[test]
    fn register_without_name_leaves_it_for_the_form_to_reject() {
        assert_matches!(
            parse("register a@x.com secret1 secret1"),
            Ok(Command::Register { full_name, .. }) if full_name.is_empty()
        );
    }

    #[test]
    fn login_needs_both_arguments() {
        assert_matches!(parse("login a@x.com"), Err(ParseError::Usage(_)));
    }

    #[test]
    fn add_splits_title_and_description() {
        assert_eq!(
            parse("add Leg Day | squats and lunges"),
            Ok(Command::Add {
                title: "Leg Day".into(),
                description: "squats and lunges".into(),
            })
        );
        assert_eq!(
            parse("add Rest"),
            Ok(Command::Add {
                title: "Rest".into(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn edit_without_bar_keeps_the_description() {
        assert_eq!(
            parse("edit abc Leg Day v2"),
            Ok(Command::Edit {
                id: "abc".into(),
                title: "Leg Day v2".into(),
                description: None,
            })
        );
        assert_matches!(
            parse("edit abc Leg Day v2 | 5x5"),
            Ok(Command::Edit { description: Some(d), .. }) if d == "5x5"
        );
    }

    #[test]
    fn go_resolves_routes() {
        assert_eq!(parse("go Workouts"), Ok(Command::Go(Route::Workouts)));
        assert_matches!(parse("go nowhere"), Err(ParseError::UnknownRoute(_)));
    }

    #[test]
    fn verbs_are_case_insensitive_and_aliased() {
        assert_eq!(parse("QUIT"), Ok(Command::Quit));
        assert_eq!(parse("rm abc"), parse("delete abc"));
        assert_matches!(parse("dance"), Err(ParseError::Unknown(v)) if v == "dance");
    }
}
