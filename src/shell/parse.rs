use crate::shell::command::Command;

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "ls" => Some(Command::Ls(args.first().map(|&p| p.to_string()))),
        "pwd" => Some(Command::Pwd),
        "cd" => args.first().map(|&name| Command::Cd(name.to_string())),
        "mkdir" => args.first().map(|&name| Command::Mkdir(name.to_string())),
        "rmdir" => args.first().map(|&name| Command::Rmdir(name.to_string())),
        "create" => args.first().map(|&name| Command::Create(name.to_string())),
        "rm" => args.first().map(|&name| Command::Rm(name.to_string())),
        "read" => args.first().map(|&name| Command::Read(name.to_string())),
        "write" => {
            if args.len() >= 2 {
                Some(Command::Write(args.first()?.to_string(), args[1..].join(" ")))
            } else {
                None
            }
        }
        "stat" => args.first().map(|&name| Command::Stat(name.to_string())),
        "df" => Some(Command::Df),
        "format" => Some(Command::Format),
        "exit" => Some(Command::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arguments_and_rejects_incomplete_commands() {
        assert!(matches!(parse_command("ls"), Some(Command::Ls(None))));
        assert!(matches!(
            parse_command("mkdir docs"),
            Some(Command::Mkdir(_))
        ));
        assert!(parse_command("mkdir").is_none());
        assert!(parse_command("write a.txt").is_none());

        match parse_command("write a.txt hello block world") {
            Some(Command::Write(name, content)) => {
                assert_eq!(name, "a.txt");
                assert_eq!(content, "hello block world");
            }
            other => panic!("unexpected parse: {:?}", other),
        }

        assert!(parse_command("").is_none());
        assert!(parse_command("bogus").is_none());
    }
}
