pub mod command;
pub mod parse;

use std::{
    error::Error,
    io::{self, stdout, Write},
    path::PathBuf,
    sync::mpsc,
    thread,
};

use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

use crate::{
    disk::{init::perform_disk_initialization, Geometry},
    fs::FileSystem,
    shell::{command::execute_command, parse::parse_command},
};

const IMAGE_PATH: &str = "disk.img";

/// Progress reports from the disk-initialization worker thread.
pub enum BootProgress {
    Step(&'static str),
    Progress(u64),
    Finished(Result<FileSystem, Box<dyn Error + Send>>),
}

pub fn start_shell() {
    boot_banner();

    let geometry = Geometry::default_geometry();
    let image = PathBuf::from(IMAGE_PATH);

    if !image.exists() {
        let create = dialoguer::Confirm::new()
            .with_prompt(format!(
                "No disk image at ./{} — create a fresh 5 MiB image?",
                IMAGE_PATH
            ))
            .default(true)
            .interact()
            .unwrap_or(false);
        if !create {
            println!("{}", "Nothing to mount, exiting.".yellow());
            return;
        }
    }

    let fs = match boot_filesystem(image, geometry) {
        Ok(fs) => fs,
        Err(e) => {
            println!("{} {}", "Boot failed:".red().bold(), e);
            return;
        }
    };

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| String::from("localhost"));
    let mut current_dir = String::from("/");

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );

    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".twofs_history");

    let mut line_editor = Reedline::create().with_history(Box::new(
        reedline::FileBackedHistory::with_file(100, history_path).unwrap(),
    ));

    let commands: Vec<String> = [
        "help", "ls", "pwd", "cd", "mkdir", "rmdir", "create", "rm", "read", "write", "stat",
        "df", "format", "exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let completer = reedline::DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    loop {
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!("{}@{}:{}", username, hostname, current_dir)),
            DefaultPromptSegment::Basic("TwoFS".to_string()),
        );

        let input = line_editor.read_line(&prompt);

        match input {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &fs, &mut current_dir) {
                            println!("{} {}", "Error:".red().bold(), e);
                        }
                        if matches!(cmd, command::Command::Exit) {
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "Unknown command. Type 'help' for the command list.".yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting TwoFS...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_yellow());
}

/// Runs disk initialization on a worker thread and renders its progress.
fn boot_filesystem(
    image: PathBuf,
    geometry: Geometry,
) -> Result<FileSystem, Box<dyn Error + Send>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || perform_disk_initialization(tx, image, geometry));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    for progress in rx {
        match progress {
            BootProgress::Step(step) => pb.set_message(step),
            BootProgress::Progress(p) => pb.set_position(p),
            BootProgress::Finished(result) => {
                match &result {
                    Ok(_) => pb.finish_with_message("Ready!"),
                    Err(_) => pb.abandon_with_message("Boot failed"),
                }
                return result;
            }
        }
    }

    // The worker hung up without sending Finished.
    Err(Box::new(io::Error::new(
        io::ErrorKind::Other,
        "disk initialization ended unexpectedly",
    )))
}

fn boot_banner() {
    let mut stdout = stdout();

    execute!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0)).unwrap();
    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("Welcome to TwoFS — a two-level filesystem on a flat disk image\n"),
        ResetColor
    )
    .unwrap();
}
