use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

use crate::fs::FileSystem;

#[derive(Debug)]
pub enum Command {
    Help,
    Ls(Option<String>),
    Pwd,
    Cd(String),
    Mkdir(String),
    Rmdir(String),
    Create(String),
    Rm(String),
    Read(String),
    Write(String, String),
    Stat(String),
    Df,
    Format,
    Exit,
}

pub fn execute_command(
    cmd: &Command,
    fs: &FileSystem,
    current_dir: &mut String,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Ls(path) => {
            let target = match path {
                Some(p) => abs_path(current_dir, p),
                None => current_dir.clone(),
            };
            let entries = fs.list_directory(&target)?;
            if entries.is_empty() {
                println!("{}", "(empty)".bright_black());
            }
            let icon = if target == "/" { "📁" } else { "📄" };
            for entry in entries {
                println!("{}  {}", icon, entry);
            }
        }
        Command::Pwd => println!("{}", current_dir.cyan()),
        Command::Cd(path) => {
            let target = if path == ".." || path == "/" {
                "/".to_string()
            } else {
                abs_path(current_dir, path)
            };
            if target != "/" && !fs.get_attributes(&target)?.is_directory {
                return Err(format!("not a directory: {}", target).into());
            }
            *current_dir = target;
            println!("{} {}", "Moved to".bright_black(), current_dir.blue());
        }
        Command::Mkdir(name) => {
            let target = abs_path(current_dir, name);
            fs.create_directory(&target)?;
            println!("{} {}", "Created directory:".green(), target);
        }
        Command::Rmdir(name) => {
            let target = abs_path(current_dir, name);
            fs.remove_directory(&target)?;
            println!(
                "{}",
                "Directory removal is not supported by this filesystem; nothing was changed."
                    .yellow()
            );
        }
        Command::Create(name) => {
            let target = abs_path(current_dir, name);
            fs.create_file(&target)?;
            println!("{} {}", "Created file:".green(), target);
        }
        Command::Rm(name) => {
            let target = abs_path(current_dir, name);
            fs.remove_file(&target)?;
            println!(
                "{}",
                "File removal is not supported by this filesystem; nothing was changed.".yellow()
            );
        }
        Command::Read(name) => {
            let target = abs_path(current_dir, name);
            let attrs = fs.get_attributes(&target)?;
            let data = fs.read_file(&target, 0, attrs.size as usize)?;
            println!("{}", String::from_utf8_lossy(&data));
        }
        Command::Write(name, content) => {
            let target = abs_path(current_dir, name);
            let written = fs.write_file(&target, 0, content.as_bytes())?;
            println!("{} {} bytes", "Wrote".green(), written);
        }
        Command::Stat(name) => {
            let target = abs_path(current_dir, name);
            let attrs = fs.get_attributes(&target)?;
            println!(
                "{}\n{}: {}\n{}: {}\n{}: {} bytes",
                "File Info".bright_yellow().bold(),
                "Path".blue(),
                target,
                "Type".blue(),
                if attrs.is_directory { "Directory" } else { "File" },
                "Size".blue(),
                attrs.size
            );
        }
        Command::Df => {
            let free = fs.free_blocks()?;
            let total = fs.geometry().block_count() - 1;
            println!(
                "{} {} / {} blocks free",
                "Space:".bright_yellow(),
                free,
                total
            );
        }
        Command::Format => {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt("Formatting wipes every directory and file. Continue?")
                .default(false)
                .interact()
                .unwrap_or(false);
            if !confirmed {
                println!("{}", "Format cancelled.".yellow());
                return Ok(());
            }

            println!("Formatting disk image...");
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.green/black}] {pos:>3}% {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_position(10);
            fs.format()?;
            pb.set_position(100);
            pb.finish_with_message("Disk formatted.");
            *current_dir = String::from("/");
        }
        Command::Exit => println!("{}", "Exiting TwoFS shell...".yellow().bold()),
    }

    Ok(())
}

/// Joins a possibly-relative name onto the current directory.
fn abs_path(current_dir: &str, name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else if current_dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", current_dir, name)
    }
}

fn print_help() {
    println!("{}", "TwoFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  ls [path]          List the root or a directory
  pwd                Print current path
  cd <dir>           Change directory (two levels only)
  mkdir <dir>        Create a directory under the root
  rmdir <dir>        Remove directory (unsupported, no-op)
  create <file.ext>  Create an empty file (extension required)
  rm <file.ext>      Remove file (unsupported, no-op)
  read <file.ext>    Print file content
  write <file.ext> <text>  Write text at the start of the file
  stat <path>        Show attributes
  df                 Show free blocks
  format             Re-create the disk image
  help               Show this help message
  exit               Quit the shell
"
        .bright_black()
    );
}
