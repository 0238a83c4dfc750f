/// Terminal shell: command parsing and button grid rendering
use crate::error::{AppError, Result};
use soundboard_playback::{ButtonStyle, PlaybackState, SoundId};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// A button, addressed by its grid number (1-based) or its sound id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Name(String),
}

impl Target {
    /// Resolve against the button order, `None` when out of range
    ///
    /// Names are passed through unchecked; the tracker reports unknown ids.
    pub fn resolve(&self, ids: &[SoundId]) -> Option<SoundId> {
        match self {
            Target::Index(n) => n.checked_sub(1).and_then(|i| ids.get(i)).cloned(),
            Target::Name(name) => Some(name.clone()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Index(n) => write!(f, "{}", n),
            Target::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for Target {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(AppError::InvalidArgument("missing sound".to_string()));
        }
        Ok(match s.parse::<usize>() {
            Ok(n) => Target::Index(n),
            Err(_) => Target::Name(s.to_string()),
        })
    }
}

/// One line typed into the shell
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Toggle(Target),
    Stop(Target),
    StopAll,
    Volume(Target, f32),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    /// The target is the rest of the line, so names may contain spaces
    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::List);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match (verb.to_ascii_lowercase().as_str(), rest) {
            ("list" | "ls", "") => Ok(Command::List),
            ("help" | "?", "") => Ok(Command::Help),
            ("quit" | "exit" | "q", "") => Ok(Command::Quit),
            ("stop", "all") => Ok(Command::StopAll),
            ("stop", target) if !target.is_empty() => Ok(Command::Stop(target.parse()?)),
            ("toggle" | "t", target) if !target.is_empty() => {
                Ok(Command::Toggle(target.parse()?))
            }
            ("vol" | "volume", args) => {
                // Level is the last word, everything before it names the sound
                let Some((target, level)) = args.rsplit_once(char::is_whitespace) else {
                    return Err(AppError::InvalidArgument(
                        "usage: vol <n|name> <0-1>".to_string(),
                    ));
                };
                let level: f32 = level.parse().map_err(|_| {
                    AppError::InvalidArgument(format!("volume '{}' is not a number", level))
                })?;
                if !(0.0..=1.0).contains(&level) {
                    return Err(AppError::InvalidArgument(format!(
                        "volume {} is outside 0.0-1.0",
                        level
                    )));
                }
                Ok(Command::Volume(target.trim_end().parse()?, level))
            }
            // A bare button number is a click
            (word, "") if word.parse::<usize>().is_ok() => Ok(Command::Toggle(word.parse()?)),
            _ => Err(AppError::UnknownCommand(line.to_string())),
        }
    }
}

pub const HELP: &str = "\
Commands:
  list                 show the buttons
  toggle <n|name>      start, pause or resume a sound (a bare number works too)
  stop <n|name>        stop a sound
  stop all             stop every sound
  vol <n|name> <0-1>   set a sound's volume
  help                 show this help
  quit                 stop everything and exit";

/// What a button shows
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub id: SoundId,
    pub state: PlaybackState,
    pub volume: f32,
}

impl ButtonView {
    fn label(&self, number: usize) -> String {
        let name = match ButtonStyle::from(self.state) {
            ButtonStyle::Highlighted => format!("*{}*", self.id),
            ButtonStyle::Default => self.id.clone(),
        };
        let paused = if self.state == PlaybackState::Paused {
            " (paused)"
        } else {
            ""
        };
        format!(
            "{:>2}. {}{} {:>3}%",
            number,
            name,
            paused,
            (self.volume * 100.0).round() as u32
        )
    }
}

/// Render buttons row by row, `columns` per row
pub fn render_grid(buttons: &[ButtonView], columns: usize) -> String {
    if buttons.is_empty() {
        return "(no sounds)".to_string();
    }

    let columns = columns.max(1);
    let labels: Vec<String> = buttons
        .iter()
        .enumerate()
        .map(|(i, button)| button.label(i + 1))
        .collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for row in labels.chunks(columns) {
        let line = row
            .iter()
            .map(|label| format!("[{:<width$}]", label, width = width))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "{}", line);
    }
    out.truncate(out.trim_end().len());
    out
}
