use std::path::PathBuf;

/// One line typed into the terminal chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    History,
    /// `/upload` with no path yields `None`.
    Upload(Option<PathBuf>),
    Ask(String),
}

impl Command {
    /// Slash commands are matched on their first word only, so `/uploads x`
    /// is a question rather than an upload of `s x`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "/quit" => Command::Quit,
            "/history" => Command::History,
            "/upload" if rest.is_empty() => Command::Upload(None),
            "/upload" => Command::Upload(Some(PathBuf::from(rest))),
            _ => Command::Ask(line.to_string()),
        }
    }
}
