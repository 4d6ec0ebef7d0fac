use chrono::NaiveDateTime;

pub const NAME_PROMPT: &str = "[ENTER YOUR NAME]: ";
pub const INVALID_NAME: &str = "Invalid name, connection closing...";
pub const SERVER_FULL: &str = "Max connections reached, try again later.";

const RENAME_PREFIX: &str = "/name ";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line read from an admitted client.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Rename(&'a str),
    Chat(&'a str),
    /// `/name ` with nothing after it: neither a rename nor a chat line.
    Ignored,
}

impl<'a> Command<'a> {
    /// Returns `None` for an empty line.
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.is_empty() {
            return None;
        }

        match line.strip_prefix(RENAME_PREFIX) {
            Some(rest) => {
                let name = rest.trim();
                if name.is_empty() {
                    Some(Command::Ignored)
                } else {
                    Some(Command::Rename(name))
                }
            }
            None => Some(Command::Chat(line)),
        }
    }
}

/// Renders `[<timestamp>][<sender>]: <body>`.
pub fn format_chat(at: NaiveDateTime, sender: &str, body: &str) -> String {
    format!("[{}][{}]: {}", at.format(TIMESTAMP_FORMAT), sender, body)
}

pub fn joined(name: &str) -> String {
    format!("{} has joined our chat...", name)
}

pub fn left(name: &str) -> String {
    format!("{} has left our chat...", name)
}

pub fn renamed(old: &str, new: &str) -> String {
    format!("{} changed their name to {}", old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_line_is_skipped() {
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn rename_argument_is_trimmed() {
        assert_eq!(Command::parse("/name   carol  "), Some(Command::Rename("carol")));
    }

    #[test]
    fn blank_rename_is_ignored() {
        assert_eq!(Command::parse("/name    "), Some(Command::Ignored));
    }

    #[test]
    fn rename_needs_the_trailing_space() {
        assert_eq!(Command::parse("/name"), Some(Command::Chat("/name")));
        assert_eq!(Command::parse("/namecarol"), Some(Command::Chat("/namecarol")));
    }

    #[test]
    fn chat_line_is_kept_verbatim() {
        assert_eq!(Command::parse("  hi there "), Some(Command::Chat("  hi there ")));
    }

    #[test]
    fn chat_format_matches_wire() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();

        assert_eq!(
            format_chat(at, "alice", "hello"),
            "[2024-03-09 07:05:01][alice]: hello"
        );
    }

    #[test]
    fn notices() {
        assert_eq!(joined("bob"), "bob has joined our chat...");
        assert_eq!(left("carol"), "carol has left our chat...");
        assert_eq!(renamed("bob", "carol"), "bob changed their name to carol");
    }
}
