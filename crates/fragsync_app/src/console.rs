use fragsync_core::charts::MonthSelection;

/// One line typed into the console driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Set { control: String, value: String },
    Page { href: String },
    Clear,
    ShowAll,
    Show,
    Charts {
        year: Option<String>,
        month: Option<MonthSelection>,
    },
    Theme { value: String },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl ConsoleCommand {
    /// Parses a console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word {
            "" => return Ok(None),
            "set" => {
                // An empty value clears the control.
                let (control, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if control.is_empty() {
                    return Err(CommandError::Usage("set <control> [value]"));
                }
                ConsoleCommand::Set {
                    control: control.to_string(),
                    value: value.trim_start().to_string(),
                }
            }
            "page" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("page <href>"));
                }
                ConsoleCommand::Page {
                    href: rest.to_string(),
                }
            }
            "clear" => ConsoleCommand::Clear,
            "show-all" => ConsoleCommand::ShowAll,
            "show" => ConsoleCommand::Show,
            "charts" => parse_charts(rest)?,
            "theme" => match rest {
                "light" | "dark" => ConsoleCommand::Theme {
                    value: rest.to_string(),
                },
                _ => return Err(CommandError::Usage("theme light|dark")),
            },
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

const CHARTS_USAGE: &str = "charts [year [all|MM]]";

fn parse_charts(rest: &str) -> Result<ConsoleCommand, CommandError> {
    let mut words = rest.split_whitespace();
    let year = match words.next() {
        Some(year) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => {
            Some(year.to_string())
        }
        Some(_) => return Err(CommandError::Usage(CHARTS_USAGE)),
        None => None,
    };
    let month = match words.next() {
        Some(month) => Some(MonthSelection::parse(month).ok_or(CommandError::Usage(CHARTS_USAGE))?),
        None => None,
    };
    if words.next().is_some() {
        return Err(CommandError::Usage(CHARTS_USAGE));
    }
    Ok(ConsoleCommand::Charts { year, month })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use fragsync_core::charts::MonthSelection;

    use super::{CommandError, ConsoleCommand};

    #[test]
    fn set_keeps_spaces_inside_the_value() {
        assert_eq!(
            ConsoleCommand::parse("set searchInput  brown bread ").unwrap(),
            Some(ConsoleCommand::Set {
                control: "searchInput".to_string(),
                value: "brown bread".to_string(),
            })
        );
        assert_eq!(
            ConsoleCommand::parse("set categoryFilter").unwrap(),
            Some(ConsoleCommand::Set {
                control: "categoryFilter".to_string(),
                value: String::new(),
            })
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(
            ConsoleCommand::parse("page ?page=3").unwrap(),
            Some(ConsoleCommand::Page {
                href: "?page=3".to_string()
            })
        );
        assert_eq!(ConsoleCommand::parse("show-all").unwrap(), Some(ConsoleCommand::ShowAll));
        assert_eq!(ConsoleCommand::parse("  ").unwrap(), None);
        assert_eq!(ConsoleCommand::parse("quit").unwrap(), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(
            ConsoleCommand::parse("jump"),
            Err(CommandError::Unknown("jump".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("page"),
            Err(CommandError::Usage("page <href>"))
        );
    }

    #[test]
    fn charts_take_optional_year_and_month() {
        assert_eq!(
            ConsoleCommand::parse("charts").unwrap(),
            Some(ConsoleCommand::Charts {
                year: None,
                month: None
            })
        );
        assert_eq!(
            ConsoleCommand::parse("charts 2024 03").unwrap(),
            Some(ConsoleCommand::Charts {
                year: Some("2024".to_string()),
                month: Some(MonthSelection::Month(3))
            })
        );
        assert_eq!(
            ConsoleCommand::parse("charts 2024 all").unwrap(),
            Some(ConsoleCommand::Charts {
                year: Some("2024".to_string()),
                month: Some(MonthSelection::All)
            })
        );
        assert_eq!(
            ConsoleCommand::parse("charts 2024 13"),
            Err(CommandError::Usage("charts [year [all|MM]]"))
        );
        assert_eq!(
            ConsoleCommand::parse("charts may"),
            Err(CommandError::Usage("charts [year [all|MM]]"))
        );
    }

    #[test]
    fn theme_accepts_light_or_dark() {
        assert_eq!(
            ConsoleCommand::parse("theme dark").unwrap(),
            Some(ConsoleCommand::Theme {
                value: "dark".to_string()
            })
        );
        assert_eq!(
            ConsoleCommand::parse("theme blue"),
            Err(CommandError::Usage("theme light|dark"))
        );
    }
}
