//! Interactive four-option menu.
//!
//! The menu only collects parameters. Each completed choice is handed to a
//! dispatch callback; a failing action is reported and the menu is shown
//! again. End of input behaves like choosing exit.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::HarvestOverrides;

/// A menu choice with its collected parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Harvest {
        overrides: HarvestOverrides,
        out_dir: PathBuf,
    },
    ExtractLabels {
        ids: PathBuf,
        dump: PathBuf,
        output: PathBuf,
    },
    Match {
        records: PathBuf,
        labels: PathBuf,
        output: PathBuf,
    },
}

const OPTIONS: &str = "\nChoose an option:\n\
                       1. Harvest affiliations from Crossref\n\
                       2. Extract registry labels\n\
                       3. Match affiliations to registry labels\n\
                       4. Exit\n";

/// Prompt-driven front end over a reader and a writer.
pub struct Menu<R, W> {
    input: R,
    output: W,
    exhausted: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            exhausted: false,
        }
    }

    /// Runs until exit is chosen or input ends.
    ///
    /// # Errors
    ///
    /// Only I/O errors on the prompt streams end the loop early.
    pub fn run<F>(&mut self, mut dispatch: F) -> io::Result<()>
    where
        F: FnMut(MenuAction) -> anyhow::Result<()>,
    {
        loop {
            self.output.write_all(OPTIONS.as_bytes())?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                return Ok(());
            };
            let action = match choice.as_str() {
                "1" => self.collect_harvest()?,
                "2" => self.collect_extract()?,
                "3" => self.collect_match()?,
                "4" => return Ok(()),
                _ => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    continue;
                }
            };
            let Some(action) = action else {
                return Ok(());
            };
            if let Err(error) = dispatch(action) {
                writeln!(self.output, "error: {error:#}")?;
            }
        }
    }

    fn collect_harvest(&mut self) -> io::Result<Option<MenuAction>> {
        let overrides = HarvestOverrides {
            endpoint: self.optional("Enter the endpoint URL (leave empty for default): ")?,
            filter: self.optional("Enter the filter (leave empty for default): ")?,
            mailto: self.optional("Enter the contact email (leave empty for default): ")?,
            rows: self.optional_number("Enter rows per page (leave empty for default): ")?,
            expected_total: self
                .optional_number("Enter the expected total (leave empty for default): ")?,
            delay_secs: None,
            start_cursor: None,
        };
        let out_dir = self
            .optional("Enter the output directory (leave empty for current directory): ")?
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        if self.exhausted {
            return Ok(None);
        }
        Ok(Some(MenuAction::Harvest { overrides, out_dir }))
    }

    fn collect_extract(&mut self) -> io::Result<Option<MenuAction>> {
        let Some(ids) = self.required("Enter the path to the ROR ID file: ")? else {
            return Ok(None);
        };
        let Some(dump) = self.required("Enter the path to the registry dump: ")? else {
            return Ok(None);
        };
        let Some(output) = self.required("Enter the path to the output file: ")? else {
            return Ok(None);
        };
        Ok(Some(MenuAction::ExtractLabels { ids, dump, output }))
    }

    fn collect_match(&mut self) -> io::Result<Option<MenuAction>> {
        let Some(records) = self.required("Enter the path to the harvested records: ")? else {
            return Ok(None);
        };
        let Some(labels) = self.required("Enter the path to the label table: ")? else {
            return Ok(None);
        };
        let Some(output) = self.required("Enter the path to save the matches: ")? else {
            return Ok(None);
        };
        Ok(Some(MenuAction::Match {
            records,
            labels,
            output,
        }))
    }

    /// Reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Blank answers mean "use the default".
    fn optional(&mut self, message: &str) -> io::Result<Option<String>> {
        Ok(self.prompt(message)?.filter(|answer| !answer.is_empty()))
    }

    fn optional_number<T: FromStr>(&mut self, message: &str) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.optional(message)? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "'{answer}' is not a number. Please try again.")?,
            }
        }
    }

    /// Re-prompts on blank answers. `None` at end of input.
    fn required(&mut self, message: &str) -> io::Result<Option<PathBuf>> {
        loop {
            match self.prompt(message)? {
                None => return Ok(None),
                Some(answer) if answer.is_empty() => {
                    writeln!(self.output, "A path is required.")?;
                }
                Some(answer) => return Ok(Some(PathBuf::from(answer))),
            }
        }
    }
}
