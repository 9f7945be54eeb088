//! Line-based, paged operation picker.
//!
//! Shown when no selections were given on the command line. Each page lists
//! up to `page_size` operations; the user toggles entries by number and
//! finishes with an empty line.
//!
//! | Input | Effect |
//! |---|---|
//! | `3`, `1,4`, `2-6` | toggle entries |
//! | `a` | toggle every entry |
//! | `n` / `p` | next / previous page |
//! | empty line | finish |
//! | `q` | cancel, nothing selected |

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

/// One parsed line of picker input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerCommand {
    /// Zero-based indices to toggle
    Toggle(Vec<usize>),
    All,
    Next,
    Previous,
    Done,
    Quit,
}

impl PickerCommand {
    /// Parse one line; entry numbers are one-based as displayed.
    pub fn parse(line: &str, total: usize) -> Result<Self, String> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(Self::Done),
            "a" | "all" => return Ok(Self::All),
            "n" | "next" => return Ok(Self::Next),
            "p" | "prev" => return Ok(Self::Previous),
            "q" | "quit" => return Ok(Self::Quit),
            _ => {}
        }
        let mut indices = Vec::new();
        for part in line.split([',', ' ']).map(str::trim).filter(|p| !p.is_empty()) {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (parse_number(a, total)?, parse_number(b, total)?),
                None => {
                    let n = parse_number(part, total)?;
                    (n, n)
                }
            };
            if start > end {
                return Err(format!("empty range '{part}'"));
            }
            indices.extend(start - 1..end);
        }
        Ok(Self::Toggle(indices))
    }
}

fn parse_number(raw: &str, total: usize) -> Result<usize, String> {
    let n: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if n == 0 || n > total {
        return Err(format!("{n} is out of range 1-{total}"));
    }
    Ok(n)
}

/// Paged multi-select over `items`.
pub struct Picker<'a> {
    items: &'a [String],
    page_size: usize,
    page: usize,
    chosen: BTreeSet<usize>,
}

impl<'a> Picker<'a> {
    pub fn new(items: &'a [String], page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            page: 0,
            chosen: BTreeSet::new(),
        }
    }

    fn pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        writeln!(out)?;
        for index in start..end {
            let mark = if self.chosen.contains(&index) { "x" } else { " " };
            writeln!(out, "  [{mark}] {:>3}. {}", index + 1, self.items[index])?;
        }
        writeln!(
            out,
            "Page {}/{} ({} selected). Numbers or ranges toggle, a: all, n/p: page, enter: done, q: quit",
            self.page + 1,
            self.pages(),
            self.chosen.len()
        )?;
        write!(out, "> ")?;
        out.flush()
    }

    /// Run until the user finishes, cancels or input ends.
    ///
    /// Returns the chosen indices in ascending order; empty when cancelled.
    pub fn run<R: BufRead, W: Write>(mut self, mut input: R, mut out: W) -> io::Result<Vec<usize>> {
        loop {
            self.render(&mut out)?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            match PickerCommand::parse(&line, self.items.len()) {
                Ok(PickerCommand::Done) => break,
                Ok(PickerCommand::Quit) => return Ok(Vec::new()),
                Ok(PickerCommand::Next) => self.page = (self.page + 1).min(self.pages() - 1),
                Ok(PickerCommand::Previous) => self.page = self.page.saturating_sub(1),
                Ok(PickerCommand::All) => {
                    if self.chosen.len() == self.items.len() {
                        self.chosen.clear();
                    } else {
                        self.chosen = (0..self.items.len()).collect();
                    }
                }
                Ok(PickerCommand::Toggle(indices)) => {
                    for index in indices {
                        if !self.chosen.remove(&index) {
                            self.chosen.insert(index);
                        }
                    }
                }
                Err(message) => writeln!(out, "  {message}")?,
            }
        }
        writeln!(out)?;
        Ok(self.chosen.into_iter().collect())
    }
}
