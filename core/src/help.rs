//! Help text rendering.
//!
//! Text is collected word by word and wrapped at a fixed width. Sections are
//! headed by an upper-case title with their content indented by two columns.

use crate::config::{ParserConfig, ProgramInfo};
use crate::error::HelpError;
use crate::option::OptionSet;

const SECTION_INDENT: usize = 2;

/// Word-wrapping text accumulator.
///
/// Words are separated by single spaces and moved to a new line when they
/// would cross `width`. Every line is prefixed with the current indent.
#[derive(Debug)]
pub(crate) struct TextCollector {
    width: usize,
    indent: usize,
    text: String,
    line: Option<String>,
}

impl TextCollector {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            width,
            indent: 0,
            text: String::new(),
            line: None,
        }
    }

    pub(crate) fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    fn available(&self) -> usize {
        self.width.saturating_sub(self.indent)
    }

    /// Adds the words of `text` to the current line.
    pub(crate) fn append(&mut self, text: &str) -> Result<(), HelpError> {
        for word in text.split(' ').filter(|w| !w.is_empty()) {
            // Widths count characters, not bytes.
            let available = self.available();
            let word_len = word.chars().count();
            if let Some(line) = self.line.as_mut() {
                if line.chars().count() + word_len < available {
                    line.push(' ');
                    line.push_str(word);
                    continue;
                }
                self.flush();
            }
            if word_len > available {
                return Err(HelpError::WordTooWide {
                    word: word.to_string(),
                    width: available,
                });
            }
            self.line = Some(word.to_string());
        }
        Ok(())
    }

    /// Adds `text` and ends the line. With no pending text this emits an
    /// empty line.
    pub(crate) fn append_line(&mut self, text: &str) -> Result<(), HelpError> {
        self.append(text)?;
        if self.line.is_some() {
            self.flush();
        } else {
            self.text.push('\n');
        }
        Ok(())
    }

    pub(crate) fn blank_line(&mut self) {
        self.text.push('\n');
    }

    fn flush(&mut self) {
        if let Some(line) = self.line.take() {
            self.text.push_str(&" ".repeat(self.indent));
            self.text.push_str(&line);
            self.text.push('\n');
        }
    }

    pub(crate) fn finish(mut self) -> String {
        self.flush();
        self.text
    }
}

/// Title, version and optional description.
fn banner(out: &mut TextCollector, program: &ProgramInfo) -> Result<(), HelpError> {
    out.append_line(&format!("{} - {}", program.title, program.version))?;
    out.blank_line();
    if let Some(description) = program.description.as_deref().filter(|d| !d.is_empty()) {
        section(out, "DESCRIPTION", |out| out.append_line(description))?;
        out.blank_line();
    }
    Ok(())
}

fn section(
    out: &mut TextCollector,
    title: &str,
    body: impl FnOnce(&mut TextCollector) -> Result<(), HelpError>,
) -> Result<(), HelpError> {
    out.append_line(title)?;
    out.set_indent(SECTION_INDENT);
    let result = body(out);
    out.set_indent(0);
    result
}

/// Help for one option set: SYNTAX followed by OPTIONS.
///
/// `verb` is shown after the executable name when the set was selected by
/// a verb.
pub(crate) fn option_set_help(
    config: &ParserConfig,
    set: &OptionSet,
    verb: Option<&str>,
    width: usize,
) -> Result<String, HelpError> {
    let marker = config.option_char;
    let mut out = TextCollector::new(width);
    banner(&mut out, &config.program)?;

    section(&mut out, "SYNTAX", |out| {
        out.append(&config.program.executable)?;
        if let Some(verb) = verb {
            out.append(verb)?;
        }
        for descriptor in set.descriptors() {
            out.append(&descriptor.usage(marker))?;
        }
        out.append_line("")
    })?;
    out.blank_line();

    section(&mut out, "OPTIONS", |out| {
        for descriptor in set.descriptors() {
            out.append_line(&descriptor.usage(marker))?;
            out.set_indent(SECTION_INDENT * 2);
            if let Some(description) = descriptor.describe().filter(|d| !d.is_empty()) {
                out.append_line(description)?;
            }
            if let Some(default) = descriptor.default() {
                out.append_line(&format!("default: '{default}'"))?;
            }
            out.set_indent(SECTION_INDENT);
            out.blank_line();
        }
        Ok(())
    })?;

    Ok(out.finish())
}

/// Overview of a multi-verb parser: SYNTAX and the list of VERBS.
pub(crate) fn overview_help<'a>(
    config: &ParserConfig,
    verbs: impl Iterator<Item = (&'a str, &'a OptionSet)>,
    width: usize,
) -> Result<String, HelpError> {
    let mut out = TextCollector::new(width);
    banner(&mut out, &config.program)?;

    section(&mut out, "SYNTAX", |out| {
        out.append_line(&format!(
            "{} <verb> <options>",
            config.program.executable
        ))
    })?;
    out.blank_line();

    section(&mut out, "VERBS", |out| {
        for (verb, set) in verbs {
            out.append(verb)?;
            match set.description().filter(|d| !d.is_empty()) {
                Some(description) => out.append_line(&format!("- {description}"))?,
                None => out.append_line("")?,
            }
        }
        Ok(())
    })?;

    Ok(out.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_wraps_at_width() {
        let mut out = TextCollector::new(12);
        out.append_line("one two three four").unwrap();
        assert_eq!(out.finish(), "one two\nthree four\n");
    }

    #[test]
    fn test_collector_indents_every_line() {
        let mut out = TextCollector::new(10);
        out.set_indent(2);
        out.append("alpha beta").unwrap();
        out.append("gamma").unwrap();
        assert_eq!(out.finish(), "  alpha\n  beta\n  gamma\n");
    }

    #[test]
    fn test_collector_empty_append_line_is_blank() {
        let mut out = TextCollector::new(20);
        out.append_line("").unwrap();
        out.append("x").unwrap();
        out.append_line("").unwrap();
        assert_eq!(out.finish(), "\nx\n");
    }

    #[test]
    fn test_collector_rejects_word_wider_than_width() {
        let mut out = TextCollector::new(8);
        out.set_indent(2);
        let err = out.append("enormous").unwrap_err();
        assert_eq!(
            err,
            HelpError::WordTooWide {
                word: "enormous".to_string(),
                width: 6,
            }
        );
    }

    #[test]
    fn test_collector_measures_characters_not_bytes() {
        let mut out = TextCollector::new(18);
        out.set_indent(4);
        out.append_line("Größenänderung für Überschriften").unwrap();
        assert_eq!(out.finish(), "    Größenänderung\n    für\n    Überschriften\n");

        let mut out = TextCollector::new(8);
        out.append_line("äöü äöü").unwrap();
        assert_eq!(out.finish(), "äöü äöü\n");
    }
}
