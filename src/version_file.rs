//! Reading, patching and writing back `version.ver` files.
//!
//! A version file is a short run of `#define NAME VALUE` lines. Six names are
//! understood: the build date and time are refreshed on every run, the build
//! and revision counters are bumped when asked to, and everything else is
//! passed through byte for byte.

use crate::config::EngineConfig;
use crate::error::{IoStep, Result, StampError};
use crate::stamp::BuildStamp;
use crate::{log_info, log_warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Largest version file, in bytes, that is read or written.
pub const MAX_FILE_SIZE: usize = 1000;

const DEFINE_KEYWORD: &str = "#define";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Major,
    Minor,
    Build,
    Revision,
    BuildDate,
    BuildTime,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::Major,
        Symbol::Minor,
        Symbol::Build,
        Symbol::Revision,
        Symbol::BuildDate,
        Symbol::BuildTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Major => "VERSION_MAJOR",
            Symbol::Minor => "VERSION_MINOR",
            Symbol::Build => "VERSION_BUILD",
            Symbol::Revision => "VERSION_REVISION",
            Symbol::BuildDate => "VERSION_BUILD_DATE",
            Symbol::BuildTime => "VERSION_BUILD_TIME",
        }
    }

    pub fn from_name(name: &str) -> Option<Symbol> {
        Symbol::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Body written when the version file is missing or empty: 1.0.0.0 built now.
pub fn default_body(stamp: &BuildStamp) -> String {
    let values = [
        (Symbol::Major, "1"),
        (Symbol::Minor, "0"),
        (Symbol::Build, "0"),
        (Symbol::Revision, "0"),
        (Symbol::BuildDate, stamp.date.as_str()),
        (Symbol::BuildTime, stamp.time.as_str()),
    ];

    values
        .iter()
        .map(|(symbol, value)| format!("{} {}\t{}\n", DEFINE_KEYWORD, symbol.name(), value))
        .collect()
}

/// One `#define NAME VALUE` found by [`DefineScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineSpan {
    /// One-based line number.
    pub line: usize,
    pub name: String,
    pub value: String,
    /// Byte range of the value token in the scanned text.
    pub value_range: Range<usize>,
}

/// Cursor over version file text that yields `#define` lines in order and
/// replaces value tokens in place.
///
/// After a define is yielded the cursor sits just past its value. A
/// [`replace`](DefineScanner::replace) moves it to just past the inserted
/// text, so offsets are always taken from the current text, never cached.
pub struct DefineScanner {
    text: String,
    cursor: usize,
    line: usize,
    in_define: bool,
}

impl DefineScanner {
    pub fn new(text: String) -> Self {
        Self {
            text,
            cursor: 0,
            line: 1,
            in_define: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Yields the next `#define` line, or `None` at end of text. A malformed
    /// define ends the scan with an error.
    pub fn next_define(&mut self) -> Option<Result<DefineSpan>> {
        if self.in_define {
            self.skip_line();
            self.in_define = false;
        }

        while self.cursor < self.text.len() {
            let start = self.cursor;
            let end = self.line_end(start);

            match parse_define(&self.text[start..end], start, self.line) {
                None => self.skip_line(),
                Some(Ok(span)) => {
                    self.cursor = span.value_range.end;
                    self.in_define = true;
                    return Some(Ok(span));
                }
                Some(Err(e)) => {
                    self.cursor = self.text.len();
                    return Some(Err(e));
                }
            }
        }

        None
    }

    /// Replaces `range` with `with` and returns the new cursor, just past the
    /// inserted text. The range must lie on character boundaries of the
    /// current text.
    pub fn replace(&mut self, range: Range<usize>, with: &str) -> Result<usize> {
        if range.start > range.end || self.text.get(range.clone()).is_none() {
            return Err(StampError::parse(
                self.line,
                format!(
                    "replacement range {}..{} is outside the text ({} bytes)",
                    range.start,
                    range.end,
                    self.text.len()
                ),
            ));
        }

        let new_len = self.text.len() - range.len() + with.len();
        if new_len > MAX_FILE_SIZE {
            return Err(StampError::CapacityExceeded {
                len: new_len,
                max: MAX_FILE_SIZE,
            });
        }

        self.cursor = range.start + with.len();
        self.text.replace_range(range, with);
        Ok(self.cursor)
    }

    fn line_end(&self, from: usize) -> usize {
        self.text[from..]
            .find('\n')
            .map_or(self.text.len(), |i| from + i)
    }

    fn skip_line(&mut self) {
        let end = self.line_end(self.cursor);
        self.cursor = (end + 1).min(self.text.len());
        self.line += 1;
    }
}

/// `None` when the line is not a define at all.
fn parse_define(line_text: &str, offset: usize, line: usize) -> Option<Result<DefineSpan>> {
    let rest = line_text.trim_start().strip_prefix(DEFINE_KEYWORD)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let tokens = tokens(rest);
    let [(_, name), (value_start, value)] = tokens[..] else {
        return Some(Err(StampError::parse(
            line,
            format!("expected a name and a value, found {} token(s)", tokens.len()),
        )));
    };

    let base = offset + (line_text.len() - rest.len());
    let value_start = base + value_start;
    Some(Ok(DefineSpan {
        line,
        name: name.to_string(),
        value: value.to_string(),
        value_range: value_start..value_start + value.len(),
    }))
}

/// Whitespace separated tokens with their byte offsets.
fn tokens(s: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;

    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(st)) => {
                out.push((st, &s[st..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(st) = start {
        out.push((st, &s[st..]));
    }

    out
}

/// Numeric reading of a counter value. Surrounding quotes are dropped, then
/// an optional sign and the leading decimal digits are taken; no digits
/// reads as zero.
pub fn parse_counter(value: &str, line: usize) -> Result<i64> {
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    let sign_len = usize::from(unquoted.starts_with(['+', '-']));
    let digits_len = unquoted[sign_len..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return Ok(0);
    }

    unquoted[..sign_len + digits_len]
        .parse()
        .map_err(|_| StampError::parse(line, format!("counter '{}' is out of range", value)))
}

fn bumped(span: &DefineSpan) -> Result<String> {
    let current = parse_counter(&span.value, span.line)?;
    let next = current
        .checked_add(1)
        .ok_or_else(|| StampError::parse(span.line, format!("counter '{}' is out of range", span.value)))?;
    Ok(next.to_string())
}

/// Applies one run's substitutions to `raw`.
pub fn patch(raw: String, config: &EngineConfig, stamp: &BuildStamp) -> Result<String> {
    if raw.len() > MAX_FILE_SIZE {
        return Err(StampError::CapacityExceeded {
            len: raw.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let mut scanner = DefineScanner::new(raw);
    while let Some(span) = scanner.next_define() {
        let span = span?;

        let replacement = match Symbol::from_name(&span.name) {
            Some(Symbol::BuildDate) => Some(stamp.date.clone()),
            Some(Symbol::BuildTime) => Some(stamp.time.clone()),
            Some(Symbol::Build) if config.increment_build => Some(bumped(&span)?),
            Some(Symbol::Revision) if config.increment_revision => Some(bumped(&span)?),
            _ => None,
        };

        if let Some(new_value) = replacement {
            log_info!("{}: {} -> {}", span.name, span.value, new_value);
            scanner.replace(span.value_range.clone(), &new_value)?;
        }
    }

    Ok(scanner.into_text())
}

/// Open handle on a version file. Closed when dropped.
pub struct VersionFile {
    file: File,
    path: PathBuf,
}

impl VersionFile {
    /// Opens for read and write, creating the file if needed. Existing
    /// content is never truncated here.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StampError::io(IoStep::Open, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. An empty file yields [`default_body`].
    pub fn load(&mut self, stamp: &BuildStamp) -> Result<String> {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| StampError::io(IoStep::Read, e))?;

        let mut bytes = Vec::with_capacity(MAX_FILE_SIZE + 1);
        Read::by_ref(&mut self.file)
            .take(MAX_FILE_SIZE as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| StampError::io(IoStep::Read, e))?;

        if bytes.is_empty() {
            log_info!("{} is empty, using the default body", self.path.display());
            return Ok(default_body(stamp));
        }

        if bytes.len() > MAX_FILE_SIZE {
            let len = self
                .file
                .metadata()
                .map(|m| m.len() as usize)
                .unwrap_or(bytes.len());
            return Err(StampError::CapacityExceeded {
                len,
                max: MAX_FILE_SIZE,
            });
        }

        String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            StampError::parse(line, "not valid UTF-8")
        })
    }

    /// Writes `text` over the file from offset 0 and drops whatever old
    /// content lies past its end.
    pub fn persist(&mut self, text: &str) -> Result<()> {
        if text.len() > MAX_FILE_SIZE {
            return Err(StampError::CapacityExceeded {
                len: text.len(),
                max: MAX_FILE_SIZE,
            });
        }

        let write_err = |e| StampError::io(IoStep::Write, e);
        self.file.seek(SeekFrom::Start(0)).map_err(write_err)?;
        self.file.write_all(text.as_bytes()).map_err(write_err)?;
        self.file.set_len(text.len() as u64).map_err(write_err)?;
        self.file.flush().map_err(write_err)?;
        Ok(())
    }
}

/// Load, patch, echo and persist, in that order. Nothing is written unless
/// every earlier step succeeded.
pub fn run<W: Write>(config: &EngineConfig, stamp: &BuildStamp, out: &mut W) -> Result<String> {
    log_info!("Opening {}", config.path.display());
    let mut file = VersionFile::open(&config.path)?;

    let raw = file.load(stamp)?;
    log_info!("Loaded {} bytes", raw.len());

    let patched = patch(raw, config, stamp)?;

    if config.simulate || config.verbose {
        let echo_err = |e| StampError::io(IoStep::Echo, e);
        out.write_all(patched.as_bytes()).map_err(echo_err)?;
        out.flush().map_err(echo_err)?;
    }

    if config.simulate {
        log_warn!("Simulate mode, {} left untouched", file.path().display());
    } else {
        file.persist(&patched)?;
        log_info!("Wrote {} bytes to {}", patched.len(), file.path().display());
    }

    Ok(patched)
}
