//! Blank-line-delimited stanza scanning shared by the dpkg and apt databases.
//!
//! Both files are sequences of `Field: value` stanzas separated by blank lines.
//! [`Stanzas`] turns a line iterator into a lazy sequence of completed
//! [`Stanza`]s using a two-state machine: between stanzas, or accumulating one.

use log::trace;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::mem;

/// One stanza: field name to field value. Names are case-sensitive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stanza {
    fields: BTreeMap<String, String>,
}

impl Stanza {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Set a field. A repeated field name replaces the earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Extend a multi-line value with one more line, kept verbatim.
    fn append_line(&mut self, name: &str, line: &str) {
        if let Some(value) = self.fields.get_mut(name) {
            value.push('\n');
            value.push_str(line);
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Stanza {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut stanza = Stanza::new();
        for (k, v) in iter {
            stanza.insert(k, v);
        }
        stanza
    }
}

/// What to do with lines that start with whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Append to the previous field's value (dpkg status).
    Append,
    /// Drop them (apt extended_states only carries flat pairs).
    Ignore,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Continuation(&'a str),
    Field { name: &'a str, value: &'a str },
    Malformed,
}

/// Classify a line that has already had trailing whitespace removed.
fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with([' ', '\t']) {
        return Line::Continuation(line);
    }
    match line.split_once(':') {
        Some((name, value)) => Line::Field {
            name: name.trim(),
            value: value.trim(),
        },
        None => Line::Malformed,
    }
}

enum State {
    Between,
    Accumulating { stanza: Stanza, last_field: String },
}

/// Iterator over the stanzas of a line source.
///
/// Malformed lines are dropped. A read error is yielded once and ends the
/// sequence; whatever was accumulated at that point is discarded.
pub struct Stanzas<I> {
    lines: I,
    continuation: Continuation,
    state: State,
    done: bool,
}

impl<B: BufRead> Stanzas<io::Lines<B>> {
    pub fn from_reader(reader: B, continuation: Continuation) -> Self {
        Self::new(reader.lines(), continuation)
    }
}

impl<I> Stanzas<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, continuation: Continuation) -> Self {
        Self {
            lines,
            continuation,
            state: State::Between,
            done: false,
        }
    }

    fn take_pending(&mut self) -> Option<Stanza> {
        match mem::replace(&mut self.state, State::Between) {
            State::Accumulating { stanza, .. } => Some(stanza),
            State::Between => None,
        }
    }

    fn feed(&mut self, line: &str) -> Option<Stanza> {
        match classify(line) {
            Line::Blank => return self.take_pending(),
            Line::Continuation(text) => match (&mut self.state, self.continuation) {
                (State::Accumulating { stanza, last_field }, Continuation::Append) => {
                    stanza.append_line(last_field, text);
                }
                (State::Between, Continuation::Append) => {
                    trace!("Dropping continuation line with no preceding field");
                }
                (_, Continuation::Ignore) => {}
            },
            Line::Field { name, value } => match &mut self.state {
                State::Accumulating { stanza, last_field } => {
                    stanza.insert(name, value);
                    *last_field = name.to_string();
                }
                State::Between => {
                    let mut stanza = Stanza::new();
                    stanza.insert(name, value);
                    self.state = State::Accumulating {
                        stanza,
                        last_field: name.to_string(),
                    };
                }
            },
            Line::Malformed => trace!("Dropping line without a field separator: {:?}", line),
        }
        None
    }
}

impl<I> Iterator for Stanzas<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<Stanza>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                Some(Ok(raw)) => {
                    if let Some(stanza) = self.feed(raw.trim_end()) {
                        return Some(Ok(stanza));
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    self.state = State::Between;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return self.take_pending().map(Ok);
                }
            }
        }
    }
}

impl<I> std::iter::FusedIterator for Stanzas<I> where I: Iterator<Item = io::Result<String>> {}
