//! Text and cursor of the line being edited
//!
//! Positions are counted in characters. Mutating operations return the
//! first character offset they changed, or `None` if the buffer was left
//! as it was, so the caller knows how much of the line to redraw.

use core::ops::Range;

/// Default word delimiters, every printable ASCII character that is not
/// alphanumeric
pub const DEFAULT_DELIMITERS: &str = " !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Characters separating words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters(String);

impl Default for Delimiters {
    fn default() -> Self {
        Self(DEFAULT_DELIMITERS.to_string())
    }
}

impl Delimiters {
    pub fn new(delimiters: impl Into<String>) -> Self {
        Self(delimiters.into())
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(c)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaseChange {
    Upper,
    Lower,
    /// Uppercase the first character only
    Capitalize,
}

pub struct LineBuffer {
    buf: String,
    cursor: usize,
    capacity: Option<usize>,
}

impl LineBuffer {
    /// Create an empty buffer holding at most `capacity` characters
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            buf: String::new(),
            cursor: 0,
            capacity,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as a byte offset into [`LineBuffer::as_str`]
    pub fn cursor_byte(&self) -> usize {
        self.byte_position(self.cursor)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn chars(&self) -> Vec<char> {
        self.buf.chars().collect()
    }

    pub(crate) fn byte_position(&self, char_index: usize) -> usize {
        self.buf
            .char_indices()
            .nth(char_index)
            .map(|(pos, _)| pos)
            .unwrap_or(self.buf.len())
    }

    pub(crate) fn char_index(&self, byte_position: usize) -> usize {
        self.buf
            .char_indices()
            .take_while(|&(pos, _)| pos < byte_position)
            .count()
    }

    fn room(&self, chars: usize) -> bool {
        match self.capacity {
            Some(capacity) => self.len() + chars <= capacity,
            None => true,
        }
    }

    /// Move the cursor, clamped to the end of the text
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.len());
    }

    /// Replace the whole text and put the cursor at its end
    ///
    /// Text beyond the capacity is dropped.
    pub fn set_text(&mut self, text: &str) {
        self.buf = match self.capacity {
            Some(capacity) => text.chars().take(capacity).collect(),
            None => text.to_string(),
        };
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Insert at the cursor and advance past it. Returns the character
    /// if the buffer is full.
    pub fn insert_char(&mut self, c: char) -> Result<usize, char> {
        if !self.room(1) {
            return Err(c);
        }

        let at = self.cursor;
        let pos = self.byte_position(at);

        self.buf.insert(pos, c);
        self.cursor += 1;

        Ok(at)
    }

    /// Insert all of `s` at the cursor, or nothing if it does not fit
    pub fn insert_str(&mut self, s: &str) -> Result<Option<usize>, ()> {
        let count = s.chars().count();

        if !self.room(count) {
            return Err(());
        }

        if count == 0 {
            return Ok(None);
        }

        let at = self.cursor;
        let pos = self.byte_position(at);

        self.buf.insert_str(pos, s);
        self.cursor += count;

        Ok(Some(at))
    }

    /// Remove a character range and return the removed text. The
    /// cursor keeps its place relative to the remaining text.
    pub fn delete_range(&mut self, range: Range<usize>) -> String {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let bytes = self.byte_position(start)..self.byte_position(end);
        let removed = self.buf.drain(bytes).collect();

        if self.cursor >= end {
            self.cursor -= end - start;
        } else if self.cursor > start {
            self.cursor = start;
        }

        removed
    }

    /// Delete the character under the cursor
    pub fn delete(&mut self) -> Option<usize> {
        let at = self.cursor;

        (at < self.len()).then(|| {
            self.delete_range(at..at + 1);
            at
        })
    }

    /// Delete the character left of the cursor
    pub fn backspace(&mut self) -> Option<usize> {
        let at = self.cursor.checked_sub(1)?;

        self.delete_range(at..at + 1);

        Some(at)
    }

    /// Replace a byte range, leaving the cursor after the new text
    ///
    /// Fails without touching the buffer if the result would not fit.
    pub fn splice(&mut self, bytes: Range<usize>, text: &str) -> Result<Option<usize>, ()> {
        let end = bytes.end.min(self.buf.len());
        let start = bytes.start.min(end);

        if !self.buf.is_char_boundary(start) || !self.buf.is_char_boundary(end) {
            return Err(());
        }

        let removed = self.buf[start..end].chars().count();
        let added = text.chars().count();

        if added > removed && !self.room(added - removed) {
            return Err(());
        }

        if &self.buf[start..end] == text {
            self.cursor = self.char_index(start) + added;
            return Ok(None);
        }

        let at = self.char_index(start);

        self.buf.replace_range(start..end, text);
        self.cursor = at + added;

        Ok(Some(at))
    }

    /// Start of the word left of `pos`
    pub fn word_left(&self, pos: usize, delimiters: &Delimiters) -> usize {
        let chars = self.chars();
        let mut pos = pos.min(chars.len());

        while pos > 0 && delimiters.contains(chars[pos - 1]) {
            pos -= 1;
        }

        while pos > 0 && !delimiters.contains(chars[pos - 1]) {
            pos -= 1;
        }

        pos
    }

    /// End of the word right of `pos`
    pub fn word_right(&self, pos: usize, delimiters: &Delimiters) -> usize {
        let chars = self.chars();
        let mut pos = pos.min(chars.len());

        while pos < chars.len() && delimiters.contains(chars[pos]) {
            pos += 1;
        }

        while pos < chars.len() && !delimiters.contains(chars[pos]) {
            pos += 1;
        }

        pos
    }

    /// Start of the whitespace separated token left of the cursor,
    /// skipping trailing delimiters first
    pub fn space_left(&self, delimiters: &Delimiters) -> usize {
        let chars = self.chars();
        let mut pos = self.cursor;

        while pos > 0 && delimiters.contains(chars[pos - 1]) {
            pos -= 1;
        }

        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }

        pos
    }

    /// Change the case from the cursor to the end of the current or
    /// following word, and move the cursor to that end
    ///
    /// Characters with multi-character mappings expand (`ß` becomes `SS`)
    /// unless the longer word would overflow the capacity, in which case
    /// each character keeps the first character of its mapping.
    pub fn change_case(&mut self, change: CaseChange, delimiters: &Delimiters) -> Option<usize> {
        let chars = self.chars();
        let mut pos = self.cursor;

        while pos < chars.len() && delimiters.contains(chars[pos]) {
            pos += 1;
        }

        let start = pos;

        while pos < chars.len() && !delimiters.contains(chars[pos]) {
            pos += 1;
        }

        let word = &chars[start..pos];
        let mut mapped = map_case(word, change, false);

        if mapped.len() > word.len() && !self.room(mapped.len() - word.len()) {
            mapped = map_case(word, change, true);
        }

        self.cursor = start + mapped.len();

        if mapped == word {
            return None;
        }

        let begin = self.byte_position(start);
        let end = self.byte_position(pos);
        let text: String = mapped.into_iter().collect();
        self.buf.replace_range(begin..end, &text);

        Some(start)
    }

    /// Remove the spaces directly around the cursor
    pub fn trim_spaces(&mut self) -> Option<usize> {
        let chars = self.chars();

        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }

        let mut end = self.cursor;
        while end < chars.len() && chars[end] == ' ' {
            end += 1;
        }

        (start < end).then(|| {
            self.delete_range(start..end);
            start
        })
    }

    /// Swap the character under the cursor with the one before it and
    /// step forward. At the end of a word the last two characters are
    /// swapped instead. Delimiters are never moved.
    pub fn transpose(&mut self, delimiters: &Delimiters) -> Option<usize> {
        let mut chars = self.chars();
        let pos = self.cursor;
        let word = |c: char| !delimiters.contains(c);

        let at = if pos > 0 && pos < chars.len() && word(chars[pos]) && word(chars[pos - 1]) {
            chars.swap(pos - 1, pos);
            self.cursor = pos + 1;
            pos - 1
        } else if pos > 1 && word(chars[pos - 1]) && word(chars[pos - 2]) {
            chars.swap(pos - 2, pos - 1);
            pos - 2
        } else {
            return None;
        };

        self.buf = chars.into_iter().collect();

        Some(at)
    }
}

fn map_case(word: &[char], change: CaseChange, single: bool) -> Vec<char> {
    let mut mapped = Vec::with_capacity(word.len());

    for (i, &c) in word.iter().enumerate() {
        let full: Vec<char> = match change {
            CaseChange::Upper => c.to_uppercase().collect(),
            CaseChange::Lower => c.to_lowercase().collect(),
            CaseChange::Capitalize if i == 0 => c.to_uppercase().collect(),
            CaseChange::Capitalize => vec![c],
        };

        if single {
            mapped.push(full.first().copied().unwrap_or(c));
        } else {
            mapped.extend(full);
        }
    }

    mapped
}
