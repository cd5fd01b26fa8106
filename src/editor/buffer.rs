use ropey::Rope;

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// In-progress text of the block being edited.
///
/// The cursor is a char index into the rope; line and column are derived
/// from it on demand. Nothing here touches the document: the owner decides
/// when (and whether) to commit [`text`](Self::text) back to the block.
#[derive(Clone, PartialEq, Eq)]
pub struct EditorBuffer {
    rope: Rope,
    cursor: usize,
    /// Column to aim for when moving vertically through short lines.
    goal_col: Option<usize>,
    dirty: bool,
}

impl EditorBuffer {
    /// Buffer holding `text` with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let cursor = rope.len_chars();
        Self {
            rope,
            cursor,
            goal_col: None,
            dirty: false,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Everything from the start of the buffer up to the cursor.
    pub fn text_before_cursor(&self) -> String {
        self.rope.slice(..self.cursor).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Cursor as a char index.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as zero-based (line, char column).
    pub fn position(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.cursor);
        (line, self.cursor - self.rope.line_to_char(line))
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line `idx` without its line break.
    pub fn line(&self, idx: usize) -> Option<String> {
        (idx < self.line_count()).then(|| {
            let line = self.rope.line(idx).to_string();
            line.trim_end_matches(['\n', '\r']).to_string()
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).filter_map(|idx| self.line(idx))
    }

    pub fn insert_char(&mut self, ch: char) {
        self.rope.insert_char(self.cursor, ch);
        self.cursor += 1;
        self.edited();
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.rope.insert(self.cursor, s);
        self.cursor += s.chars().count();
        self.edited();
    }

    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the char before the cursor. Returns false at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.rope.remove(self.cursor - 1..self.cursor);
        self.cursor -= 1;
        self.edited();
        true
    }

    /// Delete the char under the cursor. Returns false at the end.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(self.cursor..=self.cursor);
        self.edited();
        true
    }

    /// Replace the `len` chars before the cursor with `replacement`.
    ///
    /// `len` is clamped to the cursor position. The cursor ends up after the
    /// inserted text.
    pub fn replace_before_cursor(&mut self, len: usize, replacement: &str) {
        let start = self.cursor - len.min(self.cursor);
        self.rope.remove(start..self.cursor);
        self.cursor = start;
        self.rope.insert(self.cursor, replacement);
        self.cursor += replacement.chars().count();
        self.edited();
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.goal_col = None;
            }
            Direction::Right => {
                self.cursor = (self.cursor + 1).min(self.rope.len_chars());
                self.goal_col = None;
            }
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    pub fn move_home(&mut self) {
        let (line, _) = self.position();
        self.cursor = self.rope.line_to_char(line);
        self.goal_col = None;
    }

    pub fn move_end(&mut self) {
        let (line, _) = self.position();
        self.cursor = self.rope.line_to_char(line) + self.line_width(line);
        self.goal_col = None;
    }

    fn move_vertical(&mut self, delta: isize) {
        let (line, col) = self.position();
        let Some(target) = line
            .checked_add_signed(delta)
            .filter(|t| *t < self.line_count())
        else {
            return;
        };
        let goal = *self.goal_col.get_or_insert(col);
        self.cursor = self.rope.line_to_char(target) + goal.min(self.line_width(target));
    }

    /// Chars on `line`, excluding its line break.
    fn line_width(&self, line: usize) -> usize {
        self.line(line).map_or(0, |l| l.chars().count())
    }

    const fn edited(&mut self) {
        self.dirty = true;
        self.goal_col = None;
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .finish()
    }
}
