use unicode_segmentation::UnicodeSegmentation;

pub const SAMPLE_TEXT: &str = "\
Rapid serial visual presentation shows a text one word at a time, always in \
the same place on the screen. Your eyes stop travelling along the line and the \
words come to them instead.

Ordinary reading is a series of small jumps called saccades, with the brain \
taking in a few letters between each jump. With every word appearing at a \
fixed spot those jumps mostly disappear, and attention can go to meaning \
instead of steering the eyes.

Most readers of this kind mark one letter in each word, a little left of the \
middle. This optimal recognition point gives the eye a steady anchor, which \
keeps recognition quick even when the pace goes up.

Speed is counted in words per minute. Two or three hundred is a comfortable \
start; with practice many people go much faster. Dense material still reads \
better slowly, so pause, step back a word, or change the rate whenever you \
like.

Hold or tap the space bar, let the words flow, and stop the moment you need \
to. Älä huoli: ä, ö and å work just as well as plain letters.";

/// Text buffer behind the editing screen. Input always goes at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    text: String,
}

impl Editor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn insert(&mut self, c: char) {
        self.text.push(c);
    }

    /// Append pasted text, normalising Windows line endings.
    pub fn paste(&mut self, text: &str) {
        self.text.push_str(&text.replace("\r\n", "\n").replace('\r', "\n"));
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }

    /// Remove the last user-perceived character.
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text.grapheme_indices(true).next_back() {
            self.text.truncate(idx);
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn load_sample(&mut self) {
        self.text = SAMPLE_TEXT.to_string();
    }
}
