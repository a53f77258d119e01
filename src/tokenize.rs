/// Split raw text into word tokens for presentation.
///
/// Whitespace runs of any kind (spaces, tabs, newlines, other Unicode
/// whitespace) act as a single separator and leading/trailing whitespace is
/// dropped. Punctuation stays attached to its word: `"Hei, maailma!"` becomes
/// `["Hei,", "maailma!"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}
