//! Sentence segmentation for fine-grained inference.

pub const DEFAULT_SENTENCE_TERMINATORS: &[char] = &['.'];

#[derive(Debug, Clone)]
pub struct TextSegmenter {
    terminators: Vec<char>,
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_SENTENCE_TERMINATORS.to_vec())
    }
}

impl TextSegmenter {
    /// Creates a segmenter splitting on the given characters.
    /// An empty set falls back to the default terminators.
    pub fn new(terminators: Vec<char>) -> Self {
        let terminators = if terminators.is_empty() {
            DEFAULT_SENTENCE_TERMINATORS.to_vec()
        } else {
            terminators
        };
        Self { terminators }
    }

    pub fn terminators(&self) -> &[char] {
        &self.terminators
    }

    /// Splits already-stripped text into trimmed, non-empty sentences.
    ///
    /// Never returns an empty sequence: when nothing survives the split the
    /// original text is returned as the only element.
    pub fn split(&self, text: &str) -> Vec<String> {
        let sentences: Vec<String> = text
            .split(|c: char| self.terminators.contains(&c))
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(str::to_string)
            .collect();

        if sentences.is_empty() {
            vec![text.trim().to_string()]
        } else {
            sentences
        }
    }
}
