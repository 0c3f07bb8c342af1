use std::collections::VecDeque;

/// Chunking parameters. Sizes are measured in characters.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Tried in order; the empty separator splits into single characters.
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: ["\n\n", "\n", " ", ""].map(str::to_owned).to_vec(),
        }
    }
}

/// Recursive character splitter: prefers paragraph breaks, then lines, then
/// words, and only falls back to raw characters for unbroken runs.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(mut config: SplitterConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        config.chunk_overlap = config.chunk_overlap.min(config.chunk_size - 1);
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split text into trimmed, non-empty chunks of at most `chunk_size` characters.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let separators: Vec<&str> = self.config.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let size = self.config.chunk_size;
        let (separator, rest) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) <= size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if rest.is_empty() {
                // No finer separator left; emit as-is.
                if let Some(chunk) = trimmed(piece) {
                    chunks.push(chunk);
                }
            } else {
                chunks.extend(self.split_recursive(piece, rest));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, carrying up to `chunk_overlap`
    /// characters of trailing pieces into the next chunk.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + joiner + len > size && !window.is_empty() {
                if let Some(chunk) = join(&window, separator) {
                    chunks.push(chunk);
                }
                while let Some(front) = window.front() {
                    if total > overlap || (total + sep_len + len > size && total > 0) {
                        let removed = char_len(front) + if window.len() > 1 { sep_len } else { 0 };
                        total -= removed;
                        window.pop_front();
                    } else {
                        break;
                    }
                }
            }

            total += len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }

        if let Some(chunk) = join(&window, separator) {
            chunks.push(chunk);
        }
        chunks
    }
}

fn pick_separator<'a, 's>(text: &str, separators: &'s [&'a str]) -> (&'a str, &'s [&'a str]) {
    for (i, &sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_owned())
}

fn join(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    trimmed(&joined)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..SplitterConfig::default()
        })
    }

    #[test]
    fn empty_and_blank_text() {
        let s = TextSplitter::new(SplitterConfig::default());
        assert!(s.split("").is_empty());
        assert!(s.split("  \n\n \t").is_empty());
    }

    #[test]
    fn short_text_is_single_chunk() {
        let s = TextSplitter::new(SplitterConfig::default());
        assert_eq!(s.split("  Hello world.  "), vec!["Hello world.".to_owned()]);
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let text = "First paragraph here.\n\nSecond paragraph here.";
        let chunks = splitter(25, 0).split(text);
        assert_eq!(
            chunks,
            vec![
                "First paragraph here.".to_owned(),
                "Second paragraph here.".to_owned()
            ]
        );
    }

    #[test]
    fn falls_back_to_words() {
        let chunks = splitter(10, 0).split("alpha beta gamma delta");
        assert_eq!(chunks, vec!["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn overlap_carries_trailing_words() {
        let chunks = splitter(11, 5).split("one two three four");
        assert_eq!(chunks, vec!["one two", "two three", "three four"]);
    }

    #[test]
    fn unbroken_run_split_by_characters() {
        let chunks = splitter(4, 0).split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn multibyte_text_respects_char_boundaries() {
        let chunks = splitter(3, 0).split("ééééé");
        assert_eq!(chunks, vec!["ééé", "éé"]);
    }

    #[test]
    fn overlap_clamped_below_chunk_size() {
        let s = splitter(5, 50);
        assert_eq!(s.config().chunk_overlap, 4);
        assert!(!s.split("a b c d e f g h").is_empty());
    }

    proptest! {
        #[test]
        fn chunks_never_exceed_size(
            text in "[a-z \n]{0,400}",
            size in 1usize..60,
            overlap in 0usize..30,
        ) {
            let s = splitter(size, overlap);
            for chunk in s.split(&text) {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= size);
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
        }

        #[test]
        fn every_word_survives(words in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
            let text = words.join(" ");
            let chunks = splitter(20, 5).split(&text);
            let joined = chunks.join(" ");
            for w in &words {
                prop_assert!(joined.contains(w.as_str()));
            }
        }
    }
}
