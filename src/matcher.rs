use std::collections::HashMap;

/// A `source -> target` pair eligible for partial replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub target: String,
}

/// Greedy longest-match-first replacer.
///
/// Candidates are kept sorted by source length, longest first, ties in
/// insertion order. Each first character indexes the candidates starting with
/// it, in that same order, so a scan step only looks at sources that could
/// match.
///
/// Two candidates that both match at one position are prefixes of each other,
/// so the tie order never changes the output. Cost per position is the size of
/// the first-character bucket.
#[derive(Clone, Debug, Default)]
pub struct SubstringMatcher {
    candidates: Vec<Candidate>,
    by_first_char: HashMap<char, Vec<usize>>,
}

impl SubstringMatcher {
    /// Builds the matcher. Empty sources are dropped; self-mappings are kept
    /// if the caller passes them in.
    pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| !c.source.is_empty())
            .collect();
        // Stable sort: equal lengths keep insertion order.
        candidates.sort_by(|a, b| b.source.len().cmp(&a.source.len()));

        let mut by_first_char: HashMap<char, Vec<usize>> = HashMap::new();
        for (idx, cand) in candidates.iter().enumerate() {
            if let Some(first) = cand.source.chars().next() {
                by_first_char.entry(first).or_default().push(idx);
            }
        }
        Self {
            candidates,
            by_first_char,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidates in match order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Longest candidate whose source is a prefix of `rest`.
    fn longest_at(&self, rest: &str, first: char) -> Option<&Candidate> {
        self.by_first_char
            .get(&first)?
            .iter()
            .map(|&idx| &self.candidates[idx])
            .find(|c| rest.starts_with(c.source.as_str()))
    }

    /// One left-to-right pass over `input`.
    ///
    /// At each position the longest matching source is replaced and skipped
    /// over; otherwise one character is copied. Returns `None` when nothing
    /// was replaced.
    #[must_use]
    pub fn replace(&self, input: &str) -> Option<String> {
        if self.candidates.is_empty() || input.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(input.len());
        let mut pos = 0usize;
        let mut replaced = false;
        while let Some(ch) = input[pos..].chars().next() {
            let rest = &input[pos..];
            match self.longest_at(rest, ch) {
                Some(cand) => {
                    out.push_str(&cand.target);
                    pos += cand.source.len();
                    replaced = true;
                }
                None => {
                    out.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }
        replaced.then_some(out)
    }
}
