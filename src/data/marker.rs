// ============================================================
// Layer 4 — Entity Marker
// ============================================================
// Turns a raw relation instance into encoder-ready ids with the
// head and tail mentions wrapped in reserved marker tokens.
//
// Example (head blanked):
//   raw:    ["Bill", "Gates", "founded", "Microsoft", "."]
//   head:   [0, 2)    tail: [3, 4)
//
//   1. Splice placeholder patterns in place of the mentions
//        "* h * founded ^ t ^ ."
//   2. WordPiece the text and both mentions separately
//   3. Replace the patterns with marker-wrapped mention pieces
//        [CLS] [unused0] [unused4] [unused1] founded
//              [unused2] microsoft [unused3] . [SEP]
//   4. Find the markers: h = (1, 3), t = (5, 7)
//
// Marker tokens (one vocabulary entry each, never produced by
// tokenising ordinary text):
//   [unused0] / [unused1]  head open / close
//   [unused2] / [unused3]  tail open / close
//   [unused4] / [unused5]  head / tail blank
//
// Corpus spans are not always well-formed. A marker pair that
// can't be found falls back to (0, 2) and bumps the failure
// counter; `mark` never fails because of the spans.
//
// Reference: Soares et al. (2019) Matching the Blanks
//            Peng et al. (2020) Learning from Context or Names?

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::span::EntitySpan;
use crate::domain::traits::{SubwordTokenizer, UNK_TOKEN};

pub const HEAD_OPEN:  &str = "[unused0]";
pub const HEAD_CLOSE: &str = "[unused1]";
pub const TAIL_OPEN:  &str = "[unused2]";
pub const TAIL_CLOSE: &str = "[unused3]";
pub const HEAD_BLANK: &str = "[unused4]";
pub const TAIL_BLANK: &str = "[unused5]";
pub const CLS_TOKEN:  &str = "[CLS]";
pub const SEP_TOKEN:  &str = "[SEP]";

/// Vocabulary entries the marker cannot work without
pub const RESERVED_TOKENS: [&str; 9] = [
    HEAD_OPEN, HEAD_CLOSE, TAIL_OPEN, TAIL_CLOSE,
    HEAD_BLANK, TAIL_BLANK, CLS_TOKEN, SEP_TOKEN, UNK_TOKEN,
];

/// Placeholder spliced in for the head mention before WordPiece
const HEAD_PATTERN: [&str; 3] = ["*", "h", "*"];
/// Placeholder spliced in for the tail mention before WordPiece
const TAIL_PATTERN: [&str; 3] = ["^", "t", "^"];

/// (start, end) reported for a marker pair that isn't in the output
pub const FALLBACK_POSITIONS: (usize, usize) = (0, 2);

// ─── Rendering ────────────────────────────────────────────────────────────────
/// How the two mentions are written between their markers.
///
/// - neither type nor blank: the lower-cased mention's word pieces
/// - both types present:     the type strings, verbatim
/// - blank:                  the entity's blank token, whatever else is set
///
/// A single type on its own is ignored; type mode is all-or-nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rendering<'a> {
    pub head_type:  Option<&'a str>,
    pub tail_type:  Option<&'a str>,
    pub head_blank: bool,
    pub tail_blank: bool,
}

impl<'a> Rendering<'a> {
    /// Keep both mentions as text
    pub fn mentions() -> Self {
        Self::default()
    }

    /// Replace both mentions by their type labels
    pub fn types(head_type: &'a str, tail_type: &'a str) -> Self {
        Self {
            head_type: Some(head_type),
            tail_type: Some(tail_type),
            ..Self::default()
        }
    }

    pub fn with_blanks(mut self, head_blank: bool, tail_blank: bool) -> Self {
        self.head_blank = head_blank;
        self.tail_blank = tail_blank;
        self
    }

    fn type_pair(&self) -> Option<(&'a str, &'a str)> {
        match (self.head_type, self.tail_type) {
            (Some(h), Some(t)) => Some((h, t)),
            _ => None,
        }
    }
}

// ─── MarkedSentence ───────────────────────────────────────────────────────────
/// Output of [`EntityMarker::mark`]. All positions index into
/// `input_ids`; `tokens[i]` is the string `input_ids[i]` encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedSentence {
    pub tokens:    Vec<String>,
    pub input_ids: Vec<u32>,
    pub h_start:   usize,
    pub h_end:     usize,
    pub t_start:   usize,
    pub t_end:     usize,
}

// ─── EntityMarker ─────────────────────────────────────────────────────────────
/// Wraps a subword tokenizer and marks entity pairs with it.
///
/// Holds no per-call state. The only thing that changes across
/// calls is the failure counter, which is atomic, so one marker
/// can be shared by worker threads.
pub struct EntityMarker<T> {
    tokenizer:    T,
    head_pattern: [&'static str; 3],
    tail_pattern: [&'static str; 3],
    failures:     AtomicUsize,
}

impl<T: SubwordTokenizer> EntityMarker<T> {
    /// Bind a tokenizer. Fails if its vocabulary is missing any
    /// of [`RESERVED_TOKENS`].
    pub fn new(tokenizer: T) -> Result<Self> {
        let missing: Vec<&str> = RESERVED_TOKENS
            .iter()
            .copied()
            .filter(|t| tokenizer.vocab_id(t).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "Tokenizer vocabulary is missing marker tokens: {}",
                missing.join(", ")
            );
        }

        Ok(Self {
            tokenizer,
            head_pattern: HEAD_PATTERN,
            tail_pattern: TAIL_PATTERN,
            failures:     AtomicUsize::new(0),
        })
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Number of marker pairs that could not be located so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Mark `head` and `tail` in `raw_tokens` and encode the result.
    ///
    /// Malformed spans (empty, overlapping, out of range) never
    /// produce an error: the affected pair is reported at
    /// [`FALLBACK_POSITIONS`] and the failure counter grows by one
    /// per unresolved pair. Only a tokenizer failure is returned as `Err`.
    pub fn mark<S: AsRef<str>>(
        &self,
        raw_tokens: &[S],
        head:       EntitySpan,
        tail:       EntitySpan,
        rendering:  &Rendering<'_>,
    ) -> Result<MarkedSentence> {
        // ── Step 1: Swap the mentions for placeholder patterns ────────────────
        let lowered: Vec<String> = raw_tokens.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut text: Vec<&str>  = Vec::with_capacity(lowered.len() + 6);
        let mut head_mention     = Vec::new();
        let mut tail_mention     = Vec::new();

        for (i, token) in lowered.iter().enumerate() {
            if head.contains(i) {
                if i == head.start {
                    text.extend_from_slice(&self.head_pattern);
                }
                head_mention.push(token.as_str());
            } else if tail.contains(i) {
                if i == tail.start {
                    text.extend_from_slice(&self.tail_pattern);
                }
                tail_mention.push(token.as_str());
            } else {
                text.push(token.as_str());
            }
        }

        // ── Step 2: Word-piece the sentence and both mentions ─────────────────
        let pieces        = self.tokenizer.tokenize(&text.join(" "))?;
        let mut head_text = self.tokenizer.tokenize(&head_mention.join(" "))?;
        let mut tail_text = self.tokenizer.tokenize(&tail_mention.join(" "))?;

        // ── Step 3: Type labels replace the mentions when both are given ──────
        if let Some((head_type, tail_type)) = rendering.type_pair() {
            head_text = split_words(head_type);
            tail_text = split_words(tail_type);
        }

        // ── Step 4: Patterns → marker-wrapped mentions ────────────────────────
        let head_slot = if rendering.head_blank { vec![HEAD_BLANK.to_string()] } else { head_text };
        let tail_slot = if rendering.tail_blank { vec![TAIL_BLANK.to_string()] } else { tail_text };

        let pieces = splice(pieces, &self.head_pattern, &bracket(HEAD_OPEN, head_slot, HEAD_CLOSE));
        let pieces = splice(pieces, &self.tail_pattern, &bracket(TAIL_OPEN, tail_slot, TAIL_CLOSE));

        // ── Step 5: [CLS] ... [SEP] ───────────────────────────────────────────
        let mut tokens = Vec::with_capacity(pieces.len() + 2);
        tokens.push(CLS_TOKEN.to_string());
        tokens.extend(pieces);
        tokens.push(SEP_TOKEN.to_string());

        // ── Step 6: Recover marker positions ──────────────────────────────────
        let (h_start, h_end) = self.locate(&tokens, HEAD_OPEN, HEAD_CLOSE);
        let (t_start, t_end) = self.locate(&tokens, TAIL_OPEN, TAIL_CLOSE);

        // ── Step 7: Encode ────────────────────────────────────────────────────
        let input_ids = self.tokenizer.convert_tokens_to_ids(&tokens);

        Ok(MarkedSentence { tokens, input_ids, h_start, h_end, t_start, t_end })
    }

    /// First positions of `open` and `close`, or the fallback pair
    fn locate(&self, tokens: &[String], open: &str, close: &str) -> (usize, usize) {
        match (position_of(tokens, open), position_of(tokens, close)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                FALLBACK_POSITIONS
            }
        }
    }
}

fn position_of(tokens: &[String], needle: &str) -> Option<usize> {
    tokens.iter().position(|t| t == needle)
}

fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn bracket(open: &str, inner: Vec<String>, close: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(inner.len() + 2);
    out.push(open.to_string());
    out.extend(inner);
    out.push(close.to_string());
    out
}

/// Replace every non-overlapping occurrence of `pattern` in
/// `tokens`, scanning left to right.
fn splice(tokens: Vec<String>, pattern: &[&str], replacement: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len() + replacement.len());
    let mut i   = 0usize;

    while i < tokens.len() {
        let window = &tokens[i..(i + pattern.len()).min(tokens.len())];
        if window.len() == pattern.len() && window.iter().zip(pattern).all(|(a, b)| a == b) {
            out.extend_from_slice(replacement);
            i += pattern.len();
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }

    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::wordpiece_from_tokens;
    use std::collections::HashMap;
    use tokenizers::Tokenizer;

    const VOCAB: [&str; 28] = [
        "[PAD]", "[unused0]", "[unused1]", "[unused2]", "[unused3]", "[unused4]",
        "[unused5]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "*", "^", ".", "h", "t",
        "bill", "gates", "founded", "microsoft", "steve", "jobs", "sold", "apple",
        "##s", "in", "hired", "person",
    ];

    fn marker() -> EntityMarker<Tokenizer> {
        EntityMarker::new(wordpiece_from_tokens(&VOCAB).unwrap()).unwrap()
    }

    fn id(token: &str) -> u32 {
        VOCAB.iter().position(|t| *t == token).unwrap() as u32
    }

    fn span(start: usize, end: usize) -> EntitySpan {
        EntitySpan::new(start, end)
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    const BILL: [&str; 5] = ["Bill", "Gates", "founded", "Microsoft", "."];

    #[test]
    fn test_blanked_head_example() {
        let m = marker();
        let out = m
            .mark(&BILL, span(0, 2), span(3, 4), &Rendering::mentions().with_blanks(true, false))
            .unwrap();

        assert_eq!(
            out.tokens,
            words("[CLS] [unused0] [unused4] [unused1] founded [unused2] microsoft [unused3] . [SEP]")
        );
        assert_eq!((out.h_start, out.h_end), (1, 3));
        assert_eq!((out.t_start, out.t_end), (5, 7));
        assert_eq!(
            out.input_ids,
            vec![id("[CLS]"), 1, 5, 2, id("founded"), 3, id("microsoft"), 4, id("."), id("[SEP]")]
        );
        assert_eq!(m.failures(), 0);
    }

    #[test]
    fn test_word_pieces_shift_marker_positions() {
        let m   = marker();
        let raw = ["Steve", "Jobs", "sold", "Apples", "in", "Seattle"];
        let out = m.mark(&raw, span(3, 4), span(5, 6), &Rendering::mentions()).unwrap();

        assert_eq!(
            out.tokens,
            words("[CLS] steve jobs sold [unused0] apple ##s [unused1] in [unused2] [UNK] [unused3] [SEP]")
        );
        assert_eq!((out.h_start, out.h_end), (4, 7));
        assert_eq!((out.t_start, out.t_end), (9, 11));
        assert_eq!(m.failures(), 0);
    }

    #[test]
    fn test_tail_before_head() {
        let m   = marker();
        let raw = ["Microsoft", "hired", "Bill", "Gates"];
        let out = m.mark(&raw, span(2, 4), span(0, 1), &Rendering::mentions()).unwrap();

        assert_eq!(
            out.tokens,
            words("[CLS] [unused2] microsoft [unused3] hired [unused0] bill gates [unused1] [SEP]")
        );
        assert_eq!((out.t_start, out.t_end), (1, 3));
        assert_eq!((out.h_start, out.h_end), (5, 8));
    }

    #[test]
    fn test_disjoint_spans_resolve_in_order() {
        let m = marker();
        for (h, t) in [(span(0, 1), span(1, 2)), (span(0, 2), span(3, 5)), (span(4, 5), span(0, 1)), (span(2, 3), span(3, 4))] {
            let out = m.mark(&BILL, h, t, &Rendering::mentions()).unwrap();
            assert!(out.h_start < out.h_end);
            assert!(out.t_start < out.t_end);
        }
        assert_eq!(m.failures(), 0);
    }

    #[test]
    fn test_types_replace_mentions() {
        let m   = marker();
        let out = m
            .mark(&BILL, span(0, 2), span(3, 4), &Rendering::types("subj_PERSON", "obj_ORGANIZATION"))
            .unwrap();

        assert_eq!(
            out.tokens,
            words("[CLS] [unused0] subj_PERSON [unused1] founded [unused2] obj_ORGANIZATION [unused3] . [SEP]")
        );
        assert!(!out.tokens.iter().any(|t| t == "bill" || t == "microsoft"));
        // Type strings are not in the vocabulary
        assert_eq!(out.input_ids[2], id("[UNK]"));
    }

    #[test]
    fn test_single_type_keeps_mentions() {
        let m = marker();
        let rendering = Rendering { head_type: Some("PERSON"), ..Rendering::default() };
        let out = m.mark(&BILL, span(0, 2), span(3, 4), &rendering).unwrap();

        assert_eq!(&out.tokens[1..5], &words("[unused0] bill gates [unused1]")[..]);
        assert!(!out.tokens.iter().any(|t| t == "PERSON"));
    }

    #[test]
    fn test_blank_wins_over_type() {
        let m = marker();
        let rendering = Rendering::types("person", "org").with_blanks(true, false);
        let out = m.mark(&BILL, span(0, 2), span(3, 4), &rendering).unwrap();

        assert_eq!(&out.tokens[out.h_start..=out.h_end], &words("[unused0] [unused4] [unused1]")[..]);
        assert_eq!(&out.tokens[out.t_start..=out.t_end], &words("[unused2] org [unused3]")[..]);
    }

    #[test]
    fn test_both_blank_are_distinguishable() {
        let m   = marker();
        let out = m
            .mark(&BILL, span(0, 2), span(3, 4), &Rendering::mentions().with_blanks(true, true))
            .unwrap();
        assert_eq!(out.input_ids[out.h_start + 1], id("[unused4]"));
        assert_eq!(out.input_ids[out.t_start + 1], id("[unused5]"));
    }

    #[test]
    fn test_identical_spans_fail_tail_only() {
        let m   = marker();
        let out = m.mark(&BILL, span(0, 2), span(0, 2), &Rendering::mentions()).unwrap();

        assert_eq!((out.h_start, out.h_end), (1, 4));
        assert_eq!((out.t_start, out.t_end), FALLBACK_POSITIONS);
        assert_eq!(m.failures(), 1);
    }

    #[test]
    fn test_overlapping_tail_falls_back() {
        let m   = marker();
        let out = m.mark(&BILL, span(0, 2), span(1, 4), &Rendering::mentions()).unwrap();

        assert!(out.h_start < out.h_end);
        assert_eq!((out.t_start, out.t_end), FALLBACK_POSITIONS);
        assert_eq!(m.failures(), 1);
    }

    #[test]
    fn test_empty_and_out_of_range_spans_fail_both() {
        let m   = marker();
        let out = m.mark(&BILL, span(3, 1), span(9, 10), &Rendering::mentions()).unwrap();

        assert_eq!((out.h_start, out.h_end), FALLBACK_POSITIONS);
        assert_eq!((out.t_start, out.t_end), FALLBACK_POSITIONS);
        assert_eq!(out.tokens, words("[CLS] bill gates founded microsoft . [SEP]"));
        assert_eq!(m.failures(), 2);
    }

    #[test]
    fn test_failure_delta_is_instance_independent() {
        let warm = marker();
        warm.mark(&BILL, span(0, 2), span(2, 2), &Rendering::mentions()).unwrap();
        let before = warm.failures();
        warm.mark(&BILL, span(1, 1), span(1, 1), &Rendering::mentions()).unwrap();

        let fresh = marker();
        fresh.mark(&BILL, span(1, 1), span(1, 1), &Rendering::mentions()).unwrap();

        assert_eq!(warm.failures() - before, 2);
        assert_eq!(fresh.failures(), 2);
    }

    #[test]
    fn test_counter_accumulates() {
        let m = marker();
        let calls = [
            (span(0, 2), span(3, 4), 0),
            (span(0, 2), span(0, 2), 1),
            (span(5, 5), span(7, 8), 2),
            (span(2, 3), span(3, 4), 0),
        ];
        let mut expected = 0;
        for (h, t, delta) in calls {
            m.mark(&BILL, h, t, &Rendering::mentions()).unwrap();
            expected += delta;
            assert_eq!(m.failures(), expected);
        }
    }

    #[test]
    fn test_ids_round_trip_at_marker_positions() {
        let m   = marker();
        let out = m.mark(&BILL, span(3, 4), span(0, 2), &Rendering::mentions()).unwrap();
        let tok = m.tokenizer();

        for pos in [out.h_start, out.h_end, out.t_start, out.t_end] {
            assert_eq!(tok.id_to_token(out.input_ids[pos]).as_deref(), Some(out.tokens[pos].as_str()));
        }
        assert_eq!(out.input_ids.len(), out.tokens.len());
    }

    #[test]
    fn test_missing_marker_tokens_rejected() {
        let tok = wordpiece_from_tokens(&["[UNK]", "[CLS]", "[SEP]", "the"]).unwrap();
        let err = EntityMarker::new(tok).err().unwrap();
        assert!(err.to_string().contains("[unused0]"));
    }

    #[test]
    fn test_splice_replaces_every_occurrence() {
        let out = splice(
            words("a * h * b * h"),
            &HEAD_PATTERN,
            &words("[unused0] x [unused1]"),
        );
        assert_eq!(out, words("a [unused0] x [unused1] b * h"));
    }

    // ── Shared across threads ─────────────────────────────────────────────────
    struct WhitespaceTokenizer {
        vocab: HashMap<String, u32>,
    }

    impl SubwordTokenizer for WhitespaceTokenizer {
        fn tokenize(&self, text: &str) -> Result<Vec<String>> {
            Ok(text.split_whitespace().map(str::to_string).collect())
        }

        fn vocab_id(&self, token: &str) -> Option<u32> {
            self.vocab.get(token).copied()
        }
    }

    #[test]
    fn test_shared_marker_counts_across_threads() {
        let vocab = VOCAB
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as u32))
            .collect();
        let m = EntityMarker::new(WhitespaceTokenizer { vocab }).unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..25 {
                        m.mark(&BILL, span(0, 2), span(0, 2), &Rendering::mentions()).unwrap();
                    }
                });
            }
        });

        assert_eq!(m.failures(), 100);
    }
}
