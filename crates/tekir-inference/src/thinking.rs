//! Tag-delimited reasoning extraction.
//!
//! Reasoning models wrap their chain of thought in a tag, e.g.
//! `<think>...</think>The answer is 42.`. This module separates the tagged
//! text (the reasoning channel) from everything else (the answer channel),
//! either for a complete response or incrementally for a stream.

use tekir_core::StreamPart;

/// Result of splitting a tagged response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingResponse {
    /// Text found inside reasoning tags, if any.
    pub thinking_content: Option<String>,
    /// Everything outside the tags.
    pub answer_content: String,
}

/// Opening and closing delimiters for a tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningTag {
    name: String,
    open: String,
    close: String,
}

impl ReasoningTag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            open: format!("<{}>", name),
            close: format!("</{}>", name),
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

/// Checks if a response contains an opening tag.
/// Detects even an unclosed reasoning block.
pub fn has_reasoning_tag(response: &str, tag: &ReasoningTag) -> bool {
    response.contains(tag.open())
}

/// Splits a complete response into reasoning and answer content.
///
/// Runs the same [`TagSplitter`] a stream goes through, so a one-shot
/// generation and a collected stream of the same text always agree.
/// Each segment between delimiters is trimmed, blank segments are dropped,
/// and segments of the same channel are joined with a newline. An unclosed
/// opening tag makes the rest of the response reasoning.
///
/// # Examples
///
/// ```
/// use tekir_inference::thinking::{parse_tagged_response, ReasoningTag};
///
/// let tag = ReasoningTag::new("think");
/// let parsed = parse_tagged_response("<think>Analyzing...</think>The answer is 42.", &tag);
/// assert_eq!(parsed.thinking_content, Some("Analyzing...".to_string()));
/// assert_eq!(parsed.answer_content, "The answer is 42.");
/// ```
pub fn parse_tagged_response(response: &str, tag: &ReasoningTag) -> ThinkingResponse {
    let mut splitter = TagSplitter::new(tag.clone());
    let mut parts = splitter.push(response);
    parts.extend(splitter.finish());

    let mut thinking_content = String::new();
    let mut answer_content = String::new();
    for part in parts {
        match part {
            StreamPart::ReasoningDelta(delta) => thinking_content.push_str(&delta),
            StreamPart::TextDelta(delta) => answer_content.push_str(&delta),
            StreamPart::Finish(_) => {}
        }
    }

    ThinkingResponse {
        thinking_content: if thinking_content.is_empty() {
            None
        } else {
            Some(thinking_content)
        },
        answer_content,
    }
}

// =============================================================================
// Incremental splitting
// =============================================================================

/// Incremental reasoning splitter for streamed text.
///
/// Text is fed in arbitrary chunks; tags may be cut anywhere, including in
/// the middle of a delimiter. A trailing fragment that could still become a
/// delimiter is held back until the next chunk or [`TagSplitter::finish`].
///
/// Every segment between delimiters is trimmed: leading whitespace is
/// dropped, trailing whitespace is held until more text of the same segment
/// arrives. When a channel that already has output starts a new segment,
/// its first delta is prefixed with `\n`. The concatenated output does not
/// depend on how the input was chunked.
#[derive(Debug, Clone)]
pub struct TagSplitter {
    tag: ReasoningTag,
    buffer: String,
    in_reasoning: bool,
    at_segment_start: bool,
    pending_whitespace: String,
    reasoning_started: bool,
    text_started: bool,
}

impl TagSplitter {
    pub fn new(tag: ReasoningTag) -> Self {
        Self {
            tag,
            buffer: String::new(),
            in_reasoning: false,
            at_segment_start: true,
            pending_whitespace: String::new(),
            reasoning_started: false,
            text_started: false,
        }
    }

    /// Whether the splitter is currently inside a reasoning block.
    pub fn in_reasoning(&self) -> bool {
        self.in_reasoning
    }

    /// Record reasoning that reached the caller outside the splitter, e.g.
    /// a backend's native reasoning field. Extracted reasoning that follows
    /// is separated from it by a newline.
    pub fn mark_reasoning_started(&mut self) {
        self.reasoning_started = true;
    }

    /// Feed a text chunk, returning the parts that are now certain.
    pub fn push(&mut self, chunk: &str) -> Vec<StreamPart> {
        self.buffer.push_str(chunk);
        let mut parts = Vec::new();

        loop {
            let (found, delimiter_len, held_back) = {
                let delimiter = self.current_delimiter();
                match self.buffer.find(delimiter) {
                    Some(pos) => (Some(pos), delimiter.len(), 0),
                    None => (None, delimiter.len(), partial_suffix_len(&self.buffer, delimiter)),
                }
            };

            match found {
                Some(pos) => {
                    let segment: String = self.buffer.drain(..pos).collect();
                    self.emit(&segment, &mut parts);
                    self.buffer.replace_range(..delimiter_len, "");
                    self.end_segment();
                    self.in_reasoning = !self.in_reasoning;
                }
                None => {
                    let ready = self.buffer.len() - held_back;
                    let segment: String = self.buffer.drain(..ready).collect();
                    self.emit(&segment, &mut parts);
                    break;
                }
            }
        }

        parts
    }

    /// Flush any held-back text into the current channel.
    pub fn finish(&mut self) -> Vec<StreamPart> {
        let mut parts = Vec::new();
        let rest = std::mem::take(&mut self.buffer);
        self.emit(&rest, &mut parts);
        self.end_segment();
        parts
    }

    fn current_delimiter(&self) -> &str {
        if self.in_reasoning {
            self.tag.close()
        } else {
            self.tag.open()
        }
    }

    fn end_segment(&mut self) {
        self.pending_whitespace.clear();
        self.at_segment_start = true;
    }

    fn emit(&mut self, segment: &str, parts: &mut Vec<StreamPart>) {
        let segment = if self.at_segment_start {
            segment.trim_start()
        } else {
            segment
        };

        let body = segment.trim_end();
        if body.is_empty() {
            if !self.at_segment_start {
                self.pending_whitespace.push_str(segment);
            }
            return;
        }

        let mut delta = String::new();
        if self.at_segment_start {
            let started = if self.in_reasoning {
                &mut self.reasoning_started
            } else {
                &mut self.text_started
            };
            if *started {
                delta.push('\n');
            }
            *started = true;
            self.at_segment_start = false;
        }
        delta.push_str(&std::mem::take(&mut self.pending_whitespace));
        delta.push_str(body);
        self.pending_whitespace.push_str(&segment[body.len()..]);

        parts.push(if self.in_reasoning {
            StreamPart::ReasoningDelta(delta)
        } else {
            StreamPart::TextDelta(delta)
        });
    }
}

/// Length of the longest proper prefix of `delimiter` that ends `buffer`.
fn partial_suffix_len(buffer: &str, delimiter: &str) -> usize {
    (1..delimiter.len())
        .rev()
        .filter(|&k| delimiter.is_char_boundary(k))
        .find(|&k| buffer.ends_with(&delimiter[..k]))
        .unwrap_or(0)
}
