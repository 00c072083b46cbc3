//! Incremental `text/event-stream` decoder
//!
//! Bytes arrive in arbitrary chunks; complete lines are drained from an
//! internal buffer and folded into frames, dispatched on a blank line.

/// One dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Value of the `event:` field, `None` for the default `message` event
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    pub id: Option<String>,
}

/// Line-oriented SSE parser
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    saw_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();

        for &byte in chunk {
            // `\r\n` counts as one line break
            if self.saw_cr {
                self.saw_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' | b'\r' => {
                    self.saw_cr = byte == b'\r';
                    let line = std::mem::take(&mut self.buffer);
                    let line = String::from_utf8_lossy(&line).into_owned();
                    if let Some(frame) = self.process_line(&line) {
                        frames.push(frame);
                    }
                }
                _ => self.buffer.push(byte),
            }
        }

        frames
    }

    /// End of input. A frame not closed by a blank line is incomplete and
    /// is discarded; returns true if anything was pending.
    pub fn finish(&mut self) -> bool {
        let pending = !self.buffer.is_empty() || !self.data.is_empty();
        self.buffer.clear();
        self.data.clear();
        self.event = None;
        self.saw_cr = false;
        pending
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(pos) => {
                let value = &line[pos + 1..];
                (&line[..pos], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            // `retry` and unknown fields are ignored
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            // Frames without data (e.g. a bare `event: complete`) are not dispatched
            return None;
        }

        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event,
            data,
            id: self.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: {\"type\":\"status\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"type\":\"status\"}");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"da").is_empty());
        assert!(decoder.feed(b"ta: hel").is_empty());
        assert!(decoder.feed(b"lo\n").is_empty());
        let frames = decoder.feed(b"\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "hello");
    }

    #[test]
    fn test_multibyte_split() {
        let payload = "data: 意图分析\n\n".as_bytes();
        let (head, tail) = payload.split_at(8);
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(head).is_empty());
        let frames = decoder.feed(tail);
        assert_eq!(frames[0].data, "意图分析");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: a\r\n\r\ndata: b\r\n\r\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "a");
        assert_eq!(frames[1].data, "b");
    }

    #[test]
    fn test_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: line1\ndata: line2\n\n");
        assert_eq!(frames[0].data, "line1\nline2");
    }

    #[test]
    fn test_comments_and_named_events() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\nevent: update\nid: 7\ndata: x\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("update"));
        assert_eq!(frames[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn test_event_without_data_not_dispatched() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: complete\n\n");
        assert!(frames.is_empty());
        // The event name must not leak into the next frame
        let frames = decoder.feed(b"data: next\n\n");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn test_finish_discards_unterminated_frame() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"status\",\"status\":\"completed\"}\n").is_empty());
        assert!(decoder.finish());
        assert!(!decoder.finish());

        // Nothing from the dropped frame leaks into the next one
        let frames = decoder.feed(b"data: next\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "next");
    }
}
