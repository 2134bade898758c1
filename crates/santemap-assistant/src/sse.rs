//! Incremental assembler for the gateway's SSE-style delta stream.
//!
//! The stream is a UTF-8 text stream of newline-delimited frames. Each
//! `data: <json>` line carries a completion delta at
//! `choices[0].delta.content`; `data: [DONE]` terminates the turn.
//! Chunk boundaries fall anywhere, including mid-JSON and mid-character,
//! so the pending buffer holds raw bytes and only complete lines are
//! decoded. A line that fails to parse is put back in front of the
//! pending buffer and retried once more bytes arrive — partial frames
//! are deferred, never dropped.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerEvent {
    /// The full assistant content assembled so far. Downstream replaces
    /// the live turn's content with this, it does not append a new turn.
    Update(String),
    /// `[DONE]` sentinel or natural stream end; no further mutation.
    Finished,
}

#[derive(Debug, Default)]
pub struct SseAssembler {
    pending: Vec<u8>,
    content: String,
    finished: bool,
}

impl SseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content assembled so far for the in-flight turn.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed the next chunk of stream bytes and process every fully
    /// buffered line. Events are emitted in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<AssemblerEvent> {
        if self.finished {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);
        self.drain_lines()
    }

    /// Natural end of the stream, for readers that complete without a
    /// `[DONE]` sentinel. Idempotent.
    pub fn finish(&mut self) -> Vec<AssemblerEvent> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        vec![AssemblerEvent::Finished]
    }

    fn drain_lines(&mut self) -> Vec<AssemblerEvent> {
        let mut events = Vec::new();

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut raw: Vec<u8> = self.pending.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if raw.is_empty() || raw.first() == Some(&b':') {
                continue;
            }
            // A complete line holds only whole characters; mid-character
            // chunk boundaries stay in the byte buffer until then.
            let line = String::from_utf8_lossy(&raw);
            let Some(payload) = line.strip_prefix("data: ") else {
                continue;
            };
            let payload = payload.trim();

            if payload == "[DONE]" {
                self.finished = true;
                events.push(AssemblerEvent::Finished);
                break;
            }

            match serde_json::from_str::<serde_json::Value>(payload) {
                Ok(frame) => {
                    if let Some(delta) = delta_content(&frame) {
                        self.content.push_str(delta);
                        events.push(AssemblerEvent::Update(self.content.clone()));
                    }
                }
                Err(_) => {
                    // The line was split across chunk boundaries. Put the
                    // original bytes back and wait for the rest.
                    raw.push(b'\n');
                    raw.extend_from_slice(&self.pending);
                    self.pending = raw;
                    break;
                }
            }
        }

        events
    }
}

fn delta_content(frame: &serde_json::Value) -> Option<&str> {
    frame
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta_line(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n")
    }

    #[test]
    fn two_deltas_then_done_assemble_bonjour() {
        let mut asm = SseAssembler::new();

        let first = asm.feed(delta_line("Bon").as_bytes());
        assert_eq!(first, vec![AssemblerEvent::Update("Bon".into())]);

        let second = asm.feed(delta_line("jour").as_bytes());
        assert_eq!(second, vec![AssemblerEvent::Update("Bonjour".into())]);

        let end = asm.feed(b"data: [DONE]\n");
        assert_eq!(end, vec![AssemblerEvent::Finished]);
        assert!(asm.is_finished());
        assert_eq!(asm.content(), "Bonjour");
    }

    #[test]
    fn split_frame_across_chunk_boundary_is_deferred() {
        let mut asm = SseAssembler::new();
        let line = delta_line("Bonjour");
        let (head, tail) = line.split_at(20); // splits mid-JSON

        assert!(asm.feed(head.as_bytes()).is_empty());
        let events = asm.feed(tail.as_bytes());
        assert_eq!(events, vec![AssemblerEvent::Update("Bonjour".into())]);
    }

    #[test]
    fn split_inside_a_multibyte_character_does_not_corrupt() {
        let mut asm = SseAssembler::new();
        let line = delta_line("café");
        let bytes = line.as_bytes();
        // Cut between the two bytes of 'é'.
        let cut = line.find('é').unwrap() + 1;
        assert!(!line.is_char_boundary(cut));

        assert!(asm.feed(&bytes[..cut]).is_empty());
        let events = asm.feed(&bytes[cut..]);
        assert_eq!(events, vec![AssemblerEvent::Update("café".into())]);
        assert_eq!(asm.content(), "café");
    }

    #[test]
    fn byte_by_byte_delivery_matches_unsplit_content() {
        let mut asm = SseAssembler::new();
        let mut input = delta_line("Où avez-vous mal ?");
        input.push_str("data: [DONE]\n");

        let mut events = Vec::new();
        for byte in input.as_bytes() {
            events.extend(asm.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(asm.content(), "Où avez-vous mal ?");
        assert_eq!(events.last(), Some(&AssemblerEvent::Finished));
    }

    #[test]
    fn split_with_newline_already_buffered_is_reprepended() {
        // The newline of the *next* line arrives before the split frame
        // completes, so a parse attempt happens and must defer.
        let mut asm = SseAssembler::new();
        let full = delta_line("Bonjour");
        let cut = full.len() - 8; // inside the JSON tail, before its '\n'
        let mut first = full[..cut].to_string();
        first.push('\n'); // stray newline forces an early parse attempt

        // The early parse fails and the partial line is retained.
        assert!(asm.feed(first.as_bytes()).is_empty());
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let mut asm = SseAssembler::new();
        let events = asm.feed(b": keep-alive\n\n\r\n");
        assert!(events.is_empty());

        let events = asm.feed(delta_line("ok").as_bytes());
        assert_eq!(events, vec![AssemblerEvent::Update("ok".into())]);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut asm = SseAssembler::new();
        let mut input = String::from("event: message\nid: 3\ndata:{\"nospace\":1}\n");
        input.push_str(&delta_line("ok"));
        let events = asm.feed(input.as_bytes());
        assert_eq!(events, vec![AssemblerEvent::Update("ok".into())]);
    }

    #[test]
    fn crlf_lines_are_handled() {
        let mut asm = SseAssembler::new();
        let events =
            asm.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Salut\"}}]}\r\ndata: [DONE]\r\n");
        assert_eq!(
            events,
            vec![
                AssemblerEvent::Update("Salut".into()),
                AssemblerEvent::Finished
            ]
        );
    }

    #[test]
    fn frames_after_done_are_ignored() {
        let mut asm = SseAssembler::new();
        let mut input = delta_line("avant");
        input.push_str("data: [DONE]\n");
        input.push_str(&delta_line("après"));

        let events = asm.feed(input.as_bytes());
        assert_eq!(
            events,
            vec![
                AssemblerEvent::Update("avant".into()),
                AssemblerEvent::Finished
            ]
        );
        assert_eq!(asm.content(), "avant");

        assert!(asm.feed(delta_line("encore").as_bytes()).is_empty());
    }

    #[test]
    fn frame_without_delta_content_emits_nothing() {
        let mut asm = SseAssembler::new();
        let events = asm.feed(b"data: {\"choices\":[{\"delta\":{}}]}\ndata: {\"choices\":[]}\n");
        assert!(events.is_empty());
        assert_eq!(asm.content(), "");
    }

    #[test]
    fn finish_is_idempotent() {
        let mut asm = SseAssembler::new();
        asm.feed(delta_line("fin").as_bytes());
        assert_eq!(asm.finish(), vec![AssemblerEvent::Finished]);
        assert!(asm.finish().is_empty());
    }

    #[test]
    fn updates_are_monotonically_growing() {
        let mut asm = SseAssembler::new();
        let mut input = String::new();
        for part in ["Il ", "faut ", "consulter ", "un ", "médecin."] {
            input.push_str(&delta_line(part));
        }
        let events = asm.feed(input.as_bytes());

        let mut last_len = 0;
        for event in &events {
            if let AssemblerEvent::Update(content) = event {
                assert!(content.len() > last_len);
                assert!(content.starts_with("Il "));
                last_len = content.len();
            }
        }
        assert_eq!(asm.content(), "Il faut consulter un médecin.");
    }
}
