//! Field codes
//!
//! A complex field is spread over runs: `fldChar begin`, instruction text,
//! `fldChar separate`, the result runs, `fldChar end`. Fields nest, so the
//! exporter keeps a stack per paragraph and routes rendered output to the
//! innermost open field (or drops it during the instruction phase).

/// What a field instruction asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCode {
    /// `HYPERLINK "url"` or `HYPERLINK \l "bookmark"`
    Hyperlink(String),
    /// Anything else; the cached result is rendered unchanged
    Other,
}

impl FieldCode {
    /// Interpret an instruction string such as `HYPERLINK "http://x" \o "tip"`
    pub fn parse(instruction: &str) -> Self {
        let tokens = tokenize(instruction);
        let Some((keyword, args)) = tokens.split_first() else {
            return FieldCode::Other;
        };
        if !keyword.eq_ignore_ascii_case("HYPERLINK") {
            return FieldCode::Other;
        }

        let mut url = None;
        let mut location = None;
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "\\l" => location = args.next().cloned(),
                "\\o" | "\\t" => {
                    args.next();
                }
                switch if switch.starts_with('\\') => {}
                target => {
                    if url.is_none() {
                        url = Some(target.to_string());
                    }
                }
            }
        }

        match (url, location) {
            (Some(url), Some(location)) => FieldCode::Hyperlink(format!("{}#{}", url, location)),
            (Some(url), None) => FieldCode::Hyperlink(url),
            (None, Some(location)) => FieldCode::Hyperlink(format!("#{}", location)),
            (None, None) => FieldCode::Other,
        }
    }
}

/// Split on whitespace, keeping double-quoted arguments whole
fn tokenize(instruction: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in instruction.chars() {
        match c {
            '"' => {
                if quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = !quoted;
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Instruction,
    Result,
}

/// One open complex field
#[derive(Debug, Clone)]
pub struct FieldFrame {
    phase: Phase,
    pub instruction: String,
    pub result: String,
}

impl FieldFrame {
    /// The parsed instruction
    pub fn code(&self) -> FieldCode {
        FieldCode::parse(&self.instruction)
    }
}

/// Open fields of the paragraph being rendered, innermost last
#[derive(Debug, Default)]
pub struct FieldStack {
    frames: Vec<FieldFrame>,
}

impl FieldStack {
    pub fn begin(&mut self) {
        self.frames.push(FieldFrame {
            phase: Phase::Instruction,
            instruction: String::new(),
            result: String::new(),
        });
    }

    /// Switch the innermost field to its result; ignored without an open field
    pub fn separate(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.phase = Phase::Result;
        }
    }

    /// Close the innermost field
    ///
    /// Returns `None` for a stray `end`, and for a field nested inside
    /// another field's instruction: its result becomes part of that
    /// instruction (`HYPERLINK { REF target }`).
    pub fn end(&mut self) -> Option<FieldFrame> {
        let frame = self.frames.pop()?;
        match self.frames.last_mut() {
            Some(outer) if outer.phase == Phase::Instruction => {
                outer.instruction.push_str(&frame.result);
                None
            }
            _ => Some(frame),
        }
    }

    /// True while output would be swallowed by an instruction
    pub fn is_capturing(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.phase == Phase::Instruction)
    }

    /// Instruction text for the innermost field
    pub fn instruction(&mut self, text: &str) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.phase == Phase::Instruction {
                frame.instruction.push_str(text);
            }
        }
    }

    /// Route rendered output to the innermost field, or to `out`
    pub fn emit(&mut self, text: &str, out: &mut String) {
        match self.frames.last_mut() {
            None => out.push_str(text),
            Some(frame) if frame.phase == Phase::Result => frame.result.push_str(text),
            Some(_) => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyperlink_instructions() {
        assert_eq!(
            FieldCode::parse(r#" HYPERLINK "http://example.com/" "#),
            FieldCode::Hyperlink("http://example.com/".to_string())
        );
        assert_eq!(
            FieldCode::parse(r#"HYPERLINK \l "_Toc123""#),
            FieldCode::Hyperlink("#_Toc123".to_string())
        );
        assert_eq!(
            FieldCode::parse(r#"HYPERLINK "http://x" \l "part" \o "tooltip text""#),
            FieldCode::Hyperlink("http://x#part".to_string())
        );
        assert_eq!(
            FieldCode::parse(r#"hyperlink \o "tip" "http://y""#),
            FieldCode::Hyperlink("http://y".to_string())
        );
    }

    #[test]
    fn test_parse_other_instructions() {
        assert_eq!(FieldCode::parse(r#"PAGEREF _Toc1 \h"#), FieldCode::Other);
        assert_eq!(FieldCode::parse("HYPERLINK"), FieldCode::Other);
        assert_eq!(FieldCode::parse(""), FieldCode::Other);
    }

    #[test]
    fn test_instruction_phase_swallows_output() {
        let mut stack = FieldStack::default();
        let mut out = String::new();
        stack.emit("before ", &mut out);
        stack.begin();
        stack.instruction(" HYPERLINK ");
        stack.emit("hidden", &mut out);
        stack.instruction("\"http://a\"");
        stack.separate();
        stack.instruction("ignored");
        stack.emit("shown", &mut out);

        let frame = stack.end().unwrap();
        assert_eq!(frame.result, "shown");
        assert_eq!(frame.code(), FieldCode::Hyperlink("http://a".to_string()));
        assert_eq!(out, "before ");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_nested_fields_route_to_innermost() {
        let mut stack = FieldStack::default();
        let mut out = String::new();
        stack.begin();
        stack.separate();
        stack.emit("outer ", &mut out);
        stack.begin();
        stack.separate();
        stack.emit("inner", &mut out);
        let inner = stack.end().unwrap();
        stack.emit(&inner.result, &mut out);
        let outer = stack.end().unwrap();
        assert_eq!(outer.result, "outer inner");
        assert!(out.is_empty());
    }

    #[test]
    fn test_stray_markers_are_ignored() {
        let mut stack = FieldStack::default();
        let mut out = String::new();
        stack.separate();
        assert!(stack.end().is_none());
        stack.instruction("HYPERLINK");
        stack.emit("text", &mut out);
        assert_eq!(out, "text");
    }

    #[test]
    fn test_field_inside_instruction_feeds_instruction() {
        let mut stack = FieldStack::default();
        let mut out = String::new();
        stack.begin();
        stack.instruction("HYPERLINK \"");
        assert!(stack.is_capturing());
        stack.begin();
        stack.instruction(" REF target ");
        stack.separate();
        assert!(!stack.is_capturing());
        stack.emit("http://example.com/ref", &mut out);
        assert!(stack.end().is_none());
        assert!(stack.is_capturing());
        stack.instruction("\"");
        stack.separate();
        stack.emit("link", &mut out);

        let frame = stack.end().unwrap();
        assert_eq!(
            frame.code(),
            FieldCode::Hyperlink("http://example.com/ref".to_string())
        );
        assert_eq!(frame.result, "link");
        assert!(out.is_empty());
        assert!(!stack.is_capturing());
    }
}
