//! Scripted IRC-style chat widget.
//!
//! There is no server. Outgoing lines are echoed immediately and a canned
//! reply, picked by keyword, arrives after a short random delay.

use crate::rng::RandomSource;
use crate::surface::{Component, NodeId, Surface};
use crate::synth::{AudioBackend, ToneSynth};
use crate::Result;

pub const WIDGET_ID: &str = "chat-widget";
pub const HEADER_ID: &str = "chat-header";
pub const BODY_ID: &str = "chat-body";
pub const INPUT_ID: &str = "chat-input";
pub const SEND_ID: &str = "chat-send";

/// Keyword → candidate replies. The first keyword found in the message wins.
pub const CHAT_RESPONSES: &[(&str, &[&str])] = &[
    (
        "hello",
        &["USER_99: Yo!", "SYSTEM: Welcome to the server.", "GUEST_404: Hi there."],
    ),
    (
        "selam",
        &[
            "GUEST_TR: Aleyküm selam!",
            "SYSTEM: Selamlar, hoş geldin.",
            "MRDJKeremCan: Selam!",
        ],
    ),
    (
        "music",
        &[
            "USER_01: The bass is heavy today.",
            "SYSTEM: Check the Spotify tab for new tracks.",
            "GUEST_X: Ritual of Us is playing now.",
        ],
    ),
    (
        "dj",
        &[
            "GUEST_FAN: Kerem is the best!",
            "SYSTEM: Resident DJ Status: ONLINE.",
            "USER_23: When is the next set?",
        ],
    ),
    (
        "kick",
        &[
            "SYSTEM: Live stream is offline currently.",
            "GUEST_STREAM: Kick link is in Contact page.",
            "USER_MOD: Follow the channel!",
        ],
    ),
    (
        "hack",
        &[
            "SYSTEM: ⚠️ ILLEGAL OPERATION DETECTED.",
            "ADMIN: Don't try that here.",
            "GUEST_HACKER: *smirks*",
        ],
    ),
    (
        "password",
        &["SYSTEM: **********", "ADMIN: Nice try.", "GUEST_1: Hunter2"],
    ),
    (
        "mrdj",
        &[
            "SYSTEM: Subject identified: Kerem Can.",
            "GUEST_FAN: King of Afro House!",
            "USER_77: Respect.",
        ],
    ),
    (
        "event",
        &[
            "SYSTEM: Check MISSION_LOGS for dates.",
            "USER_PARTY: Tonight we rave!",
            "GUEST_90: Antalya events looking fire.",
        ],
    ),
];

pub const DEFAULT_RESPONSES: &[&str] = &[
    "SYSTEM: Acknowledged.",
    "GUEST_X: ...",
    "USER_? : Interesting.",
    "SYSTEM: Data packet received.",
    "GUEST_RND: Anyone else hearing this?",
];

/// Replies starting with one of these render as system lines.
pub const SYSTEM_PREFIXES: &[&str] = &["SYSTEM:", "ADMIN:", "MRDJKeremCan:"];

const GREETING: [&str; 2] = ["> CONNECTION ESTABLISHED...", "> WELCOME GUEST_USER"];

/// Reply pool for a message.
pub fn candidates(text: &str) -> &'static [&'static str] {
    let lower = text.to_lowercase();
    CHAT_RESPONSES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, replies)| *replies)
        .unwrap_or(DEFAULT_RESPONSES)
}

pub fn get_response(text: &str, rng: &mut dyn RandomSource) -> &'static str {
    let pool = candidates(text);
    pool[rng.index(pool.len())]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    System,
    User,
    Guest,
}

impl MessageKind {
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::System => "system",
            MessageKind::User => "user",
            MessageKind::Guest => "guest",
        }
    }
}

pub fn classify(reply: &str) -> MessageKind {
    if SYSTEM_PREFIXES.iter().any(|p| reply.starts_with(p)) {
        MessageKind::System
    } else {
        MessageKind::Guest
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub text: String,
}

struct ChatNodes {
    widget: NodeId,
    header: NodeId,
    body: NodeId,
    input: NodeId,
}

pub struct ChatWidget {
    nodes: Option<ChatNodes>,
    open: bool,
    messages: Vec<ChatMessage>,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    pub fn new() -> Self {
        Self {
            nodes: None,
            open: true,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn add_message(
        &mut self,
        surface: &mut dyn Surface,
        kind: MessageKind,
        text: &str,
    ) -> Result<()> {
        if let Some(nodes) = &self.nodes {
            let body = nodes.body;
            surface.spawn(body, "div", None, &["chat-msg", kind.css_class()], Some(text))?;
            surface.scroll_to_end(body)?;
        }
        self.messages.push(ChatMessage {
            kind,
            text: text.to_string(),
        });
        Ok(())
    }

    /// Echo a user line. Returns the trimmed prompt to answer later, or `None`
    /// when there was nothing to send.
    pub fn send<B: AudioBackend>(
        &mut self,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
        text: &str,
    ) -> Result<Option<String>> {
        let txt = text.trim();
        if txt.is_empty() {
            return Ok(None);
        }
        self.add_message(surface, MessageKind::User, &format!("YOU: {txt}"))?;
        if let Some(nodes) = &self.nodes {
            surface.set_input_value(nodes.input, "")?;
        }
        if let Err(e) = synth.play_ui_click() {
            log::warn!("chat click failed: {e}");
        }
        Ok(Some(txt.to_string()))
    }

    /// Send whatever is typed in the input box.
    pub fn submit<B: AudioBackend>(
        &mut self,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
    ) -> Result<Option<String>> {
        let Some(nodes) = &self.nodes else {
            return Ok(None);
        };
        let typed = surface.input_value(nodes.input)?;
        self.send(surface, synth, &typed)
    }

    /// Append the scripted reply to `prompt`.
    pub fn deliver<B: AudioBackend>(
        &mut self,
        surface: &mut dyn Surface,
        synth: &mut ToneSynth<B>,
        prompt: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<&'static str> {
        let reply = get_response(prompt, rng);
        self.add_message(surface, classify(reply), reply)?;
        if let Err(e) = synth.play_ui_hover() {
            log::warn!("chat cue failed: {e}");
        }
        Ok(reply)
    }

    /// Collapse or expand the widget. Replies keep arriving while collapsed.
    pub fn toggle(&mut self, surface: &mut dyn Surface) -> Result<()> {
        let Some(nodes) = &self.nodes else {
            return Ok(());
        };
        let (bottom, header_bg) = if self.open {
            ("-320px", "#333")
        } else {
            ("20px", "var(--neon-red)")
        };
        surface.set_style(nodes.widget, "bottom", bottom)?;
        surface.set_style(nodes.header, "background", header_bg)?;
        self.open = !self.open;
        Ok(())
    }
}

impl Component for ChatWidget {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.nodes.is_some() || surface.exists(WIDGET_ID) {
            return Ok(());
        }
        let root = surface.root();
        let widget = surface.spawn(root, "div", Some(WIDGET_ID), &[], None)?;

        let header = surface.spawn(widget, "div", Some(HEADER_ID), &[], None)?;
        surface.spawn(header, "span", None, &[], Some("IRC :: GLOBAL_CHAT"))?;
        let toggle = surface.spawn(header, "span", Some("chat-toggle"), &[], Some("_"))?;
        surface.set_style(toggle, "font-size", "1.2rem")?;

        let body = surface.spawn(widget, "div", Some(BODY_ID), &[], None)?;

        let area = surface.spawn(widget, "div", Some("chat-input-area"), &[], None)?;
        let input = surface.spawn(area, "input", Some(INPUT_ID), &[], None)?;
        surface.set_attribute(input, "type", "text")?;
        surface.set_attribute(input, "placeholder", "Type message...")?;
        surface.spawn(area, "button", Some(SEND_ID), &[], Some(">"))?;

        self.nodes = Some(ChatNodes {
            widget,
            header,
            body,
            input,
        });
        self.open = true;
        for line in GREETING {
            self.add_message(surface, MessageKind::System, line)?;
        }
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(nodes) = self.nodes.take() {
            surface.remove(nodes.widget)?;
        }
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.nodes.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{SeededRandom, SequenceRandom};
    use crate::surface::MemorySurface;
    use crate::synth::RecordingBackend;

    fn mounted() -> (MemorySurface, ToneSynth<RecordingBackend>, ChatWidget) {
        let mut surface = MemorySurface::new();
        let mut chat = ChatWidget::new();
        chat.mount(&mut surface).unwrap();
        (surface, ToneSynth::new(RecordingBackend::new()), chat)
    }

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(candidates("HeLLo there"), CHAT_RESPONSES[0].1);
        assert_eq!(candidates("what's up"), DEFAULT_RESPONSES);
    }

    #[test]
    fn test_first_declared_keyword_wins() {
        // "mrdj" contains "dj", which is declared first
        assert_eq!(candidates("mrdj"), candidates("dj"));
        // "hello" precedes "music"
        assert_eq!(candidates("music hello"), candidates("hello"));
    }

    #[test]
    fn test_response_comes_from_pool() {
        let mut rng = SeededRandom::new(11);
        for _ in 0..20 {
            let r = get_response("any event tonight?", &mut rng);
            assert!(candidates("event").contains(&r));
        }
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("SYSTEM: ok"), MessageKind::System);
        assert_eq!(classify("ADMIN: Nice try."), MessageKind::System);
        assert_eq!(classify("MRDJKeremCan: Selam!"), MessageKind::System);
        assert_eq!(classify("GUEST_1: Hunter2"), MessageKind::Guest);
        assert_eq!(classify("system: lower"), MessageKind::Guest);
    }

    #[test]
    fn test_mount_seeds_greeting_once() {
        let (mut surface, _, mut chat) = mounted();
        chat.mount(&mut surface).unwrap();
        let mut other = ChatWidget::new();
        other.mount(&mut surface).unwrap();
        assert!(!other.is_mounted());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(surface.by_class("chat-msg").len(), 2);
        assert!(chat.messages().iter().all(|m| m.kind == MessageKind::System));
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let (mut surface, mut synth, mut chat) = mounted();
        assert_eq!(chat.send(&mut surface, &mut synth, "   \t").unwrap(), None);
        assert_eq!(chat.messages().len(), 2);
        assert!(synth.backend().voices.is_empty());
    }

    #[test]
    fn test_submit_echoes_and_clears_input() {
        let (mut surface, mut synth, mut chat) = mounted();
        let input = surface.by_id(INPUT_ID).unwrap();
        surface.set_input_value(input, "  hello  ").unwrap();
        let prompt = chat.submit(&mut surface, &mut synth).unwrap();
        assert_eq!(prompt.as_deref(), Some("hello"));
        assert_eq!(surface.input_value(input).unwrap(), "");
        let last = chat.messages().last().unwrap();
        assert_eq!(last.kind, MessageKind::User);
        assert_eq!(last.text, "YOU: hello");
        assert_eq!(synth.backend().voices.len(), 1);
    }

    #[test]
    fn test_deliver_classifies_and_scrolls() {
        let (mut surface, mut synth, mut chat) = mounted();
        let mut rng = SequenceRandom::constant(0.0);
        let reply = chat.deliver(&mut surface, &mut synth, "password?", &mut rng).unwrap();
        assert_eq!(reply, "SYSTEM: **********");
        let last = chat.messages().last().unwrap();
        assert_eq!(last.kind, MessageKind::System);
        let body = surface.by_id(BODY_ID).unwrap();
        assert_eq!(surface.scroll_count(body), 3);
        let node = *surface.children(body).last().unwrap();
        assert!(surface.has_class(node, "system").unwrap());
    }

    #[test]
    fn test_toggle_styles() {
        let (mut surface, _, mut chat) = mounted();
        let widget = surface.by_id(WIDGET_ID).unwrap();
        let header = surface.by_id(HEADER_ID).unwrap();
        chat.toggle(&mut surface).unwrap();
        assert!(!chat.is_open());
        assert_eq!(surface.style(widget, "bottom").unwrap().as_deref(), Some("-320px"));
        assert_eq!(surface.style(header, "background").unwrap().as_deref(), Some("#333"));
        chat.toggle(&mut surface).unwrap();
        assert!(chat.is_open());
        assert_eq!(surface.style(widget, "bottom").unwrap().as_deref(), Some("20px"));
        assert_eq!(
            surface.style(header, "background").unwrap().as_deref(),
            Some("var(--neon-red)")
        );
    }
}
