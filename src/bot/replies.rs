use rand::seq::SliceRandom;

pub const GREETING: &str = "Hi! I'm your virtual assistant. How can I help you today?";

const CANNED: [&str; 9] = [
    "I understand your question. Let me help you with that.",
    "That's a great question. Let me explain...",
    "Sure! I can help you with that.",
    "Let me check that information for you.",
    "Perfect, here is the information you need.",
    "Thanks for your message. I'll get right back to you.",
    "Interesting point. Here's my take...",
    "Happy to help. Take a look at this...",
    "Excellent! Let me look that up.",
];

/// Something that answers a chat message.
pub trait ReplySource: Send + Sync {
    fn greeting(&self) -> &str;
    fn reply(&self, message: &str) -> String;
}

/// Picks one of a fixed set of replies at random; the message is ignored.
#[derive(Debug, Clone)]
pub struct CannedReplies {
    greeting: &'static str,
    replies: &'static [&'static str],
}

impl Default for CannedReplies {
    fn default() -> Self {
        Self {
            greeting: GREETING,
            replies: &CANNED,
        }
    }
}

impl ReplySource for CannedReplies {
    fn greeting(&self) -> &str {
        self.greeting
    }

    fn reply(&self, _message: &str) -> String {
        self.replies
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(self.greeting)
            .to_string()
    }
}
