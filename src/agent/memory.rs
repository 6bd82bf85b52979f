/// One user turn and the agent's final answer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub human: String,
    pub ai: String,
}

/// Chat memory that only remembers the last `window` exchanges.
#[derive(Debug, Clone)]
pub struct ConversationWindowMemory {
    window: usize,
    exchanges: Vec<Exchange>,
}

impl ConversationWindowMemory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            exchanges: Vec::with_capacity(window + 1),
        }
    }

    pub fn save_context(&mut self, human: &str, ai: &str) {
        self.exchanges.push(Exchange {
            human: human.to_string(),
            ai: ai.to_string(),
        });
        if self.exchanges.len() > self.window {
            let excess = self.exchanges.len() - self.window;
            self.exchanges.drain(..excess);
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

/// Render exchanges as a `Human:` / `AI:` transcript.
pub fn render_history(exchanges: &[Exchange]) -> String {
    exchanges
        .iter()
        .map(|e| format!("Human: {}\nAI: {}", e.human, e.ai))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_last_window() {
        let mut memory = ConversationWindowMemory::new(5);
        for i in 0..7 {
            memory.save_context(&format!("q{}", i), &format!("a{}", i));
        }
        assert_eq!(memory.len(), 5);
        assert_eq!(memory.exchanges()[0].human, "q2");
        assert_eq!(memory.exchanges()[4].ai, "a6");
    }

    #[test]
    fn zero_window_remembers_nothing() {
        let mut memory = ConversationWindowMemory::new(0);
        memory.save_context("hi", "hello");
        assert!(memory.is_empty());
    }

    #[test]
    fn renders_transcript() {
        let mut memory = ConversationWindowMemory::new(2);
        memory.save_context("hi", "hello");
        memory.save_context("Paris?", "Lovely.");
        assert_eq!(
            render_history(memory.exchanges()),
            "Human: hi\nAI: hello\nHuman: Paris?\nAI: Lovely."
        );
    }
}
