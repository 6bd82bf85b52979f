use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::agent::{AgentExecutor, AgentFactory};

/// One conversation's agent. Requests on the same session serialize on the
/// mutex.
pub type SharedAgent = Arc<Mutex<AgentExecutor>>;

struct SessionEntry {
    agent: SharedAgent,
    last_access: Instant,
}

/// Session id -> agent cache, bounded by capacity (least recently used
/// first out) and by idle time.
pub struct SessionManager {
    factory: AgentFactory,
    sessions: DashMap<String, SessionEntry>,
    capacity: usize,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(factory: AgentFactory, capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            factory,
            sessions: DashMap::new(),
            capacity,
            idle_timeout,
        }
    }

    /// Return the agent for `session_id`, creating it on first use. The agent
    /// is constructed at most once per key even under concurrent calls.
    pub fn get_or_create(&self, session_id: &str) -> SharedAgent {
        let now = Instant::now();
        let mut created = false;

        let agent = {
            let mut entry = self
                .sessions
                .entry(session_id.to_string())
                .or_insert_with(|| {
                    created = true;
                    SessionEntry {
                        agent: Arc::new(Mutex::new(self.factory.create_agent(session_id))),
                        last_access: now,
                    }
                });
            entry.last_access = now;
            entry.agent.clone()
        };

        if created && self.sessions.len() > self.capacity {
            self.evict_least_recent(session_id);
        }
        agent
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_least_recent(&self, keep: &str) {
        while self.sessions.len() > self.capacity {
            let victim = self
                .sessions
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_access)
                .map(|entry| entry.key().clone());

            match victim {
                Some(session_id) => {
                    self.sessions.remove(&session_id);
                    info!("Evicted least recently used session: {}", session_id);
                }
                None => break,
            }
        }
    }

    /// Drop every session not touched within the idle timeout. Returns how
    /// many were removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|session_id, entry| {
            let keep = now.duration_since(entry.last_access) < self.idle_timeout;
            if !keep {
                debug!("Session {} idle, evicting", session_id);
            }
            keep
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Run `evict_idle` every `every` until the manager is dropped.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                let evicted = manager.evict_idle();
                if evicted > 0 {
                    info!("Idle sweep evicted {} session(s)", evicted);
                }
            }
        })
    }
}
