use std::collections::{HashSet, VecDeque};

/// Default number of jokes remembered per client.
pub const SEEN_JOKES_CAPACITY: usize = 100;

/// Bounded, insertion-ordered set of joke texts already handed out.
///
/// Membership is exact string match. When full, inserting a new joke evicts
/// the oldest-inserted one; lookups do not refresh an entry's position.
#[derive(Debug, Clone)]
pub struct SeenJokes {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl Default for SeenJokes {
    fn default() -> Self {
        Self::new()
    }
}

impl SeenJokes {
    pub fn new() -> Self {
        Self::with_capacity(SEEN_JOKES_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` jokes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, joke: &str) -> bool {
        self.members.contains(joke)
    }

    /// Remembers `joke`, returning the entry evicted to make room, if any.
    ///
    /// Inserting a joke that is already present changes nothing.
    pub fn insert(&mut self, joke: String) -> Option<String> {
        if self.members.contains(&joke) {
            return None;
        }

        let evicted = if self.order.len() >= self.capacity {
            let oldest = self.order.pop_front();
            if let Some(oldest) = &oldest {
                self.members.remove(oldest);
            }
            oldest
        } else {
            None
        };

        self.members.insert(joke.clone());
        self.order.push_back(joke);
        evicted
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
