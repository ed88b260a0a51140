//! Append-only memory of lessons the oracle wrote about its own trades.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M"), self.text)
    }
}

/// Ordered lesson log. Unbounded by default; [`ReflectionMemory::with_limit`]
/// turns it into a ring buffer that drops the oldest lesson when full.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReflectionMemory {
    lessons: VecDeque<Lesson>,
    limit: Option<usize>,
}

impl ReflectionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        ReflectionMemory {
            lessons: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn append(&mut self, lesson: Lesson) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            if self.lessons.len() == limit {
                self.lessons.pop_front();
            }
        }
        self.lessons.push_back(lesson);
    }

    /// Stamps `text` with `timestamp` and appends it.
    pub fn record(&mut self, text: impl Into<String>, timestamp: DateTime<Utc>) {
        self.append(Lesson {
            timestamp,
            text: text.into(),
        });
    }

    /// Up to `n` most recent lessons, oldest first.
    pub fn latest(&self, n: usize) -> Vec<&Lesson> {
        let skip = self.lessons.len().saturating_sub(n);
        self.lessons.iter().skip(skip).collect()
    }

    pub fn last(&self) -> Option<&Lesson> {
        self.lessons.back()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn memory_with(n: usize) -> ReflectionMemory {
        let mut memory = ReflectionMemory::new();
        for i in 0..n {
            memory.record(format!("lesson {i}"), at(i as i64));
        }
        memory
    }

    #[test]
    fn latest_returns_most_recent_in_order() {
        let memory = memory_with(5);
        let texts: Vec<&str> = memory.latest(3).iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["lesson 2", "lesson 3", "lesson 4"]);
    }

    #[test]
    fn latest_with_short_history() {
        let memory = memory_with(2);
        assert_eq!(memory.latest(3).len(), 2);
        assert!(ReflectionMemory::new().latest(3).is_empty());
    }

    #[test]
    fn latest_zero() {
        assert!(memory_with(4).latest(0).is_empty());
    }

    #[test]
    fn unbounded_keeps_everything() {
        let memory = memory_with(500);
        assert_eq!(memory.len(), 500);
        assert_eq!(memory.last().unwrap().text, "lesson 499");
        assert_eq!(memory.latest(500)[0].text, "lesson 0");
        // 14:00 plus 499 minutes.
        assert_eq!(memory.last().unwrap().to_string(), "[22:19] lesson 499");
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut memory = ReflectionMemory::with_limit(2);
        memory.record("a", at(0));
        memory.record("b", at(1));
        memory.record("c", at(2));
        let texts: Vec<&str> = memory.latest(5).iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn lesson_display_has_clock_prefix() {
        let lesson = Lesson {
            timestamp: at(7),
            text: "Do not chase breakouts".into(),
        };
        assert_eq!(lesson.to_string(), "[14:07] Do not chase breakouts");
    }
}
