//! Built-in practice material.

/// Questions asked by the practice test, one at a time.
pub const PRACTICE_QUESTIONS: [&str; 5] = [
    "What is your name?",
    "How are you feeling today?",
    "What did you learn yesterday?",
    "Tell me your favourite hobby.",
    "Where do you live?",
];

/// Sentences used by the repeat-sentence game.
pub const REPEAT_SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "Learning by speaking is very effective.",
    "Practice makes progress every single day.",
    "Please remember to drink water while studying.",
    "Today is a good day to try something new.",
];

/// Word table used when no lexical database is available.
pub const FALLBACK_WORDS: [(&str, [&str; 3]); 5] = [
    ("happy", ["glad", "joyful", "pleased"]),
    ("fast", ["quick", "rapid", "swift"]),
    ("big", ["large", "huge", "vast"]),
    ("smart", ["clever", "bright", "wise"]),
    ("sad", ["unhappy", "sorrowful", "downcast"]),
];

/// Spoken once a practice session has gone through every question.
pub const SESSION_COMPLETE_LINE: &str = "Test completed. Good job!";
