//! Data models for the admin backend.
//!
//! - `AdminStats`, `FinancialStats`: dashboard aggregates
//! - `Student`, `LeaderboardEntry`: platform users
//! - `LessonCatalog`, `QuizCatalog`, `GrammarTopicList`: educational content
//! - `Subscription`, `BusinessProfile`: billing and storefront data
//! - `TokenPair`, `UserProfile`: authentication payloads
//!
//! With the `ts` feature enabled, the wire types also derive TypeScript
//! definitions for the web front end.

pub mod auth;
pub mod content;
pub mod stats;
pub mod subscription;
pub mod user;

pub use auth::{LoginRequest, RefreshRequest, TokenPair, UserProfile};
pub use content::{
    GrammarPack, GrammarQuestion, GrammarQuestionType, GrammarTopic, GrammarTopicList, Lesson,
    LessonCatalog, Module, NewGrammarQuestion, NewGrammarTopic, NewLesson, NewModule, NewPack,
    NewWord, Pack, PackType, QuizCatalog, Word, WordPack,
};
pub use stats::{AdminStats, FinancialStats};
pub use subscription::{BusinessProfile, Subscription, SubscriptionFilters, SubscriptionStatus};
pub use user::{LeaderboardEntry, Student};
