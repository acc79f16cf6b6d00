//! Educational content: modules, lessons, packs, quiz items, grammar topics.
//!
//! Type tags (`"word"`, `"grammar"`, `"fill"`, `"build"`) are kept as the raw
//! strings the backend sends so an unknown tag never fails a whole listing;
//! the typed view is available through accessor methods.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackType {
    Word,
    Grammar,
    Unknown,
}

impl PackType {
    pub fn parse(s: &str) -> Self {
        match s {
            "word" => PackType::Word,
            "grammar" => PackType::Grammar,
            _ => PackType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackType::Word => "word",
            PackType::Grammar => "grammar",
            PackType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarQuestionType {
    Fill,
    Build,
    Unknown,
}

impl GrammarQuestionType {
    pub fn parse(s: &str) -> Self {
        match s {
            "fill" => GrammarQuestionType::Fill,
            "build" => GrammarQuestionType::Build,
            _ => GrammarQuestionType::Unknown,
        }
    }
}

/// Response of `/api/education/lessons`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LessonCatalog {
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl LessonCatalog {
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn pack_count(&self) -> usize {
        self.modules.iter().map(Module::pack_count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Module {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn pack_count(&self) -> usize {
        self.lessons.iter().map(|l| l.packs.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_id: Option<i64>,
    #[serde(default)]
    pub packs: Vec<Pack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Pack {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub lesson_id: Option<i64>,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Pack {
    pub fn pack_type(&self) -> PackType {
        PackType::parse(&self.kind)
    }
}

/// Response of `/api/quiz/quiz`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct QuizCatalog {
    #[serde(default)]
    pub word_packs: Vec<WordPack>,
    #[serde(default)]
    pub grammar_packs: Vec<GrammarPack>,
}

impl QuizCatalog {
    pub fn word_count(&self) -> usize {
        self.word_packs.iter().map(|p| p.words.len()).sum()
    }

    pub fn grammar_question_count(&self) -> usize {
        self.grammar_packs.iter().map(|p| p.grammars.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct WordPack {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub lesson_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Word {
    pub id: i64,
    pub russian_text: String,
    pub uzbek_text: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GrammarPack {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub lesson_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub grammars: Vec<GrammarQuestion>,
}

impl GrammarPack {
    pub fn count_of(&self, kind: GrammarQuestionType) -> usize {
        self.grammars.iter().filter(|g| g.question_type() == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GrammarQuestion {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_option: Option<u32>,
    #[serde(default)]
    pub sentence: Option<String>,
}

impl GrammarQuestion {
    pub fn question_type(&self) -> GrammarQuestionType {
        GrammarQuestionType::parse(&self.kind)
    }
}

/// Response of `/api/grammar/topics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GrammarTopicList {
    #[serde(default)]
    pub topics: Vec<GrammarTopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct GrammarTopic {
    pub id: i64,
    #[serde(default)]
    pub pack_id: Option<i64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub markdown_text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ===== Request bodies =====

#[derive(Debug, Clone, Serialize)]
pub struct NewModule {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewLesson {
    pub module_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPack {
    pub lesson_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWord {
    pub pack_id: i64,
    pub russian_text: String,
    pub uzbek_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGrammarQuestion {
    pub pack_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGrammarTopic {
    pub pack_id: i64,
    pub video_url: String,
    pub markdown_text: String,
}
