//! Admin backend endpoints and their typed calls.
//!
//! Reads of slowly-changing data (stats, users, content, leaderboard) go
//! through the cache. Subscriptions, financial figures and the business
//! profile are always fetched fresh.

use crate::models::{
    AdminStats, BusinessProfile, FinancialStats, GrammarQuestion, GrammarTopic, GrammarTopicList,
    LeaderboardEntry, Lesson, LessonCatalog, Module, NewGrammarQuestion, NewGrammarTopic,
    NewLesson, NewModule, NewPack, NewWord, Pack, QuizCatalog, Student, Subscription,
    SubscriptionFilters, Word,
};

use super::client::ApiGateway;
use super::request::{ApiResponse, GetOptions, QueryParams};
use super::ApiError;

pub const AUTH_LOGIN: &str = "/api/admin/login";
pub const AUTH_REFRESH: &str = "/api/auth/refresh";

pub const ADMIN_STATS: &str = "/api/admin/stats";
pub const ADMIN_USERS: &str = "/api/admin/users";

pub const EDUCATION_LESSONS: &str = "/api/education/lessons";
pub const EDUCATION_MODULES: &str = "/api/education/modules";
pub const EDUCATION_PACKS: &str = "/api/education/packs";

pub const QUIZ_DATA: &str = "/api/quiz/quiz";
pub const WORDS: &str = "/api/quiz/words";
pub const GRAMMARS: &str = "/api/quiz/grammars";
pub const GRAMMAR_TOPICS: &str = "/api/grammar/topics";

pub const SUBSCRIPTION_ADMIN: &str = "/api/subscription/admin/subscriptions";
pub const SUBSCRIPTION_FINANCIAL: &str = "/api/subscription/admin/financial";
pub const BUSINESS_PROFILE: &str = "/api/subscription/admin/business";

pub const LEADERBOARD: &str = "/api/leaderboard/leaderboard";

fn cached(force_refresh: bool) -> GetOptions {
    GetOptions::default().force_refresh(force_refresh)
}

impl ApiGateway {
    // ===== Cached reads =====

    pub async fn fetch_stats(&self, force_refresh: bool) -> Result<ApiResponse<AdminStats>, ApiError> {
        self.get(ADMIN_STATS, QueryParams::new(), cached(force_refresh)).await
    }

    pub async fn fetch_users(&self, force_refresh: bool) -> Result<ApiResponse<Vec<Student>>, ApiError> {
        self.get(ADMIN_USERS, QueryParams::new(), cached(force_refresh)).await
    }

    pub async fn fetch_lessons(&self, force_refresh: bool) -> Result<ApiResponse<LessonCatalog>, ApiError> {
        self.get(EDUCATION_LESSONS, QueryParams::new(), cached(force_refresh)).await
    }

    pub async fn fetch_quiz(&self, force_refresh: bool) -> Result<ApiResponse<QuizCatalog>, ApiError> {
        self.get(QUIZ_DATA, QueryParams::new(), cached(force_refresh)).await
    }

    pub async fn fetch_grammar_topics(
        &self,
        force_refresh: bool,
    ) -> Result<ApiResponse<GrammarTopicList>, ApiError> {
        self.get(GRAMMAR_TOPICS, QueryParams::new(), cached(force_refresh)).await
    }

    pub async fn fetch_leaderboard(
        &self,
        force_refresh: bool,
    ) -> Result<ApiResponse<Vec<LeaderboardEntry>>, ApiError> {
        self.get(LEADERBOARD, QueryParams::new(), cached(force_refresh)).await
    }

    // ===== Uncached reads =====

    pub async fn fetch_subscriptions(
        &self,
        filters: &SubscriptionFilters,
    ) -> Result<Vec<Subscription>, ApiError> {
        let response = self
            .get(SUBSCRIPTION_ADMIN, filters.to_params(), GetOptions::uncached())
            .await?;
        Ok(response.data)
    }

    pub async fn fetch_financial_stats(&self) -> Result<FinancialStats, ApiError> {
        let response = self
            .get(SUBSCRIPTION_FINANCIAL, QueryParams::new(), GetOptions::uncached())
            .await?;
        Ok(response.data)
    }

    pub async fn fetch_business_profile(&self) -> Result<BusinessProfile, ApiError> {
        let response = self
            .get(BUSINESS_PROFILE, QueryParams::new(), GetOptions::uncached())
            .await?;
        Ok(response.data)
    }

    // ===== Content writes =====

    pub async fn create_module(&self, module: &NewModule) -> Result<Module, ApiError> {
        self.post(EDUCATION_MODULES, module).await
    }

    pub async fn create_lesson(&self, lesson: &NewLesson) -> Result<Lesson, ApiError> {
        self.post(EDUCATION_LESSONS, lesson).await
    }

    pub async fn update_lesson(&self, lesson_id: i64, lesson: &NewLesson) -> Result<Lesson, ApiError> {
        self.put(&format!("{}/{}", EDUCATION_LESSONS, lesson_id), lesson).await
    }

    pub async fn delete_lesson(&self, lesson_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{}", EDUCATION_LESSONS, lesson_id)).await?;
        Ok(())
    }

    pub async fn create_pack(&self, pack: &NewPack) -> Result<Pack, ApiError> {
        self.post(EDUCATION_PACKS, pack).await
    }

    pub async fn create_word(&self, word: &NewWord) -> Result<Word, ApiError> {
        self.post(WORDS, word).await
    }

    pub async fn create_grammar_question(
        &self,
        question: &NewGrammarQuestion,
    ) -> Result<GrammarQuestion, ApiError> {
        self.post(GRAMMARS, question).await
    }

    pub async fn create_grammar_topic(&self, topic: &NewGrammarTopic) -> Result<GrammarTopic, ApiError> {
        self.post(GRAMMAR_TOPICS, topic).await
    }

    pub async fn update_business_profile(
        &self,
        profile: &BusinessProfile,
    ) -> Result<BusinessProfile, ApiError> {
        self.put(BUSINESS_PROFILE, profile).await
    }
}
