//! Plain-text rendering of backend data for the terminal.

use std::fmt::Write;

use lessondesk_core::models::{
    AdminStats, FinancialStats, GrammarTopicList, LeaderboardEntry, LessonCatalog, QuizCatalog,
    Student, Subscription,
};
use lessondesk_core::utils::{format_currency, format_date, format_number, format_phone, truncate};
use lessondesk_core::ResponseSource;

/// Column width for names in tables
const NAME_WIDTH: usize = 28;

/// Suffix marking data served from the cache.
pub fn source_note(source: ResponseSource) -> &'static str {
    match source {
        ResponseSource::Cache => " (cached)",
        ResponseSource::Network => "",
    }
}

pub fn stats(stats: &AdminStats, source: ResponseSource) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Platform{}", source_note(source));
    let _ = writeln!(out, "  Users            {:>10}", format_number(stats.total_users));
    let _ = writeln!(
        out,
        "  Active (7 days)  {:>10}  {:.1}%",
        format_number(stats.active_users_last_7_days),
        stats.engagement_rate()
    );
    let _ = writeln!(out, "  Modules          {:>10}", format_number(stats.total_modules));
    let _ = writeln!(out, "  Lessons          {:>10}", format_number(stats.total_lessons));
    let _ = writeln!(out, "  Packs            {:>10}", format_number(stats.total_packs));
    let _ = writeln!(out, "  Words            {:>10}", format_number(stats.total_words));
    let _ = writeln!(
        out,
        "  Grammar items    {:>10}",
        format_number(stats.total_grammar_questions)
    );
    let _ = writeln!(out, "  Content per user {:>10.1}", stats.content_per_user());
    out
}

pub fn financial(stats: &FinancialStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Revenue");
    let _ = writeln!(out, "  Total            {}", format_currency(stats.total_revenue, "USD"));
    let _ = writeln!(out, "  This month       {}", format_currency(stats.monthly_revenue, "USD"));
    let _ = writeln!(
        out,
        "  Subscriptions    {} active / {} paid",
        format_number(stats.active_subscriptions),
        format_number(stats.total_paid_subscriptions)
    );
    let _ = writeln!(
        out,
        "  Average value    {}",
        format_currency(stats.average_subscription_value, "USD")
    );
    out
}

pub fn students(students: &[&Student], source: ResponseSource) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} students{}", students.len(), source_note(source));
    for student in students {
        let phone = student
            .phone_number
            .as_deref()
            .map(format_phone)
            .unwrap_or_else(|| "-".to_string());
        let joined = student.created_at.as_deref().map(format_date).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:>5}  {:<width$}  {:<18}  {}",
            student.id,
            truncate(&student.full_name(), NAME_WIDTH),
            phone,
            joined,
            width = NAME_WIDTH
        );
    }
    out
}

pub fn leaderboard(entries: &[LeaderboardEntry], source: ResponseSource) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Leaderboard{}", source_note(source));
    for (position, entry) in entries.iter().enumerate() {
        let name = [entry.first_name.as_deref(), entry.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let name = if name.is_empty() {
            format!("User #{}", entry.user_id)
        } else {
            name
        };
        let rank = entry.rank.unwrap_or(position as u32 + 1);
        let _ = writeln!(
            out,
            "  {:>3}. {:<width$} {:>8}",
            rank,
            truncate(&name, NAME_WIDTH),
            entry.total_points,
            width = NAME_WIDTH
        );
    }
    out
}

pub fn content(lessons: &LessonCatalog, quiz: &QuizCatalog, topics: &GrammarTopicList) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} modules, {} lessons, {} packs, {} words, {} grammar items, {} topics",
        lessons.modules.len(),
        lessons.lesson_count(),
        lessons.pack_count(),
        quiz.word_count(),
        quiz.grammar_question_count(),
        topics.topics.len()
    );
    for module in &lessons.modules {
        let _ = writeln!(out, "  [{}] {}", module.id, module.title);
        for lesson in &module.lessons {
            let _ = writeln!(
                out,
                "      [{}] {} ({} packs)",
                lesson.id,
                lesson.title,
                lesson.packs.len()
            );
        }
    }
    out
}

pub fn subscriptions(subscriptions: &[Subscription]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} subscriptions", subscriptions.len());
    for sub in subscriptions {
        let days = match sub.days_remaining() {
            Some(days) if days >= 0 => format!("{} days left", days),
            _ => String::new(),
        };
        let _ = writeln!(
            out,
            "  {:>5}  user {:>6}  {:<8}  {:>14}  {} - {}  {}",
            sub.id,
            sub.user_id,
            sub.status().label(),
            format_currency(sub.amount, &sub.currency),
            sub.start_date.as_deref().map(format_date).unwrap_or_default(),
            sub.end_date.as_deref().map(format_date).unwrap_or_default(),
            days
        );
    }
    out
}
