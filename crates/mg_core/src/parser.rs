//! Line-oriented grammars for generative replies.
//!
//! Two formats are understood. Rewritten articles arrive as several records
//! separated by [`ARTICLE_DIVIDER`], each made of `NEW_TITLE:`, `NEW_CONTENT:`
//! and `ORIGINAL_SOURCE:` lines, where content may continue over the following
//! lines. Cover copy arrives as a single record of `KEY: value` lines.
//!
//! Both parsers are driven by a prefix table so the lenient policy of the
//! article grammar (records without a title are dropped) and the strict policy
//! of the cover grammar (indices must be numeric) live in one place each.

use crate::types::{CoverContent, RewrittenArticle, ARTICLE_DIVIDER};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleSection {
    Title,
    Content,
    Source,
}

const ARTICLE_PREFIXES: [(&str, ArticleSection); 3] = [
    ("NEW_TITLE:", ArticleSection::Title),
    ("NEW_CONTENT:", ArticleSection::Content),
    ("ORIGINAL_SOURCE:", ArticleSection::Source),
];

fn match_prefix<'a, T: Copy>(table: &[(&str, T)], line: &'a str) -> Option<(T, &'a str)> {
    table
        .iter()
        .find_map(|(prefix, tag)| line.strip_prefix(prefix).map(|rest| (*tag, rest.trim())))
}

/// Parses a combined rewrite reply. Records without a title are skipped.
pub fn parse_rewritten_articles(reply: &str) -> Vec<RewrittenArticle> {
    reply
        .trim()
        .split(ARTICLE_DIVIDER)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .filter_map(parse_article_record)
        .collect()
}

fn parse_article_record(record: &str) -> Option<RewrittenArticle> {
    let mut article = RewrittenArticle::default();
    let mut cursor = None;

    for line in record.lines() {
        match match_prefix(&ARTICLE_PREFIXES, line) {
            Some((section, value)) => {
                cursor = Some(section);
                let slot = match section {
                    ArticleSection::Title => &mut article.title,
                    ArticleSection::Content => &mut article.content,
                    ArticleSection::Source => &mut article.source_attribution,
                };
                *slot = value.to_string();
            }
            None if cursor == Some(ArticleSection::Content) => {
                article.content.push('\n');
                article.content.push_str(line);
            }
            None => {}
        }
    }

    (!article.title.is_empty()).then_some(article)
}

/// Renders articles in the reply grammar understood by [`parse_rewritten_articles`].
pub fn write_rewritten_articles(articles: &[RewrittenArticle]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                "NEW_TITLE: {}\nNEW_CONTENT: {}\nORIGINAL_SOURCE: {}\n{}",
                article.title, article.content, article.source_attribution, ARTICLE_DIVIDER
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoverKey {
    MainHeadline,
    Subheading,
    MainArticleIndex,
    Summary1Index,
    Summary1,
    Summary2Index,
    Summary2,
}

const COVER_PREFIXES: [(&str, CoverKey); 7] = [
    ("MAIN_HEADLINE:", CoverKey::MainHeadline),
    ("SUBHEADING:", CoverKey::Subheading),
    ("MAIN_ARTICLE_INDEX:", CoverKey::MainArticleIndex),
    ("SUMMARY1_INDEX:", CoverKey::Summary1Index),
    ("SUMMARY1:", CoverKey::Summary1),
    ("SUMMARY2_INDEX:", CoverKey::Summary2Index),
    ("SUMMARY2:", CoverKey::Summary2),
];

impl CoverKey {
    fn name(self) -> &'static str {
        match self {
            CoverKey::MainHeadline => "MAIN_HEADLINE",
            CoverKey::Subheading => "SUBHEADING",
            CoverKey::MainArticleIndex => "MAIN_ARTICLE_INDEX",
            CoverKey::Summary1Index => "SUMMARY1_INDEX",
            CoverKey::Summary1 => "SUMMARY1",
            CoverKey::Summary2Index => "SUMMARY2_INDEX",
            CoverKey::Summary2 => "SUMMARY2",
        }
    }

    fn apply(self, cover: &mut CoverContent, value: &str) -> Result<()> {
        let text = |slot: &mut Option<String>| *slot = Some(value.to_string());
        match self {
            CoverKey::MainHeadline => text(&mut cover.main_headline),
            CoverKey::Subheading => text(&mut cover.subheading),
            CoverKey::Summary1 => text(&mut cover.summary1),
            CoverKey::Summary2 => text(&mut cover.summary2),
            CoverKey::MainArticleIndex => cover.main_article_index = Some(self.index(value)?),
            CoverKey::Summary1Index => cover.summary1_index = Some(self.index(value)?),
            CoverKey::Summary2Index => cover.summary2_index = Some(self.index(value)?),
        }
        Ok(())
    }

    fn index(self, value: &str) -> Result<i64> {
        value.parse().map_err(|_| Error::MalformedCoverContent {
            key: self.name(),
            value: value.to_string(),
        })
    }
}

/// Parses a cover reply. Unknown lines are ignored; non-numeric indices fail.
pub fn parse_cover_content(reply: &str) -> Result<CoverContent> {
    let mut cover = CoverContent::default();
    for line in reply.trim().lines() {
        if let Some((key, value)) = match_prefix(&COVER_PREFIXES, line) {
            key.apply(&mut cover, value)?;
        }
    }
    Ok(cover)
}

/// Renders cover copy in the grammar understood by [`parse_cover_content`].
pub fn write_cover_content(cover: &CoverContent) -> String {
    let mut lines = Vec::new();
    let mut push = |key: CoverKey, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{}: {}", key.name(), value));
        }
    };
    push(CoverKey::MainHeadline, cover.main_headline.clone());
    push(CoverKey::Subheading, cover.subheading.clone());
    push(CoverKey::MainArticleIndex, cover.main_article_index.map(|i| i.to_string()));
    push(CoverKey::Summary1Index, cover.summary1_index.map(|i| i.to_string()));
    push(CoverKey::Summary1, cover.summary1.clone());
    push(CoverKey::Summary2Index, cover.summary2_index.map(|i| i.to_string()));
    push(CoverKey::Summary2, cover.summary2.clone());
    lines.join("\n")
}
