use mg_core::{ComposeParams, CoverContent, RewriteParams, RewrittenArticle, ARTICLE_DIVIDER};

pub fn rewrite_prompt(payload: &str, params: &RewriteParams) -> String {
    format!(
        "You are the content rewriter of a magazine about {topic}.\n\
         Below are source news articles, each introduced by INDEX, TITLE, TEXT and SOURCE lines \
         and closed by the line {divider}.\n\
         Rewrite the {count} most relevant articles in {language} as original magazine pieces. \
         Keep every fact, drop advertising and boilerplate, and never invent quotes.\n\
         Reply with one block per rewritten article, in this exact format and nothing else:\n\
         NEW_TITLE: <new title>\n\
         NEW_CONTENT: <rewritten article, paragraphs may span several lines>\n\
         ORIGINAL_SOURCE: <SOURCE of the article> - <original TITLE>\n\
         {divider}\n\n\
         {payload}",
        topic = params.topic,
        divider = ARTICLE_DIVIDER,
        count = params.requested_count,
        language = params.language,
        payload = payload,
    )
}

pub fn compose_prompt(payload: &str, params: &ComposeParams) -> String {
    format!(
        "You are the cover designer of a magazine about {topic}.\n\
         These are the {count} articles of this issue, each introduced by INDEX, TITLE, CONTENT \
         and SOURCE lines and closed by the line {divider}.\n\
         Write the cover copy in {language}. Pick the main story and two more stories to summarize, \
         referring to them by their INDEX.\n\
         Reply with exactly these lines and nothing else:\n\
         MAIN_HEADLINE: <headline for the main story>\n\
         SUBHEADING: <one sentence subheading>\n\
         MAIN_ARTICLE_INDEX: <INDEX of the main story>\n\
         SUMMARY1_INDEX: <INDEX of the first summarized story>\n\
         SUMMARY1: <one sentence summary>\n\
         SUMMARY2_INDEX: <INDEX of the second summarized story>\n\
         SUMMARY2: <one sentence summary>\n\n\
         {payload}",
        topic = params.topic,
        count = params.article_count,
        divider = ARTICLE_DIVIDER,
        language = params.language,
        payload = payload,
    )
}

/// Cover image prompt. The headlined article enriches it when its index resolves.
pub fn cover_image_prompt(topic: &str, cover: Option<&CoverContent>, articles: &[RewrittenArticle]) -> String {
    let mut prompt = format!("Generate a cover image for a magazine about {}.", topic);
    if let Some(cover) = cover {
        if let Some(headline) = &cover.main_headline {
            prompt.push_str(&format!(" The cover headline reads: \"{}\".", headline));
        }
        if let Some(article) = cover.main_article(articles) {
            prompt.push_str(&format!(
                " Base it on this news article: {}\n{}",
                article.title, article.content
            ));
        }
    }
    prompt.push_str(" Do not render any text in the image.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_prompt_carries_params_and_payload() {
        let params = RewriteParams {
            topic: "ocean".to_string(),
            language: "pt-BR".to_string(),
            requested_count: 6,
        };
        let prompt = rewrite_prompt("INDEX:0\nTITLE:Reef", &params);
        assert!(prompt.contains("magazine about ocean"));
        assert!(prompt.contains("Rewrite the 6 most relevant articles in pt-BR"));
        assert!(prompt.contains("NEW_TITLE:"));
        assert!(prompt.ends_with("INDEX:0\nTITLE:Reef"));
    }

    #[test]
    fn test_cover_image_prompt_ignores_out_of_range_index() {
        let articles = vec![RewrittenArticle {
            title: "Whales return".to_string(),
            content: "Pods were seen.".to_string(),
            source_attribution: String::new(),
        }];
        let mut cover = CoverContent {
            main_headline: Some("Giants of the deep".to_string()),
            main_article_index: Some(0),
            ..CoverContent::default()
        };
        let prompt = cover_image_prompt("ocean", Some(&cover), &articles);
        assert!(prompt.contains("Giants of the deep"));
        assert!(prompt.contains("Whales return"));

        cover.main_article_index = Some(4);
        let prompt = cover_image_prompt("ocean", Some(&cover), &articles);
        assert!(!prompt.contains("Whales return"));
        assert!(prompt.starts_with("Generate a cover image for a magazine about ocean."));
    }
}
