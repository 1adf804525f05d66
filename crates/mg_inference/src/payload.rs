//! Combined prompt payloads: one `INDEX/TITLE/TEXT/SOURCE` record per article,
//! each closed by the article divider.

use mg_core::{RewrittenArticle, SourceArticle, ARTICLE_DIVIDER};

fn write_record(out: &mut String, index: usize, title: &str, body_key: &str, body: &str, source: &str) {
    out.push_str(&format!("INDEX:{}\n", index));
    out.push_str(&format!("TITLE:{}\n", title));
    out.push_str(&format!("{}:{}\n", body_key, body));
    out.push_str(&format!("SOURCE:{}\n", source));
    out.push_str(ARTICLE_DIVIDER);
    out.push('\n');
}

pub fn write_source_records(articles: &[SourceArticle]) -> String {
    let mut out = String::new();
    for (index, article) in articles.iter().enumerate() {
        write_record(&mut out, index, &article.title, "TEXT", &article.text, &article.source_domain);
    }
    out
}

pub fn write_rewritten_records(articles: &[RewrittenArticle]) -> String {
    let mut out = String::new();
    for (index, article) in articles.iter().enumerate() {
        write_record(
            &mut out,
            index,
            &article.title,
            "CONTENT",
            &article.content,
            &article.source_attribution,
        );
    }
    out
}

/// A record read back from a payload, used by the offline model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadRecord {
    pub index: Option<usize>,
    pub title: String,
    pub body: String,
    pub source: String,
}

pub fn read_records(payload: &str) -> Vec<PayloadRecord> {
    payload
        .split(ARTICLE_DIVIDER)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(|record| {
            let mut parsed = PayloadRecord::default();
            let mut in_body = false;
            for line in record.lines() {
                if let Some(value) = line.strip_prefix("INDEX:") {
                    parsed.index = value.trim().parse().ok();
                    in_body = false;
                } else if let Some(value) = line.strip_prefix("TITLE:") {
                    parsed.title = value.trim().to_string();
                    in_body = false;
                } else if let Some(value) = line.strip_prefix("TEXT:").or_else(|| line.strip_prefix("CONTENT:")) {
                    parsed.body = value.to_string();
                    in_body = true;
                } else if let Some(value) = line.strip_prefix("SOURCE:") {
                    parsed.source = value.trim().to_string();
                    in_body = false;
                } else if in_body {
                    parsed.body.push('\n');
                    parsed.body.push_str(line);
                }
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_payload_layout() {
        let articles = vec![SourceArticle {
            title: "Quake".to_string(),
            url: "https://www.news.com/q".to_string(),
            text: "Line one\nLine two".to_string(),
            source_domain: "news.com".to_string(),
            image: None,
        }];
        assert_eq!(
            write_source_records(&articles),
            "INDEX:0\nTITLE:Quake\nTEXT:Line one\nLine two\nSOURCE:news.com\n---ARTICLE DIVIDER---\n"
        );
    }

    #[test]
    fn test_read_records_back() {
        let articles = vec![
            RewrittenArticle {
                title: "First".to_string(),
                content: "A\nB".to_string(),
                source_attribution: "one.com - First".to_string(),
            },
            RewrittenArticle {
                title: "Second".to_string(),
                content: "C".to_string(),
                source_attribution: "two.com".to_string(),
            },
        ];
        let records = read_records(&write_rewritten_records(&articles));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, Some(0));
        assert_eq!(records[0].body, "A\nB");
        assert_eq!(records[1].title, "Second");
        assert_eq!(records[1].source, "two.com");
    }
}
