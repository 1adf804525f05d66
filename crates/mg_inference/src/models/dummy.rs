use std::fmt;
use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use mg_core::parser::{write_cover_content, write_rewritten_articles};
use mg_core::{
    ComposeParams, CoverContent, Error, GeneratedImage, ImageRequest, InferenceModel, Result, RewriteParams,
    RewrittenArticle,
};

use crate::payload::read_records;
use crate::Config;

const COVER_WIDTH: u32 = 600;
const COVER_HEIGHT: u32 = 800;

/// Offline model that echoes its payload back in the expected reply formats.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub async fn new(_config: Option<Config>) -> Result<Self> {
        Ok(Self)
    }
}

fn first_sentence(text: &str) -> String {
    let text = text.trim();
    match text.find(['.', '!', '?']) {
        Some(end) => text[..=end].to_string(),
        None => text.to_string(),
    }
}

fn cover_png() -> Result<Vec<u8>> {
    let image = RgbImage::from_fn(COVER_WIDTH, COVER_HEIGHT, |x, y| {
        Rgb([(x * 255 / COVER_WIDTH) as u8, (y * 255 / COVER_HEIGHT) as u8, 160])
    });
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(Error::image_generation)?;
    Ok(bytes.into_inner())
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn rewrite_articles(&self, payload: &str, params: &RewriteParams) -> Result<String> {
        let articles: Vec<RewrittenArticle> = read_records(payload)
            .into_iter()
            .take(params.requested_count as usize)
            .map(|record| RewrittenArticle {
                content: record.body.trim().to_string(),
                source_attribution: format!("{} - {}", record.source, record.title),
                title: record.title,
            })
            .collect();
        Ok(write_rewritten_articles(&articles))
    }

    async fn compose_cover(&self, payload: &str, params: &ComposeParams) -> Result<String> {
        let records = read_records(payload);
        let index_of = |position: usize| records.get(position).map(|r| r.index.unwrap_or(position) as i64);
        let summary_of = |position: usize| records.get(position).map(|r| first_sentence(&r.body));

        let cover = CoverContent {
            main_headline: Some(
                records
                    .first()
                    .map(|r| r.title.clone())
                    .unwrap_or_else(|| params.topic.clone()),
            ),
            subheading: Some(format!("This week in {}", params.topic)),
            main_article_index: index_of(0),
            summary1_index: index_of(1),
            summary1: summary_of(1),
            summary2_index: index_of(2),
            summary2: summary_of(2),
        };
        Ok(write_cover_content(&cover))
    }

    async fn generate_images(&self, prompt: &str, request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        let mut images = vec![GeneratedImage {
            text: Some(format!("Placeholder cover for: {}", prompt)),
            ..GeneratedImage::default()
        }];
        for _ in 0..request.count.max(1) {
            images.push(GeneratedImage {
                bytes: Some(cover_png()?),
                mime_type: Some("image/png".to_string()),
                text: None,
            });
        }
        Ok(images)
    }
}
