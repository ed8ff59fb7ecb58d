// Outfit generation against the text/image generation provider: one text
// completion, then two image renders fetched concurrently. The operation
// is all-or-nothing; a partial result is never returned.

use anyhow::{anyhow, Context, Result};
use base64::Engine as _;
use rand::Rng;
use reqwest::Client;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{ForecastDay, OutfitResult, StylePreference};

const TEXT_MODEL: &str = "gemini-fast";
const OUTFIT_IMAGE_MODEL: &str = "klein";
const BREAKDOWN_IMAGE_MODEL: &str = "zimage";
const IMAGE_WIDTH: u32 = 768;
const IMAGE_HEIGHT: u32 = 1024;
const SEED_RANGE: u64 = 100_000;

#[derive(Clone)]
pub struct StylistClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl StylistClient {
    pub fn new(client: Arc<Client>, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Produce an outfit description and the two illustrative images for
    /// one forecast day. Any failed step fails the whole operation.
    pub async fn generate(
        &self,
        location: &str,
        day: &ForecastDay,
        style: StylePreference,
    ) -> AppResult<OutfitResult> {
        self.generate_inner(location, day, style)
            .await
            .map_err(AppError::Generation)
    }

    async fn generate_inner(
        &self,
        location: &str,
        day: &ForecastDay,
        style: StylePreference,
    ) -> Result<OutfitResult> {
        let description = self.generate_description(location, day, style).await?;
        tracing::debug!(description = %description, "Outfit description generated");

        let safe_description = sanitize(&description);
        let outfit_prompt = format!(
            "Full body street style photo of a person in {} wearing {}. Weather: {}. \
             High fashion, photorealistic, 8k, cinematic lighting.",
            location, safe_description, day.condition
        );
        let breakdown_prompt = format!(
            "Knolling flat lay photography of fashion items: {}. \
             Clean neutral background, organized layout, high quality product photography.",
            safe_description
        );

        let image_seed = rand::thread_rng().gen_range(0..SEED_RANGE);
        let (outfit_image, breakdown_image) = futures::future::try_join(
            self.fetch_image(&outfit_prompt, OUTFIT_IMAGE_MODEL, image_seed),
            self.fetch_image(&breakdown_prompt, BREAKDOWN_IMAGE_MODEL, image_seed + 1),
        )
        .await?;

        Ok(OutfitResult {
            outfit_image: Some(outfit_image),
            breakdown_image: Some(breakdown_image),
            description,
        })
    }

    /// Short natural-language outfit description from the text endpoint.
    async fn generate_description(
        &self,
        location: &str,
        day: &ForecastDay,
        style: StylePreference,
    ) -> Result<String> {
        let prompt = format!(
            "Describe a stylish, culturally appropriate {} outfit for a person in {} \
             where the weather is {} and temperature is between {}C and {}C. \
             Do not use markdown. Just pure text describing the outfit in 2 sentences.",
            style.prompt_term(),
            location,
            day.condition,
            day.min_temp,
            day.max_temp
        );

        let seed = rand::thread_rng().gen_range(0..SEED_RANGE);
        let url = format!(
            "{}/text/{}?seed={}&model={}",
            self.base_url,
            urlencoding::encode(&sanitize(&prompt)),
            seed,
            TEXT_MODEL
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Text generation request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Text generation failed with status {}", status));
        }

        response
            .text()
            .await
            .context("Failed to read generated description")
    }

    /// Render one image and return it as a data URI.
    async fn fetch_image(&self, prompt: &str, model: &str, seed: u64) -> Result<String> {
        let url = format!(
            "{}/image/{}?model={}&width={}&height={}&nologo=true&seed={}",
            self.base_url,
            urlencoding::encode(prompt),
            model,
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
            seed
        );
        tracing::debug!(model, seed, "Requesting generated image");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("Image request failed (model {})", model))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Image generation failed with status {} (model {})", status, model));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .context("Failed to read generated image body")?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(format!("data:{};base64,{}", content_type, encoded))
    }
}

// Collapse line breaks so a generated description stays a single URL path
// segment after encoding.
fn sanitize(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}
