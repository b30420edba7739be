//! Seams to the outside world: object storage and the generative image edit.
//!
//! The pipeline itself is pure. These helpers chain it with caller-supplied
//! collaborators and turn their failures into [`LogoError::ExternalService`].

use crate::classifier::Plan;
use crate::config::LogoConfig;
use crate::error::{LogoError, Result};
use crate::pipeline::{analyze_and_process_with, enhance_postprocess_with, prepare_for_enhancement_with};
use crate::sizing::LogoBox;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Instructions sent with the pre-processed logo to the generative edit.
pub const ENHANCE_PROMPT: &str = "\
Process this company logo as a careful graphic designer.
1. Make everything outside the logo fully transparent (alpha 0). Leave every pixel that belongs to the logo alone.
2. Keep all colors, text, fonts and shapes exactly as they are, including colored boxes that sit behind text. Do not restyle or recolor anything.
3. If the image is blurry or pixelated, sharpen it so edges are crisp.
4. Add a white stroke exactly 4 pixels wide that hugs the silhouette of every element. The stroke follows each shape's contour and is never a rectangle.
5. Return a transparent PNG cropped tightly around the logo.";

/// Where a stored image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    pub id: String,
    pub url: String,
}

/// Object storage for processed PNGs.
pub trait LogoStore {
    fn store(&self, png: &[u8]) -> anyhow::Result<StoredAsset>;
}

/// Generative image edit: prompt plus PNG in, image bytes out.
pub trait ImageEnhancer {
    fn edit(&self, prompt: &str, png: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// CDN URL that fits the stored image into `logo_box`, e.g.
/// `https://cdn.example/image/upload/c_fit,w_117,h_39/f_png,q_auto/logos/acme`.
pub fn display_url(base: &str, id: &str, logo_box: LogoBox) -> String {
    format!(
        "{}/c_fit,w_{},h_{}/f_png,q_auto/{}",
        base.trim_end_matches('/'),
        logo_box.w,
        logo_box.h,
        id.trim_start_matches('/')
    )
}

/// Response for an uploaded (or enhanced) logo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedLogo {
    pub id: String,
    pub url: String,
    pub display_url: String,
    /// Absent for enhanced logos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(rename = "trimmedAr")]
    pub trimmed_aspect_ratio: f64,
    #[serde(rename = "box")]
    pub logo_box: LogoBox,
    pub skip_enhancement: bool,
}

fn external(context: &str, err: anyhow::Error) -> LogoError {
    warn!(error = %format!("{:#}", err), "{} failed", context);
    LogoError::ExternalService(format!("{}: {:#}", context, err))
}

/// Processes an uploaded logo and stores the resulting PNG.
pub fn upload_logo(
    store: &dyn LogoStore,
    cdn_base: &str,
    bytes: &[u8],
    mime_hint: Option<&str>,
    config: &LogoConfig,
) -> Result<UploadedLogo> {
    let result = analyze_and_process_with(bytes, mime_hint, config)?;
    let png = result.to_png()?;
    let asset = store.store(&png).map_err(|e| external("store", e))?;
    info!(id = %asset.id, plan = result.plan.tag(), "logo uploaded");

    Ok(UploadedLogo {
        display_url: display_url(cdn_base, &asset.id, result.logo_box),
        id: asset.id,
        url: asset.url,
        plan: Some(result.plan),
        trimmed_aspect_ratio: result.trimmed_aspect_ratio,
        logo_box: result.logo_box,
        skip_enhancement: result.skip_enhancement,
    })
}

/// Prepares the original logo, sends it through the generative edit,
/// post-processes the answer and stores it.
pub fn enhance_logo(
    enhancer: &dyn ImageEnhancer,
    store: &dyn LogoStore,
    cdn_base: &str,
    original: &[u8],
    config: &LogoConfig,
) -> Result<UploadedLogo> {
    let prepared = prepare_for_enhancement_with(original, config)?;
    let edited = enhancer
        .edit(ENHANCE_PROMPT, &prepared)
        .map_err(|e| external("generative edit", e))?;
    if edited.is_empty() {
        return Err(LogoError::ExternalService("generative edit returned no image".to_string()));
    }

    let enhanced = enhance_postprocess_with(&edited, config)?;
    let png = enhanced.to_png()?;
    let asset = store.store(&png).map_err(|e| external("store", e))?;
    info!(id = %asset.id, w = enhanced.logo_box.w, h = enhanced.logo_box.h, "enhanced logo uploaded");

    Ok(UploadedLogo {
        display_url: display_url(cdn_base, &asset.id, enhanced.logo_box),
        id: asset.id,
        url: asset.url,
        plan: None,
        trimmed_aspect_ratio: enhanced.trimmed_aspect_ratio,
        logo_box: enhanced.logo_box,
        skip_enhancement: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_raster, encode_png};
    use crate::config::OutlineConfig;
    use crate::pixel_buffer::{Channels, PixelBuffer};
    use anyhow::anyhow;
    use rgb::RGBA8;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<Vec<u8>>>,
    }

    impl LogoStore for MemoryStore {
        fn store(&self, png: &[u8]) -> anyhow::Result<StoredAsset> {
            let mut saved = self.saved.borrow_mut();
            saved.push(png.to_vec());
            let id = format!("logos/{}", saved.len());
            Ok(StoredAsset { url: format!("https://store.test/{}.png", id), id })
        }
    }

    struct FailingStore;

    impl LogoStore for FailingStore {
        fn store(&self, _png: &[u8]) -> anyhow::Result<StoredAsset> {
            Err(anyhow!("quota exceeded"))
        }
    }

    /// Pretends to be the generative edit: returns the logo on a light canvas.
    struct LightCanvasEnhancer {
        prompts: RefCell<Vec<String>>,
    }

    impl ImageEnhancer for LightCanvasEnhancer {
        fn edit(&self, prompt: &str, png: &[u8]) -> anyhow::Result<Vec<u8>> {
            self.prompts.borrow_mut().push(prompt.to_string());
            let logo = decode_raster(png)?;
            let mut canvas = PixelBuffer::filled(
                logo.width + 40,
                logo.height + 40,
                Channels::Rgba,
                RGBA8::new(250, 250, 250, 255),
            );
            for y in 0..logo.height {
                for x in 0..logo.width {
                    if let Some(p) = logo.get(x, y) {
                        canvas.set(x + 20, y + 20, p);
                    }
                }
            }
            Ok(encode_png(&canvas)?)
        }
    }

    struct FailingEnhancer;

    impl ImageEnhancer for FailingEnhancer {
        fn edit(&self, _prompt: &str, _png: &[u8]) -> anyhow::Result<Vec<u8>> {
            Err(anyhow!("rate limited"))
        }
    }

    fn wordmark_png() -> Vec<u8> {
        let mut img = PixelBuffer::filled(400, 200, Channels::Rgb, RGBA8::new(255, 255, 255, 255));
        for y in 70..130 {
            for x in 50..350 {
                img.set(x, y, RGBA8::new(20, 40, 200, 255));
            }
        }
        encode_png(&img).unwrap()
    }

    fn pure_config() -> LogoConfig {
        LogoConfig {
            outline: OutlineConfig::pure(),
            ..LogoConfig::default()
        }
    }

    #[test]
    fn test_display_url() {
        let url = display_url(
            "https://res.cloudinary.com/demo/image/upload/",
            "outlook-signatures/acme",
            LogoBox { w: 117, h: 39 },
        );
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/c_fit,w_117,h_39/f_png,q_auto/outlook-signatures/acme"
        );
    }

    #[test]
    fn test_upload_logo_stores_processed_png() {
        let store = MemoryStore::default();
        let uploaded = upload_logo(&store, "https://cdn.test", &wordmark_png(), None, &pure_config()).unwrap();

        assert_eq!(uploaded.id, "logos/1");
        assert_eq!(uploaded.plan.as_ref().map(Plan::tag), Some("SOLID_BG"));
        assert_eq!(uploaded.logo_box, LogoBox { w: 136, h: 27 });
        assert_eq!(uploaded.display_url, "https://cdn.test/c_fit,w_136,h_27/f_png,q_auto/logos/1");

        let saved = store.saved.borrow();
        let stored = decode_raster(&saved[0]).unwrap();
        assert_eq!((stored.width, stored.height), (340, 100));

        let json = serde_json::to_value(&uploaded).unwrap();
        assert_eq!(json["box"]["w"], 136);
        assert_eq!(json["skipEnhancement"], false);
        assert_eq!(json["displayUrl"], uploaded.display_url.as_str());
    }

    #[test]
    fn test_store_failure_is_external_service_error() {
        let err = upload_logo(&FailingStore, "https://cdn.test", &wordmark_png(), None, &pure_config())
            .unwrap_err();
        match err {
            LogoError::ExternalService(msg) => assert!(msg.contains("quota exceeded")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upload_propagates_decode_errors() {
        let store = MemoryStore::default();
        let err = upload_logo(&store, "https://cdn.test", b"junk", None, &pure_config()).unwrap_err();
        assert!(matches!(err, LogoError::UnsupportedFormat(_)));
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn test_enhance_logo_round_trip() {
        let enhancer = LightCanvasEnhancer { prompts: RefCell::new(Vec::new()) };
        let store = MemoryStore::default();
        let uploaded = enhance_logo(&enhancer, &store, "https://cdn.test", &wordmark_png(), &pure_config())
            .unwrap();

        assert_eq!(enhancer.prompts.borrow().as_slice(), [ENHANCE_PROMPT.to_string()]);
        assert!(uploaded.plan.is_none());
        assert!(uploaded.skip_enhancement);

        // 300x60 logo plus a 4px ring on each side
        let saved = store.saved.borrow();
        let stored = decode_raster(&saved[0]).unwrap();
        assert_eq!((stored.width, stored.height), (308, 68));
        assert_eq!(stored.get(0, 0).map(|p| p.a), Some(0));
        assert_eq!(uploaded.logo_box.w, 136);
    }

    #[test]
    fn test_enhancer_failure_is_external_service_error() {
        let store = MemoryStore::default();
        let err = enhance_logo(&FailingEnhancer, &store, "https://cdn.test", &wordmark_png(), &pure_config())
            .unwrap_err();
        assert!(matches!(err, LogoError::ExternalService(ref m) if m.contains("rate limited")));
        assert!(store.saved.borrow().is_empty());
    }
}
