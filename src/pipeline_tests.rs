#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::outline::PixelOutline;
    use crate::pixel_buffer::Channels;

    const WHITE: RGBA8 = RGBA8::new(255, 255, 255, 255);
    const CLEAR: RGBA8 = RGBA8::new(0, 0, 0, 0);
    const BLUE: RGBA8 = RGBA8::new(20, 40, 200, 255);
    const RED: RGBA8 = RGBA8::new(210, 30, 40, 255);

    fn paint(img: &mut PixelBuffer, x0: u32, y0: u32, x1: u32, y1: u32, color: RGBA8) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.set(x, y, color);
            }
        }
    }

    fn white_with_square() -> PixelBuffer {
        let mut img = PixelBuffer::filled(200, 200, Channels::Rgb, WHITE);
        paint(&mut img, 75, 75, 125, 125, BLUE);
        img
    }

    fn red_seal(size: u32) -> PixelBuffer {
        let mut img = PixelBuffer::filled(size, size, Channels::Rgba, CLEAR);
        let c = size as f64 / 2.0;
        let radius = size as f64 * 0.45;
        for y in 0..size {
            for x in 0..size {
                let d = ((x as f64 + 0.5 - c).powi(2) + (y as f64 + 0.5 - c).powi(2)).sqrt();
                if d <= radius * 0.5 {
                    img.set(x, y, WHITE);
                } else if d <= radius {
                    img.set(x, y, RED);
                }
            }
        }
        img
    }

    fn png(img: &PixelBuffer) -> Vec<u8> {
        codec::encode_png(img).unwrap()
    }

    #[test]
    fn test_solid_white_background() {
        let result = process_raster(&white_with_square(), &LogoConfig::default()).unwrap();
        assert_eq!(
            result.plan,
            Plan::SolidBackground { hex: "ffffff".to_string(), r: 255, g: 255, b: 255 }
        );
        assert!((result.trimmed_aspect_ratio - 1.0).abs() < 1e-9);
        assert_eq!(result.logo_box, LogoBox { w: 64, h: 64 });
        assert_eq!((result.processed_image.width, result.processed_image.height), (90, 90));
        assert!(!result.processed_image.has_alpha());
        assert_eq!(result.processed_image.get(0, 0), Some(WHITE));
        assert_eq!(result.processed_image.get(45, 45), Some(BLUE));
        assert!(!result.skip_enhancement);
    }

    #[test]
    fn test_opaque_rgba_is_has_alpha() {
        let img = PixelBuffer::filled(300, 100, Channels::Rgba, BLUE);
        let result = process_raster(&img, &LogoConfig::default()).unwrap();
        assert_eq!(result.plan, Plan::HasAlpha);
        assert!((result.trimmed_aspect_ratio - 3.0).abs() < 1e-9);
        assert_eq!(result.logo_box, LogoBox { w: 117, h: 39 });
        assert_eq!((result.processed_image.width, result.processed_image.height), (340, 140));
    }

    #[test]
    fn test_complex_background_keeps_pixels() {
        let mut img = PixelBuffer::filled(120, 60, Channels::Rgb, WHITE);
        for y in 0..60u32 {
            for x in 0..120u32 {
                img.set(x, y, RGBA8::new((x * 2) as u8, (y * 4) as u8, 90, 255));
            }
        }
        let result = process_raster(&img, &LogoConfig::default()).unwrap();
        assert_eq!(result.plan, Plan::ComplexBackground);
        // every pixel differs from the top-left one, so nothing is trimmed
        assert!((result.trimmed_aspect_ratio - 2.0).abs() < 1e-9);
        assert_eq!(result.processed_image.get(20 + 50, 20 + 10), img.get(50, 10));
    }

    #[test]
    fn test_transparent_badge_is_trimmed_and_enlarged() {
        let result = process_raster(&red_seal(200), &LogoConfig::default()).unwrap();
        assert_eq!(result.plan, Plan::Badge);
        assert!(result.skip_enhancement);
        let out = &result.processed_image;
        assert_eq!(out.width.max(out.height), 512);
        assert!(out.has_alpha());
        assert_eq!(result.logo_box.w, 64);
    }

    #[test]
    fn test_opaque_badge_is_only_resized() {
        let mut img = PixelBuffer::filled(200, 200, Channels::Rgb, RED);
        paint(&mut img, 50, 50, 150, 150, WHITE);
        let result = process_raster(&img, &LogoConfig::default()).unwrap();
        assert_eq!(result.plan, Plan::Badge);
        let out = &result.processed_image;
        assert_eq!((out.width, out.height), (512, 512));
        assert_eq!(out.channels, Channels::Rgb);
        // frame color survives, no white padding is added
        let corner = out.get(0, 0).unwrap();
        assert!(corner.r > 180 && corner.g < 80);
    }

    #[test]
    fn test_custom_padding_and_table() {
        let config = LogoConfig {
            process: crate::config::ProcessConfig { padding: 0, ..Default::default() },
            sizes: crate::sizing::SizeTable::compact(),
            ..Default::default()
        };
        let mut img = PixelBuffer::filled(200, 200, Channels::Rgb, WHITE);
        paint(&mut img, 20, 80, 170, 130, BLUE);
        let result = process_raster(&img, &config).unwrap();
        assert_eq!((result.processed_image.width, result.processed_image.height), (150, 50));
        assert_eq!(result.logo_box, LogoBox { w: 106, h: 35 });
    }

    #[test]
    fn test_summary_json() {
        let result = process_raster(&white_with_square(), &LogoConfig::default()).unwrap();
        let json = serde_json::to_value(result.summary()).unwrap();
        assert_eq!(json["plan"]["kind"], "SOLID_BG");
        assert_eq!(json["plan"]["hex"], "ffffff");
        assert_eq!(json["width"], 64);
        assert_eq!(json["height"], 64);
        assert_eq!(json["skipEnhancement"], false);
    }

    #[test]
    fn test_analyze_from_png_bytes() {
        let bytes = png(&white_with_square());
        let result = analyze_and_process(&bytes, Some("image/png")).unwrap();
        assert_eq!(result.plan.tag(), "SOLID_BG");
        let encoded = result.to_png().unwrap();
        let decoded = codec::decode_raster(&encoded).unwrap();
        assert_eq!(decoded, result.processed_image);
    }

    #[test]
    fn test_analyze_svg() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
  <rect x="20" y="20" width="160" height="60" fill="#0a7f3f"/>
</svg>"##;
        let result = analyze_and_process(svg, None).unwrap();
        assert_eq!(result.plan, Plan::Svg);
        assert!(result.skip_enhancement);
        assert!((result.trimmed_aspect_ratio - 160.0 / 60.0).abs() < 0.05);
        assert!(!result.processed_image.has_alpha());
    }

    #[test]
    fn test_analyze_rejects_garbage() {
        assert!(analyze_and_process(b"not an image at all", None).is_err());
        assert!(analyze_and_process(b"", Some("image/png")).is_err());
    }

    #[test]
    fn test_prepare_trims_and_downscales() {
        let mut img = PixelBuffer::filled(1600, 1000, Channels::Rgb, WHITE);
        paint(&mut img, 100, 300, 1500, 650, BLUE);
        let bytes = prepare_for_enhancement(&png(&img)).unwrap();
        let out = codec::decode_raster(&bytes).unwrap();
        assert_eq!((out.width, out.height), (640, 160));
    }

    #[test]
    fn test_prepare_never_enlarges() {
        let mut img = PixelBuffer::filled(100, 100, Channels::Rgb, WHITE);
        paint(&mut img, 10, 10, 60, 40, BLUE);
        let bytes = prepare_for_enhancement(&png(&img)).unwrap();
        let out = codec::decode_raster(&bytes).unwrap();
        assert_eq!((out.width, out.height), (50, 30));
    }

    #[test]
    fn test_enhance_postprocess_outlines_and_trims() {
        let mut img = PixelBuffer::filled(100, 100, Channels::Rgba, RGBA8::new(245, 245, 245, 255));
        paint(&mut img, 30, 30, 70, 70, BLUE);

        let config = LogoConfig::default();
        let enhanced = enhance_postprocess_using(&png(&img), &config, &PixelOutline::default()).unwrap();
        let out = &enhanced.image;

        // 40px square plus a 4px ring on each side
        assert_eq!((out.width, out.height), (48, 48));
        assert_eq!(out.get(24, 24), Some(BLUE));
        assert_eq!(out.get(4, 4), Some(BLUE));
        assert_eq!(out.get(1, 24), Some(WHITE));
        assert_eq!(out.get(0, 0).unwrap().a, 0);
        assert_eq!(enhanced.logo_box, LogoBox { w: 64, h: 64 });
    }

    #[test]
    fn test_enhance_postprocess_already_transparent() {
        let mut img = PixelBuffer::filled(60, 30, Channels::Rgba, CLEAR);
        paint(&mut img, 10, 10, 50, 20, RED);
        let config = LogoConfig { outline: crate::config::OutlineConfig::pure(), ..Default::default() };
        let enhanced = enhance_postprocess_with(&png(&img), &config).unwrap();
        assert_eq!((enhanced.image.width, enhanced.image.height), (48, 18));
        assert!(enhanced.to_png().is_ok());
    }
}
