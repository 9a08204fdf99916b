use std::path::Path;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};
use crate::xml::escape_xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    /// Pick the format from the output file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Render {
                message: "output file has no extension".to_string(),
            })?
            .to_ascii_lowercase();

        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(Error::Render {
                message: format!(
                    "unsupported output format: .{} (use .svg, .png or .pdf)",
                    ext
                ),
            }),
        }
    }
}

/// Wrap a rendered map fragment in a standalone SVG document.
pub fn wrap_document(inner: &str, width: f64, height: f64, padding: f64, background: &str) -> String {
    let total_w = width + padding * 2.0;
    let total_h = height + padding * 2.0;

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_w:.2}" height="{total_h:.2}" viewBox="0 0 {total_w:.2} {total_h:.2}">
<rect width="{total_w:.2}" height="{total_h:.2}" fill="{background}"/>
<g transform="translate({padding:.2},{padding:.2})">
{inner}
</g>
</svg>"#,
        background = escape_xml(background),
    )
}

/// Write `svg` to `path`, converting to PNG or PDF when the extension asks
/// for it.
pub fn write_output(path: &Path, svg: &str, png_scale: f32) -> Result<()> {
    let bytes = match OutputFormat::from_path(path)? {
        OutputFormat::Svg => svg.as_bytes().to_vec(),
        OutputFormat::Png => svg_to_png(svg, png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(svg)?,
    };

    std::fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::Render {
            message: format!("invalid PNG scale: {}", scale),
        });
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        load_fonts(fontdb);
        let families: Vec<String> = fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
            .collect();
        if let Some(family) = pick_label_family(&families) {
            fontdb.set_sans_serif_family(family);
        }
    }

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| Error::Render {
        message: format!("failed to parse SVG: {}", e),
    })?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| Error::Render {
        message: format!("failed to create a {}x{} pixmap", width, height),
    })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| Error::Render {
        message: format!("failed to encode PNG: {}", e),
    })
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    use svg2pdf::usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        db.load_fonts_dir(local_fonts);
    }
    let families: Vec<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(family, _)| family.clone()))
        .collect();
    if let Some(family) = pick_label_family(&families) {
        db.set_sans_serif_family(family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(db),
        ..Default::default()
    };

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts).map_err(|e| Error::Render {
        message: format!("failed to parse SVG: {}", e),
    })?;

    // Labels go out as paths so viewers without the font still show them.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };

    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default()).map_err(|e| Error::Render {
        message: format!("failed to convert SVG to PDF: {}", e),
    })
}

fn load_fonts(fontdb: &mut usvg::fontdb::Database) {
    fontdb.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        fontdb.load_fonts_dir(local_fonts);
    }
}

/// Family to use for line labels: the first sans family, else whatever is
/// installed first.
fn pick_label_family(families: &[String]) -> Option<&str> {
    families
        .iter()
        .find(|family| family.to_ascii_lowercase().contains("sans"))
        .or_else(|| families.first())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("map.SVG")).unwrap(), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("a/map.png")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("map.pdf")).unwrap(), OutputFormat::Pdf);
        assert!(OutputFormat::from_path(Path::new("map.gif")).is_err());
        assert!(OutputFormat::from_path(Path::new("map")).is_err());
    }

    #[test]
    fn document_is_padded() {
        let doc = wrap_document("<g/>", 100.0, 50.0, 10.0, "#fff");
        assert!(doc.contains(r#"width="120.00" height="70.00""#));
        assert!(doc.contains(r#"translate(10.00,10.00)"#));
        assert!(doc.contains("<g/>"));
    }

    #[test]
    fn label_family_prefers_sans() {
        let families = vec!["Serif One".to_string(), "Noto Sans".to_string()];
        assert_eq!(pick_label_family(&families), Some("Noto Sans"));
        let families = vec!["Serif One".to_string()];
        assert_eq!(pick_label_family(&families), Some("Serif One"));
        assert_eq!(pick_label_family(&[]), None);
    }

    #[test]
    fn png_rejects_bad_scale() {
        assert!(matches!(svg_to_png("<svg/>", 0.0), Err(Error::Render { .. })));
        assert!(matches!(svg_to_png("<svg/>", f32::NAN), Err(Error::Render { .. })));
    }

    #[test]
    fn png_output_has_signature() {
        let svg = wrap_document(r#"<rect width="10" height="10" fill="red"/>"#, 10.0, 10.0, 2.0, "#fff");
        let png = svg_to_png(&svg, 1.0).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
