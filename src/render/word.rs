//! Word (.docx) rendering of synthesized Q&A pairs.

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Pic, Run, Style, StyleType};
use image::{GenericImageView, ImageFormat};

use crate::error::{Error, Result};
use crate::model::QaPair;

/// English Metric Units per inch.
pub const EMU_PER_INCH: u32 = 914_400;

/// Default embedded picture width.
pub const DEFAULT_IMAGE_WIDTH_INCHES: u32 = 4;

const SEPARATOR_WIDTH: usize = 50;

/// Renders Q&A pairs into a Word document.
#[derive(Debug, Clone, Copy)]
pub struct WordRenderer {
    image_width_emu: u32,
}

impl WordRenderer {
    /// Create a renderer with the default picture width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedded picture width in inches.
    pub fn with_image_width_inches(mut self, inches: u32) -> Self {
        self.image_width_emu = inches * EMU_PER_INCH;
        self
    }

    /// Build the document and return the packed `.docx` bytes.
    pub fn render(&self, title: &str, pairs: &[QaPair]) -> Result<Vec<u8>> {
        let mut docx = Docx::new()
            .add_style(
                Style::new("Title", StyleType::Paragraph)
                    .name("Title")
                    .size(56)
                    .bold(),
            )
            .add_style(
                Style::new("Heading2", StyleType::Paragraph)
                    .name("Heading 2")
                    .size(26)
                    .bold(),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(format!("知识库文档：{}", title)))
                    .style("Title"),
            )
            .add_paragraph(text_paragraph(&format!(
                "本文档包含 {} 个问答对，来源于原始文档的处理和整理。",
                pairs.len()
            )));

        for (i, pair) in pairs.iter().enumerate() {
            docx = docx
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text(format!("Q{}: {}", i + 1, pair.question)))
                        .style("Heading2"),
                )
                .add_paragraph(answer_paragraph(&pair.answer));

            if pair.has_image() {
                if let Some(data) = &pair.image_data {
                    match self.picture(data) {
                        Ok(pic) => {
                            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
                        }
                        Err(e) => log::warn!("Q{}: cannot embed image: {}", i + 1, e),
                    }
                }
            }

            if !pair.keywords.is_empty() {
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("关键词: ").italic())
                        .add_run(Run::new().add_text(pair.keywords.join(", "))),
                );
            }

            docx = docx.add_paragraph(text_paragraph(&"─".repeat(SEPARATOR_WIDTH)));
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buf)
            .map_err(|e| Error::Render(format!("DOCX packaging error: {}", e)))?;
        Ok(buf.into_inner())
    }

    /// Normalize an image payload to PNG and size it to the configured width.
    fn picture(&self, data: &[u8]) -> Result<Pic> {
        let img = image::load_from_memory(data)?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::ImageExtract("image has no pixels".to_string()));
        }

        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)?;

        let width_emu = self.image_width_emu;
        let height_emu = scaled_height(width_emu, width, height);
        Ok(Pic::new(&png.into_inner()).size(width_emu, height_emu))
    }
}

impl Default for WordRenderer {
    fn default() -> Self {
        Self {
            image_width_emu: DEFAULT_IMAGE_WIDTH_INCHES * EMU_PER_INCH,
        }
    }
}

/// Height in EMU that keeps the aspect ratio at `width_emu`, saturating at `u32::MAX`.
fn scaled_height(width_emu: u32, width: u32, height: u32) -> u32 {
    let scaled = u64::from(width_emu) * u64::from(height) / u64::from(width);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// Bold `A: ` followed by the answer, with its line breaks kept.
fn answer_paragraph(answer: &str) -> Paragraph {
    let mut paragraph = Paragraph::new().add_run(Run::new().add_text("A: ").bold());
    for (i, line) in answer.split('\n').enumerate() {
        let mut run = Run::new();
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        paragraph = paragraph.add_run(run.add_text(line));
    }
    paragraph
}
