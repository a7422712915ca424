//! PDF renderer.
//!
//! Draws the report onto A4 pages using the base-14 Helvetica fonts. Layout is
//! a single top-to-bottom cursor; a table that runs off the page continues on
//! the next one with its header row repeated.

use super::fonts::{text_width, win_ansi, wrap};
use super::format::{section_table, Table};
use super::{Footnote, RenderError, Report, Section};
use crate::domain::Category;
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::path::Path;

const PAGE_W: f32 = 595.28;
const PAGE_H: f32 = 841.89;
/// 15 mm
const MARGIN: f32 = 42.5;
/// Space kept free above the bottom margin for the page number.
const FOOTER_H: f32 = 20.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;

const ROW_H: f32 = 13.0;
const BODY_SIZE: f32 = 7.5;
const NOTE_LEADING: f32 = 10.0;

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

type Rgb = (f32, f32, f32);

const NAVY: Rgb = (0.122, 0.306, 0.475);
const STEEL: Rgb = (0.180, 0.459, 0.714);
const GOLD: Rgb = (0.749, 0.561, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);
const GRAY: Rgb = (0.5, 0.5, 0.5);
const GRID: Rgb = (0.816, 0.816, 0.816);
const STRIPE: Rgb = (0.961, 0.969, 0.980);
const STRIPE_GOLD: Rgb = (1.0, 0.973, 0.882);

pub const TITLE: &str = "Daily Market Dashboard";

const DISCLAIMER: &str = "Data source: Yahoo Finance. Returns are price-only approximations. \
     Bond yield changes in basis points. This report is auto-generated and not financial advice.";

/// A fully rendered report, ready to attach.
///
/// Only [`render_pdf`] produces one, so holding a `RenderedDocument` means the
/// document was completed.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    filename: String,
    bytes: Vec<u8>,
    page_count: usize,
}

impl RenderedDocument {
    /// Attachment file name, e.g. `Market_Dashboard_20261019.pdf`.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    /// Persist the document, e.g. as a build artifact.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Render the report to PDF bytes.
pub fn render_pdf(report: &Report) -> Result<RenderedDocument, RenderError> {
    report.validate()?;

    let mut canvas = Canvas::new();
    draw_title(&mut canvas, report);
    for section in &report.sections {
        draw_section(&mut canvas, section);
    }
    draw_footnotes(&mut canvas, &report.footnotes());
    draw_disclaimer(&mut canvas);

    let mut pages = canvas.finish();
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        let label = format!("Page {} of {}", i + 1, total);
        let x = (PAGE_W - text_width(&label, 7.0)) / 2.0;
        put_text(page, x, MARGIN + 4.0, FONT_REGULAR, 7.0, GRAY, &label);
    }

    let bytes = assemble(pages);
    log::debug!("rendered {} page(s), {} bytes", total, bytes.len());

    Ok(RenderedDocument {
        filename: format!("Market_Dashboard_{}.pdf", report.generated_at.format("%Y%m%d")),
        bytes,
        page_count: total,
    })
}

/// Cursor-based page writer.
struct Canvas {
    done: Vec<Content>,
    page: Content,
    /// Top of the next element, in PDF user space (origin bottom-left).
    y: f32,
}

impl Canvas {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            page: Content::new(),
            y: PAGE_H - MARGIN,
        }
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN + FOOTER_H
    }

    fn new_page(&mut self) {
        let full = std::mem::replace(&mut self.page, Content::new());
        self.done.push(full);
        self.y = PAGE_H - MARGIN;
    }

    fn ensure(&mut self, height: f32) -> bool {
        if self.fits(height) {
            false
        } else {
            self.new_page();
            true
        }
    }

    fn text(&mut self, x: f32, baseline: f32, font: Name, size: f32, color: Rgb, s: &str) {
        put_text(&mut self.page, x, baseline, font, size, color, s);
    }

    fn text_centered(&mut self, cx: f32, baseline: f32, font: Name, size: f32, color: Rgb, s: &str) {
        let x = cx - text_width(s, size) / 2.0;
        self.text(x, baseline, font, size, color, s);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.page.set_fill_rgb(color.0, color.1, color.2);
        self.page.rect(x, y, w, h);
        self.page.fill_nonzero();
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32, width: f32, color: Rgb) {
        self.page.set_stroke_rgb(color.0, color.1, color.2);
        self.page.set_line_width(width);
        self.page.move_to(x1, y);
        self.page.line_to(x2, y);
        self.page.stroke();
    }

    fn finish(mut self) -> Vec<Content> {
        self.done.push(self.page);
        self.done
    }
}

fn put_text(content: &mut Content, x: f32, baseline: f32, font: Name, size: f32, color: Rgb, s: &str) {
    let encoded = win_ansi(s);
    content.set_fill_rgb(color.0, color.1, color.2);
    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, baseline);
    content.show(Str(&encoded));
    content.end_text();
}

fn draw_title(canvas: &mut Canvas, report: &Report) {
    let center = PAGE_W / 2.0;
    let top = canvas.y;
    canvas.text_centered(center, top - 18.0, FONT_BOLD, 18.0, NAVY, TITLE);

    let subtitle = format!(
        "{}  |  Generated at {} {}",
        report.generated_at.format("%A, %B %d, %Y"),
        report.generated_at.format("%I:%M %p"),
        report.zone_label
    );
    canvas.text_centered(center, top - 34.0, FONT_REGULAR, 9.0, GRAY, &subtitle);
    canvas.hline(MARGIN, PAGE_W - MARGIN, top - 42.0, 1.5, NAVY);
    canvas.y = top - 50.0;
}

fn column_widths(category: Category) -> Vec<f32> {
    let horizons = category.horizons().len();
    let fixed = [50.0, 112.0, 68.0];
    let each = if horizons >= 7 { 40.0 } else { 60.0 };
    let mut widths = fixed.to_vec();
    widths.extend(std::iter::repeat(each).take(horizons));
    widths
}

fn header_color(category: Category) -> Rgb {
    match category {
        Category::Equity | Category::Crypto => NAVY,
        Category::BondYield => STEEL,
        Category::Metal => GOLD,
    }
}

fn stripe_color(category: Category) -> Rgb {
    match category {
        Category::Metal => STRIPE_GOLD,
        _ => STRIPE,
    }
}

fn draw_section(canvas: &mut Canvas, section: &Section) {
    let table = section_table(section);
    let widths = column_widths(section.category);

    // keep the heading with the header row and at least one data row
    canvas.ensure(18.0 + 2.0 * ROW_H);
    let top = canvas.y;
    canvas.text(MARGIN, top - 13.0, FONT_BOLD, 11.0, NAVY, section.title());
    canvas.y = top - 18.0;

    draw_header_row(canvas, &table, &widths, header_color(section.category));

    for (i, row) in table.rows.iter().enumerate() {
        if canvas.ensure(ROW_H) {
            draw_header_row(canvas, &table, &widths, header_color(section.category));
        }
        let bottom = canvas.y - ROW_H;
        let total_w: f32 = widths.iter().sum();
        if i % 2 == 1 {
            canvas.fill_rect(MARGIN, bottom, total_w, ROW_H, stripe_color(section.category));
        }

        let mut x = MARGIN;
        for (col, (cell, w)) in row.iter().zip(&widths).enumerate() {
            let baseline = bottom + 4.0;
            if col < 2 {
                canvas.text(x + 3.0, baseline, FONT_REGULAR, BODY_SIZE, cell.tone.rgb(), &cell.text);
            } else {
                canvas.text_centered(x + w / 2.0, baseline, FONT_REGULAR, BODY_SIZE, cell.tone.rgb(), &cell.text);
            }
            x += w;
        }
        canvas.hline(MARGIN, MARGIN + total_w, bottom, 0.4, GRID);
        canvas.y = bottom;
    }

    canvas.y -= 8.0;
}

fn draw_header_row(canvas: &mut Canvas, table: &Table, widths: &[f32], color: Rgb) {
    let bottom = canvas.y - ROW_H;
    let total_w: f32 = widths.iter().sum();
    canvas.fill_rect(MARGIN, bottom, total_w, ROW_H, color);

    let mut x = MARGIN;
    for (col, (header, w)) in table.headers.iter().zip(widths).enumerate() {
        let baseline = bottom + 4.0;
        if col < 2 {
            canvas.text(x + 3.0, baseline, FONT_BOLD, BODY_SIZE, WHITE, header);
        } else {
            canvas.text_centered(x + w / 2.0, baseline, FONT_BOLD, BODY_SIZE, WHITE, header);
        }
        x += w;
    }
    canvas.y = bottom;
}

fn draw_paragraph(canvas: &mut Canvas, text: &str, color: Rgb) {
    for line in wrap(text, BODY_SIZE, CONTENT_W) {
        canvas.ensure(NOTE_LEADING);
        let baseline = canvas.y - BODY_SIZE;
        canvas.text(MARGIN, baseline, FONT_REGULAR, BODY_SIZE, color, &line);
        canvas.y -= NOTE_LEADING;
    }
}

fn draw_footnotes(canvas: &mut Canvas, notes: &[Footnote]) {
    for note in notes {
        let line = format!("* {} ({}): {}", note.symbol, note.label, note.text);
        draw_paragraph(canvas, &line, GRAY);
    }
}

fn draw_disclaimer(canvas: &mut Canvas) {
    canvas.ensure(6.0 + 2.0 * NOTE_LEADING);
    canvas.y -= 4.0;
    canvas.hline(MARGIN, PAGE_W - MARGIN, canvas.y, 0.5, GRID);
    canvas.y -= 4.0;
    draw_paragraph(canvas, DISCLAIMER, GRAY);
}

/// Write the page contents into a PDF file.
///
/// Object layout: 1 catalog, 2 page tree, 3/4 fonts, 5 info, then
/// page and content stream pairs.
fn assemble(pages: Vec<Content>) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);

    let page_id = |i: usize| Ref::new(6 + 2 * i as i32);
    let content_id = |i: usize| Ref::new(7 + 2 * i as i32);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids((0..pages.len()).map(page_id))
        .count(pages.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.document_info(info_id)
        .title(TextStr(TITLE))
        .creator(TextStr("marketdash"));

    for (i, content) in pages.into_iter().enumerate() {
        let mut page = pdf.page(page_id(i));
        page.media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H));
        page.parent(tree_id);
        page.contents(content_id(i));
        page.resources()
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        page.finish();

        pdf.stream(content_id(i), &content.finish());
    }

    pdf.finish()
}
