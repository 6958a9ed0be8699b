//! One-page PDF sanction letter

use super::{compute_emi, format_amount, new_loan_id, tenure_label, SanctionGenerator, TENURE_MONTHS};
use crate::error::LoanAssistantError;
use crate::models::SanctionDetails;
use crate::Result;
use async_trait::async_trait;
use chrono::Local;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 20.0;
const RIGHT: f32 = PAGE_WIDTH - 20.0;
const TOP: f32 = PAGE_HEIGHT - 22.0;

const INTRO: &str = "We are pleased to inform you that your Personal Loan application \
has been approved based on our internal credit and risk assessment.";

const DISCLAIMER: &str = "This sanction letter is issued subject to verification of documents, \
completion of all mandatory formalities, and adherence to the terms and conditions of the lender. \
The final loan disbursement is at the sole discretion of the lender and may be modified or \
withdrawn without prior notice in case of material discrepancies.";

/// Writes `Loan_Sanction_<loan id>.pdf` into an output directory.
pub struct PdfSanctionGenerator {
    output_dir: PathBuf,
    lender_name: String,
}

impl PdfSanctionGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, lender_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            lender_name: lender_name.into(),
        }
    }
}

#[async_trait]
impl SanctionGenerator for PdfSanctionGenerator {
    async fn generate(
        &self,
        customer_name: &str,
        loan_amount: u64,
        interest_rate: f64,
    ) -> Result<SanctionDetails> {
        let loan_id = new_loan_id();
        let details = SanctionDetails {
            file_path: self.output_dir.join(format!("Loan_Sanction_{}.pdf", loan_id)),
            loan_id,
            loan_amount,
            interest_rate,
            tenure: tenure_label(),
            emi: compute_emi(loan_amount, interest_rate),
        };

        let letter = LetterContent {
            lender_name: self.lender_name.clone(),
            customer_name: customer_name.to_string(),
            date: Local::now().format("%d-%m-%Y").to_string(),
            details: details.clone(),
        };
        let output_dir = self.output_dir.clone();

        tokio::task::spawn_blocking(move || {
            fs::create_dir_all(&output_dir)?;
            render(&letter, &letter.details.file_path)
        })
        .await
        .map_err(|e| LoanAssistantError::SanctionError(e.to_string()))??;

        info!(
            loan_id = %details.loan_id,
            loan_amount,
            emi = details.emi,
            path = %details.file_path.display(),
            "Sanction letter generated"
        );

        Ok(details)
    }
}

struct LetterContent {
    lender_name: String,
    customer_name: String,
    date: String,
    details: SanctionDetails,
}

fn pdf_err(e: impl std::fmt::Display) -> LoanAssistantError {
    LoanAssistantError::SanctionError(e.to_string())
}

fn render(letter: &LetterContent, path: &Path) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Loan Sanction {}", letter.details.loan_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        String::from("Letter"),
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
    let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?;

    // page border
    layer.set_outline_thickness(1.0);
    layer.add_line(rectangle(12.0, 12.0, PAGE_WIDTH - 12.0, PAGE_HEIGHT - 12.0));

    // watermark
    layer.set_fill_color(Color::Rgb(Rgb::new(0.85, 0.85, 0.85, None)));
    layer.use_text(letter.lender_name.to_uppercase(), 40.0, Mm(45.0), Mm(PAGE_HEIGHT / 2.0), &bold);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    // header
    layer.use_text(format!("{} (Demo)", letter.lender_name), 16.0, Mm(LEFT), Mm(TOP), &bold);
    layer.use_text("PERSONAL LOAN SANCTION LETTER", 13.0, Mm(LEFT), Mm(TOP - 10.0), &bold);
    layer.add_line(horizontal(LEFT, RIGHT, TOP - 14.0));

    layer.use_text(format!("Loan ID: {}", letter.details.loan_id), 10.0, Mm(LEFT), Mm(TOP - 23.0), &regular);
    layer.use_text(format!("Date: {}", letter.date), 10.0, Mm(RIGHT - 40.0), Mm(TOP - 23.0), &regular);

    // intro
    let mut y = TOP - 38.0;
    layer.use_text(format!("Dear {},", letter.customer_name), 11.0, Mm(LEFT), Mm(y), &regular);
    y -= 8.0;
    y = write_wrapped(&layer, &regular, INTRO, 90, 11.0, y, 6.0);
    y -= 4.0;
    layer.use_text(
        "The details of the sanctioned loan are outlined below:",
        11.0,
        Mm(LEFT),
        Mm(y),
        &regular,
    );

    // loan details box
    let box_top = y - 15.0;
    let box_bottom = box_top - 50.0;
    layer.add_line(rectangle(LEFT, box_bottom, RIGHT, box_top));
    layer.use_text("Loan Details", 11.0, Mm(LEFT + 5.0), Mm(box_top - 9.0), &bold);

    let d = &letter.details;
    let rows = [
        format!("Sanctioned Loan Amount : INR {}", format_amount(d.loan_amount)),
        format!("Interest Rate          : {}% per annum", d.interest_rate),
        format!("Loan Tenure            : {} months", TENURE_MONTHS),
        format!("Monthly EMI            : INR {}", format_amount(d.emi)),
    ];
    let mut row_y = box_top - 20.0;
    for row in rows {
        layer.use_text(row, 11.0, Mm(LEFT + 5.0), Mm(row_y), &regular);
        row_y -= 8.5;
    }

    // disclaimer
    let mut y = box_bottom - 12.0;
    layer.use_text("Disclaimer:", 10.5, Mm(LEFT), Mm(y), &bold);
    y -= 7.0;
    y = write_wrapped(&layer, &regular, DISCLAIMER, 95, 10.0, y, 5.5);

    // signature
    y -= 8.0;
    for line in ["Regards,", "Credit Team"] {
        layer.use_text(line, 10.0, Mm(LEFT), Mm(y), &regular);
        y -= 7.0;
    }
    layer.use_text(format!("{} (Demo)", letter.lender_name), 10.0, Mm(LEFT), Mm(y), &regular);

    layer.use_text(
        "This is a system-generated document. No physical signature is required.",
        9.0,
        Mm(45.0),
        Mm(15.0),
        &italic,
    );

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_err)?;
    Ok(())
}

fn write_wrapped(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    width: usize,
    size: f32,
    mut y: f32,
    leading: f32,
) -> f32 {
    for line in wrap(text, width) {
        layer.use_text(line, size, Mm(LEFT), Mm(y), font);
        y -= leading;
    }
    y
}

fn rectangle(x1: f32, y1: f32, x2: f32, y2: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
            (Point::new(Mm(x1), Mm(y2)), false),
        ],
        is_closed: true,
    }
}

fn horizontal(x1: f32, x2: f32, y: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    }
}

/// Greedy word wrap at `width` characters.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
