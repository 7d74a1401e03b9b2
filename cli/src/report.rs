//! Terminal rendering of results.

use colored::Colorize;
use doclayout::diagnostics::{self, KeyInspection};
use doclayout::extract::ExtractionReport;
use doclayout::service::ProcessorInfo;
use doclayout::{DatasetSummary, DocumentRecord, PdfCheck, ProcessedDocument};

fn heading(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
}

/// Print a hint for an error, if one is known.
pub fn print_hint(err: &doclayout::Error) {
    if let Some(hint) = diagnostics::hint_for(err) {
        println!("  {} {}", "hint:".yellow(), hint);
    }
}

pub fn print_summary(summary: &DatasetSummary, records: &[DocumentRecord]) {
    heading("Processing Summary");
    println!("{}: {}", "Documents".bold(), summary.total_documents);
    println!(
        "{}: {} ({:.1}%)",
        "Successful".bold(),
        summary.successful_documents.to_string().green(),
        summary.success_rate()
    );
    if summary.failed_documents > 0 {
        println!("{}: {}", "Failed".bold(), summary.failed_documents.to_string().red());
    }
    println!("{}: {}", "Pages".bold(), summary.total_pages);
    println!(
        "{}: {:.1}",
        "Pages per document".bold(),
        summary.average_pages_per_document
    );
    println!(
        "{}: {} blocks, {} paragraphs, {} tables, {} form fields",
        "Extracted".bold(),
        summary.total_blocks,
        summary.total_paragraphs,
        summary.total_tables,
        summary.total_form_fields
    );

    let failures: Vec<_> = records.iter().filter_map(DocumentRecord::as_failure).collect();
    if !failures.is_empty() {
        heading("Failures");
        for failure in failures {
            println!(
                "{} {} [{}, {} attempts]",
                "✗".red(),
                failure.file_path,
                failure.error_kind,
                failure.attempts
            );
            println!("  {}", failure.error.dimmed());
        }
    }
}

/// Detailed view of one processed document.
pub fn print_document(doc: &ProcessedDocument) {
    heading("Processing Results");
    println!("{}: {}", "File".bold(), doc.file_name);
    println!("{}: {}", "Pages".bold(), doc.document_info.total_pages);
    println!("{}: {} characters", "Text length".bold(), doc.document_info.text_length);
    println!("{}: {}", "Processed".bold(), doc.processing_timestamp.to_rfc3339());

    if !doc.pages.is_empty() {
        heading("Pages");
        for page in &doc.pages {
            println!("Page {}: {}x{}", page.page_number, page.width, page.height);
            println!(
                "  {} blocks, {} paragraphs, {} lines, {} tokens, {} tables, {} form fields",
                page.blocks_count,
                page.paragraphs_count,
                page.lines_count,
                page.tokens_count,
                page.tables_count,
                page.form_fields_count
            );
        }
    }

    let blocks: Vec<_> = doc.blocks.iter().filter_map(|b| b.record()).take(3).collect();
    if !blocks.is_empty() {
        heading("Sample Blocks");
        for (i, block) in blocks.iter().enumerate() {
            println!(
                "Block {} (page {}): {}",
                i + 1,
                block.page_number,
                doclayout::extract::preview(&block.text, 100)
            );
        }
    }

    if !doc.tables.is_empty() {
        heading(&format!("Tables ({})", doc.tables.len()));
        for (i, table) in doc.tables.iter().enumerate() {
            println!(
                "Table {} (page {}): {} rows, {} cells{}",
                i + 1,
                table.page_number,
                table.rows_count,
                table.cells.len(),
                if table.has_merged_cells() { ", merged cells" } else { "" }
            );
        }
    }

    if !doc.form_fields.is_empty() {
        heading(&format!("Form Fields ({})", doc.form_fields.len()));
        for (i, field) in doc.form_fields.iter().take(5).enumerate() {
            if !field.is_blank() {
                println!("Field {}: '{}' = '{}'", i + 1, field.field_name, field.field_value);
            }
        }
    }
}

pub fn print_extraction(report: &ExtractionReport, min_length: usize) {
    println!(
        "{} {} documents ({} successful)",
        "Loaded".green(),
        report.documents,
        report.successful_documents
    );
    println!(
        "{} {} paragraphs out of {} (min length {})",
        "Extracted".green(),
        report.extracted,
        report.total_paragraphs,
        min_length
    );

    let Some(path) = &report.output_path else {
        println!("{}", "No paragraphs matched; nothing written".yellow());
        return;
    };

    heading("Extraction Complete");
    println!("{}: {}", "Records".bold(), report.extracted);
    println!("{}: {}", "Output".bold(), path.display());
    println!("{}: {:.2} MB", "Size".bold(), report.file_size_mb());

    if !report.samples.is_empty() {
        heading("Samples");
        for (i, sample) in report.samples.iter().enumerate() {
            println!("{}. {}", i + 1, sample);
        }
    }
}

pub fn print_pdf_check(check: &PdfCheck) {
    println!("{} {}", "Checking".cyan(), check.path.display());
    println!("  Size: {} bytes ({:.1} MB)", check.size, check.size_mb());

    match &check.format {
        Some(format) => {
            let linearized = if format.linearized { ", linearized" } else { "" };
            println!("  {} {} header{}", "✓".green(), format, linearized);
        }
        None => {
            println!("  {} no valid PDF header", "✗".red());
            println!("  First bytes: {:?}", String::from_utf8_lossy(&check.leading_bytes));
            return;
        }
    }

    let warnings = check.warnings();
    if warnings.is_empty() {
        println!("  {} ending, encryption and structure look fine", "✓".green());
    }
    for warning in warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
}

pub fn print_key(key: &KeyInspection, configured_project: &str) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "MISSING".red().to_string());
    println!("{}: {}", "Key file".bold(), key.path.display());
    println!("  Type: {}", show(&key.key_type));
    println!("  Project ID: {}", show(&key.project_id));
    println!("  Client email: {}", show(&key.client_email));
    println!("  Client ID: {}", show(&key.client_id));

    if !key.is_service_account() {
        println!("  {} not a service-account key", "✗".red());
    }
    if !key.missing.is_empty() {
        println!("  {} missing fields: {}", "!".yellow(), key.missing.join(", "));
    }

    if key.project_mismatch(configured_project) {
        println!(
            "  {} project_id in config ({}) does not match the key; \
             this commonly causes permission errors",
            "!".yellow(),
            configured_project
        );
    } else {
        println!("  {} project IDs match", "✓".green());
    }
}

pub fn print_processor(info: &ProcessorInfo, configured: bool) {
    let marker = if configured { "*".green().bold().to_string() } else { " ".to_string() };
    let state = if info.is_enabled() {
        info.state.green()
    } else {
        info.state.yellow()
    };
    println!(
        "{} {}  {}  {}  {}",
        marker,
        info.id().bold(),
        info.display_name,
        info.processor_type.dimmed(),
        state
    );
}
