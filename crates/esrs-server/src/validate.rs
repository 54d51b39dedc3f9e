//! Offline check of a data directory before serving from it.

use std::path::Path;

use esrs_chat::LLMConfig;
use esrs_core::{CollectionLayout, DataPaths};
use esrs_resolve::SectorTable;
use esrs_store::format::read_collection;

/// One collection as found on disk.
#[derive(Debug)]
pub struct CollectionReport {
    pub name: String,
    pub documents: usize,
    pub dimension: usize,
}

/// Result of validating a data directory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub collections: Vec<CollectionReport>,
    pub sector_codes: usize,
    pub llm_provider: Option<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check the sector table, every collection and the model directories.
pub fn validate(data_dir: &Path, layout: &CollectionLayout) -> ValidationReport {
    let paths = DataPaths::new(data_dir);
    let mut report = ValidationReport::default();

    match SectorTable::load(&paths.sector_table) {
        Ok(table) => {
            report.sector_codes = table.len();
            if table.is_empty() {
                report.warnings.push("Sector classification table is empty".into());
            }
        }
        Err(e) => report.errors.push(e.to_string()),
    }

    let mut dimensions = Vec::new();
    for name in layout.all_collections() {
        match read_collection(&paths.vectorstores.join(name), name) {
            Ok(files) => {
                let (documents, dimension) = files.vectors.dim();
                dimensions.push(dimension);
                report.collections.push(CollectionReport {
                    name: name.to_string(),
                    documents,
                    dimension,
                });
            }
            Err(e) => report.errors.push(e.to_string()),
        }
    }
    dimensions.sort_unstable();
    dimensions.dedup();
    if dimensions.len() > 1 {
        report
            .warnings
            .push(format!("Collections disagree on embedding dimension: {dimensions:?}"));
    }

    for (label, dir) in [("Embedder", &paths.embedder_model), ("Reranker", &paths.reranker_model)] {
        if !dir.join("model.onnx").exists() {
            report
                .warnings
                .push(format!("{label} model not found in {}", dir.display()));
        }
    }

    report.llm_provider = LLMConfig::load(&paths.llm_config_file)
        .resolve_provider()
        .map(|r| format!("{} ({})", r.provider, r.model));
    if report.llm_provider.is_none() {
        report
            .warnings
            .push("No LLM provider configured; answers will degrade".into());
    }

    report
}

pub fn print_report(report: &ValidationReport) {
    println!("=== ESRS Assistant Data Report ===");
    println!();
    println!("Sector codes:       {}", report.sector_codes);
    println!(
        "LLM provider:       {}",
        report.llm_provider.as_deref().unwrap_or("none")
    );
    println!("Collections:");
    for c in &report.collections {
        println!("  - {:<12} {:>6} documents, dim {}", c.name, c.documents, c.dimension);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {}", w);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  - {}", e);
        }
    }

    println!();
    if report.is_valid() {
        println!("Status: READY FOR USE");
    } else {
        println!("Status: INVALID");
    }
}
