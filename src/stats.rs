//! Run statistics.
//!
//! A single [`ImportStats`] value is owned by the loader and updated only
//! through the increment methods here, keeping the counters monotone and
//! `imported <= processed` for both row kinds.

use crate::schema::TagPlan;

/// How many errors the printed summary shows before truncating. The full
/// list is always in the logs.
const SUMMARY_ERROR_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    entities_processed: u64,
    entities_imported: u64,
    relationships_processed: u64,
    relationships_imported: u64,
    errors: Vec<String>,
}

impl ImportStats {
    pub fn add_entities_processed(&mut self, n: usize) {
        self.entities_processed += n as u64;
    }

    pub fn add_entities_imported(&mut self, n: usize) {
        self.entities_imported += n as u64;
    }

    pub fn add_relationships_processed(&mut self, n: usize) {
        self.relationships_processed += n as u64;
    }

    pub fn add_relationships_imported(&mut self, n: usize) {
        self.relationships_imported += n as u64;
    }

    pub fn record_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn entities_processed(&self) -> u64 {
        self.entities_processed
    }

    pub fn entities_imported(&self) -> u64 {
        self.entities_imported
    }

    pub fn relationships_processed(&self) -> u64 {
        self.relationships_processed
    }

    pub fn relationships_imported(&self) -> u64 {
        self.relationships_imported
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Print the human-readable run report. Emitted on every outcome,
    /// success or failure.
    pub fn print_summary(&self, plan: &TagPlan) {
        println!("\n{}", "=".repeat(60));
        println!("GraphRAG import summary");
        println!("{}", "=".repeat(60));
        println!("Entities processed:      {}", self.entities_processed);
        println!("Entities imported:       {}", self.entities_imported);
        println!("Relationships processed: {}", self.relationships_processed);
        println!("Relationships imported:  {}", self.relationships_imported);

        if !plan.is_empty() {
            println!("\nEntity tag distribution:");
            for (tag, group) in plan.iter() {
                println!("  {}: {}", tag, group.expected);
            }
        }

        if !self.errors.is_empty() {
            println!("\nErrors: {}", self.errors.len());
            for (i, error) in self.errors.iter().take(SUMMARY_ERROR_LIMIT).enumerate() {
                println!("  {}. {}", i + 1, error);
            }
            if self.errors.len() > SUMMARY_ERROR_LIMIT {
                println!("  ... and {} more", self.errors.len() - SUMMARY_ERROR_LIMIT);
            }
        }

        println!("{}", "=".repeat(60));
    }
}
