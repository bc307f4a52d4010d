//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;

/// The result of inspecting a dataset.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Format the dataset was read as.
    pub dataset_type: String,
    /// Classes in id order.
    pub classes: Vec<ClassEntry>,
    /// Per-partition counts, in partition order.
    pub partitions: Vec<PartitionStats>,
}

/// One class of the dataset taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassEntry {
    pub id: u64,
    pub name: String,
}

/// Image and annotation counts for one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub name: String,
    pub images: usize,
    pub annotations: usize,
}

impl InspectReport {
    pub fn total_images(&self) -> usize {
        self.partitions.iter().map(|p| p.images).sum()
    }

    pub fn total_annotations(&self) -> usize {
        self.partitions.iter().map(|p| p.annotations).sum()
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────╮")?;
        writeln!(f, "│         Dataset Inspection Report           │")?;
        writeln!(f, "╰─────────────────────────────────────────────╯")?;
        writeln!(f)?;

        writeln!(f, "┌─ Summary")?;
        writeln!(f, "│   Format:        {:>8}", self.dataset_type)?;
        writeln!(f, "│   Classes:       {:>8}", format_number(self.classes.len()))?;
        writeln!(f, "│   Partitions:    {:>8}", format_number(self.partitions.len()))?;
        writeln!(f, "│   Images:        {:>8}", format_number(self.total_images()))?;
        writeln!(
            f,
            "│   Annotations:   {:>8}",
            format_number(self.total_annotations())
        )?;
        writeln!(f, "└─")?;
        writeln!(f)?;

        self.fmt_classes(f)?;
        writeln!(f)?;
        self.fmt_partitions(f)
    }
}

impl InspectReport {
    fn fmt_classes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Classes ({})", self.classes.len())?;
        for class in &self.classes {
            writeln!(f, "│   {:>6}  {}", class.id, truncate_label(&class.name, 40))?;
        }
        writeln!(f, "└─")
    }

    fn fmt_partitions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Partitions ({})", self.partitions.len())?;
        for p in &self.partitions {
            writeln!(
                f,
                "│   {:<16} {:>9} images  {:>9} annotations",
                truncate_label(&p.name, 16),
                format_number(p.images),
                format_number(p.annotations)
            )?;
        }
        writeln!(f, "└─")
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
