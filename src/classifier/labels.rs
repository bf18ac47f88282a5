// labels.rs - Class label loading
// One label per line, index-aligned with the model's output vector.

use std::fs;
use std::path::Path;

/// Labels used when the label file is missing or unreadable.
pub const DEFAULT_LABELS: [&str; 9] = [
    "CPU",
    "GPU",
    "RAM",
    "Motherboard",
    "Sata SSD",
    "NVMe SSD",
    "HDD",
    "PSU",
    "Air Cooling",
];

pub fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|label| label.to_string()).collect()
}

/// Reads the label file, falling back to [`DEFAULT_LABELS`] with a warning.
pub fn load_labels(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let labels = parse_labels(&content);
            log::info!("[LABELS] Loaded {} labels from {}", labels.len(), path.display());
            labels
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("[LABELS] Labels file not found at {}. Using default labels.", path.display());
            default_labels()
        }
        Err(e) => {
            log::warn!(
                "[LABELS] Error reading labels file from {}: {}. Using default labels.",
                path.display(),
                e
            );
            default_labels()
        }
    }
}

fn parse_labels(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let labels = load_labels(Path::new("definitely/not/here/labels.txt"));
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "CPU");
        assert_eq!(labels[8], "Air Cooling");
    }

    #[test]
    fn test_reads_labels_in_file_order() {
        let path = std::env::temp_dir().join(format!("labels_{}.txt", uuid::Uuid::new_v4()));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, "  GPU \nCPU\r\n\nPSU\n").unwrap();
        }

        let labels = load_labels(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(labels, vec!["GPU", "CPU", "PSU"]);
    }
}
