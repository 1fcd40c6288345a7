//! Display helpers for sizes and counts.

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count with base 1024, rounded to two decimals
/// (e.g. "0 Bytes", "1.5 KB", "2 MB").
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Size column text: `-` for directories or unknown sizes.
pub fn format_size(size: Option<u64>, is_directory: bool) -> String {
    match size {
        Some(bytes) if !is_directory => format_bytes(bytes),
        _ => "-".to_string(),
    }
}

pub fn result_count_label(count: usize) -> String {
    if count == 1 {
        "1 resultado".to_string()
    } else {
        format!("{count} resultados")
    }
}

pub fn partial_results_notice(total: u32, folders_visited: u32) -> String {
    format!(
        "Búsqueda detenida por timeout. Se encontraron {total} resultados en {folders_visited} carpetas"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn directories_have_no_size() {
        assert_eq!(format_size(Some(4096), true), "-");
        assert_eq!(format_size(None, false), "-");
        assert_eq!(format_size(Some(1024), false), "1 KB");
    }

    #[test]
    fn count_label_is_pluralised() {
        assert_eq!(result_count_label(0), "0 resultados");
        assert_eq!(result_count_label(1), "1 resultado");
        assert_eq!(result_count_label(2), "2 resultados");
    }
}
