//! PDF page counting and page-to-image rendering via Poppler.

use std::path::{Path, PathBuf};
use std::process::Command;

use rayon::prelude::*;

use super::backend::OcrError;
use super::tools::PDFTOPPM_NOT_FOUND;

/// Get the page count of a PDF using pdfinfo.
pub fn pdf_page_count(file_path: &Path) -> Option<u32> {
    let output = Command::new("pdfinfo").arg(file_path).output().ok()?;

    if !output.status.success() {
        return None;
    }

    parse_page_count(&String::from_utf8_lossy(&output.stdout))
}

fn parse_page_count(pdfinfo_stdout: &str) -> Option<u32> {
    pdfinfo_stdout
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

/// Convert a single PDF page to a PNG inside `output_dir`.
pub fn pdf_page_to_image(
    pdf_path: &Path,
    page: u32,
    dpi: u32,
    output_dir: &Path,
) -> Result<PathBuf, OcrError> {
    let page_str = page.to_string();
    let dpi_str = dpi.to_string();
    let output_prefix = output_dir.join("page");

    let status = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
        .arg(pdf_path)
        .arg(&output_prefix)
        .status();

    match status {
        Ok(s) if s.success() => find_page_image(output_dir, page).ok_or_else(|| {
            OcrError::Rasterization(format!("No image generated for page {}", page))
        }),
        Ok(_) => Err(OcrError::Rasterization(format!(
            "pdftoppm failed to convert page {}",
            page
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
            OcrError::BackendNotAvailable(PDFTOPPM_NOT_FOUND.to_string()),
        ),
        Err(e) => Err(OcrError::Io(e)),
    }
}

/// Find the image file for a specific page number.
///
/// pdftoppm names files like page-1.png, page-01.png, page-001.png;
/// the padding width depends on the document's page count.
pub fn find_page_image(temp_path: &Path, page_num: u32) -> Option<PathBuf> {
    for digits in 1..=5 {
        let filename = format!("page-{:0width$}.png", page_num, width = digits);
        let path = temp_path.join(&filename);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Render pages `1..=page_count` to images, using up to `threads` workers.
///
/// Each page renders into its own subdirectory of `output_dir`. The returned
/// list is in page order regardless of which worker finished first. A
/// rendering error fails the whole document.
pub fn render_pages(
    pdf_path: &Path,
    page_count: u32,
    dpi: u32,
    threads: usize,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, OcrError> {
    if page_count == 0 {
        return Err(OcrError::Rasterization("document has no pages".to_string()));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, page_count as usize))
        .build()
        .map_err(|e| OcrError::Rasterization(format!("Failed to start render pool: {}", e)))?;

    pool.install(|| {
        (1..=page_count)
            .into_par_iter()
            .map(|page| {
                let page_dir = output_dir.join(format!("p{:05}", page));
                std::fs::create_dir_all(&page_dir)?;
                pdf_page_to_image(pdf_path, page, dpi, &page_dir)
            })
            .collect()
    })
}

/// Render a whole document in one pdftoppm call, for when the page count is unknown.
pub fn render_document(pdf_path: &Path, dpi: u32, output_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let dpi_str = dpi.to_string();
    let status = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi_str])
        .arg(pdf_path)
        .arg(output_dir.join("page"))
        .status();

    match status {
        Ok(s) if s.success() => {}
        Ok(_) => {
            return Err(OcrError::Rasterization(
                "pdftoppm failed to convert PDF".to_string(),
            ))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OcrError::BackendNotAvailable(PDFTOPPM_NOT_FOUND.to_string()))
        }
        Err(e) => return Err(OcrError::Io(e)),
    }

    let mut images: Vec<PathBuf> = std::fs::read_dir(output_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .collect();
    // zero-padded names sort in page order
    images.sort();

    if images.is_empty() {
        return Err(OcrError::Rasterization(
            "No images generated from PDF".to_string(),
        ));
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_page_count() {
        let stdout = "Title:          Data Sheet\nProducer:       x\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(stdout), Some(12));
        assert_eq!(parse_page_count("Title: nothing"), None);
    }

    #[test]
    fn test_find_page_image_not_found() {
        let temp = TempDir::new().unwrap();
        assert!(find_page_image(temp.path(), 1).is_none());
    }

    #[test]
    fn test_find_page_image_with_2_digit_padding() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("page-01.png");
        std::fs::write(&path, b"fake png").unwrap();

        assert_eq!(find_page_image(temp.path(), 1), Some(path));
    }

    #[test]
    fn test_find_page_image_unpadded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("page-3.png");
        std::fs::write(&path, b"fake png").unwrap();

        assert_eq!(find_page_image(temp.path(), 3), Some(path));
    }

    #[test]
    fn test_render_pages_rejects_empty_document() {
        let temp = TempDir::new().unwrap();
        let result = render_pages(Path::new("missing.pdf"), 0, 300, 2, temp.path());
        assert!(matches!(result, Err(OcrError::Rasterization(_))));
    }

    #[test]
    fn test_render_pages_propagates_page_failure() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.pdf");

        // pdftoppm either fails on the missing input or is not installed
        let result = render_pages(&missing, 3, 72, 2, temp.path());
        assert!(matches!(
            result,
            Err(OcrError::Rasterization(_)) | Err(OcrError::BackendNotAvailable(_))
        ));
    }
}
