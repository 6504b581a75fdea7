/// File categorization by name and extension.
///
/// This module maps a file's base name and lowercase extension to a broad
/// category (e.g., "Images", "Archives"). Rules live in one immutable ordered
/// table built at startup; the first rule whose extension set contains the
/// extension wins, so overlapping extensions (`.bat` is both code and an
/// executable) resolve deterministically.
///
/// # Examples
///
/// ```
/// use desksort::file_category::{Category, Classifier};
///
/// let classifier = Classifier::new();
/// assert_eq!(classifier.categorize("report.pdf", ".pdf"), Category::Pdfs);
/// assert_eq!(classifier.categorize("photo.jpg", ".jpg"), Category::Images);
/// assert_eq!(classifier.categorize("Screenshot 2024.png", ".png"), Category::Screenshots);
/// ```
use std::collections::HashSet;
use std::path::Path;

/// A broad file category, used as the destination folder bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (PNG, JPG, HEIC, etc.)
    Images,
    /// Images whose name matches a screenshot heuristic.
    Screenshots,
    /// Text documents (DOCX, TXT, MD, etc.)
    Documents,
    /// PDF files.
    Pdfs,
    /// Spreadsheets (XLSX, CSV, etc.)
    Spreadsheets,
    /// Presentations (PPTX, KEY, etc.)
    Presentations,
    /// Archives (ZIP, TAR, 7Z, etc.)
    Archives,
    /// Audio files (MP3, FLAC, etc.)
    Audio,
    /// Video files (MP4, MKV, etc.)
    Video,
    /// Source code and config files.
    Code,
    /// Design tool documents (PSD, Sketch, etc.)
    Design,
    /// Font files (TTF, WOFF, etc.)
    Fonts,
    /// Executables and installers.
    Executables,
    /// Shortcut / link files.
    Shortcuts,
    /// Ebook formats (EPUB, MOBI, etc.)
    Ebooks,
    /// Columnar data files (Parquet, Arrow, etc.)
    Data,
    /// Jupyter notebooks.
    Notebooks,
    /// Anything not matched by a rule.
    Other,
}

impl Category {
    /// Returns the folder name files of this category are moved into.
    ///
    /// # Examples
    ///
    /// ```
    /// use desksort::file_category::Category;
    ///
    /// assert_eq!(Category::Pdfs.dir_name(), "PDFs");
    /// assert_eq!(Category::Other.dir_name(), "Other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Screenshots => "Screenshots",
            Category::Documents => "Documents",
            Category::Pdfs => "PDFs",
            Category::Spreadsheets => "Spreadsheets",
            Category::Presentations => "Presentations",
            Category::Archives => "Archives",
            Category::Audio => "Audio",
            Category::Video => "Video",
            Category::Code => "Code",
            Category::Design => "Design",
            Category::Fonts => "Fonts",
            Category::Executables => "Executables",
            Category::Shortcuts => "Shortcuts",
            Category::Ebooks => "Ebooks",
            Category::Data => "Data",
            Category::Notebooks => "Notebooks",
            Category::Other => "Other",
        }
    }
}

/// Lowercase name prefixes that flag an image as a screenshot.
const SCREENSHOT_PREFIXES: &[&str] = &[
    "screen shot",
    "screen_shot",
    "snip",
    "snipping",
    "screencap",
];

/// The category table, in evaluation order. First match wins.
///
/// Screenshots is intentionally absent: it is a pseudo-rule on top of the
/// Images extensions, applied by name before this table is consulted.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp", ".heic", ".svg",
            ".ico",
        ],
    ),
    (
        Category::Documents,
        &[
            ".doc", ".docx", ".odt", ".rtf", ".txt", ".md", ".tex", ".pages", ".log",
        ],
    ),
    (Category::Pdfs, &[".pdf"]),
    (
        Category::Spreadsheets,
        &[".xls", ".xlsx", ".xlsm", ".ods", ".csv", ".tsv"],
    ),
    (Category::Presentations, &[".ppt", ".pptx", ".key", ".odp"]),
    (
        Category::Archives,
        &[
            ".zip", ".tar", ".gz", ".tgz", ".bz2", ".tbz2", ".xz", ".7z", ".rar",
        ],
    ),
    (
        Category::Audio,
        &[
            ".mp3", ".wav", ".aac", ".flac", ".m4a", ".ogg", ".wma", ".aiff",
        ],
    ),
    (
        Category::Video,
        &[".mp4", ".mov", ".mkv", ".avi", ".wmv", ".webm", ".m4v"],
    ),
    (
        Category::Code,
        &[
            ".py", ".js", ".ts", ".tsx", ".jsx", ".java", ".c", ".cpp", ".cs", ".go", ".rb",
            ".php", ".rs", ".swift", ".kt", ".m", ".h", ".sql", ".json", ".yml", ".yaml", ".toml",
            ".ini", ".sh", ".bat", ".ps1",
        ],
    ),
    (
        Category::Design,
        &[".psd", ".ai", ".xd", ".fig", ".sketch", ".indd"],
    ),
    (Category::Fonts, &[".ttf", ".otf", ".woff", ".woff2"]),
    (
        Category::Executables,
        &[".exe", ".msi", ".bat", ".cmd", ".app", ".apk", ".dmg", ".pkg"],
    ),
    (Category::Shortcuts, &[".lnk", ".url", ".webloc"]),
    (Category::Ebooks, &[".epub", ".mobi", ".azw3", ".ibooks"]),
    (Category::Data, &[".parquet", ".feather", ".arrow", ".orc"]),
    (Category::Notebooks, &[".ipynb"]),
];

/// One (category, extension set) rule from the table.
#[derive(Debug, Clone)]
struct CategoryRule {
    category: Category,
    extensions: HashSet<&'static str>,
}

/// Classifies files into categories by extension and screenshot heuristics.
///
/// Construct once at startup; classification is pure, total, and
/// deterministic — it never touches the filesystem.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    /// Builds the classifier from the built-in ordered category table.
    pub fn new() -> Self {
        let rules = CATEGORY_RULES
            .iter()
            .map(|(category, extensions)| CategoryRule {
                category: *category,
                extensions: extensions.iter().copied().collect(),
            })
            .collect();
        Self { rules }
    }

    /// Returns the category for a file's base name and dotted extension.
    ///
    /// The extension must include the leading dot; an empty string means the
    /// file has no extension. Screenshot detection runs first and only
    /// promotes files that would otherwise be Images.
    pub fn categorize(&self, file_name: &str, extension: &str) -> Category {
        let extension = extension.to_lowercase();

        if self.is_image_extension(&extension) && is_screenshot_name(file_name) {
            return Category::Screenshots;
        }

        for rule in &self.rules {
            if rule.extensions.contains(extension.as_str()) {
                return rule.category;
            }
        }

        Category::Other
    }

    /// Convenience wrapper: categorize a path by its file name and extension.
    pub fn categorize_path(&self, path: &Path) -> Category {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.categorize(&file_name, &extension)
    }

    fn is_image_extension(&self, extension: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.category == Category::Images)
            .is_some_and(|rule| rule.extensions.contains(extension))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Heuristic: does this file name look like a screenshot?
///
/// Case-insensitive; matches a "screenshot" substring anywhere or one of the
/// known capture-tool prefixes.
pub fn is_screenshot_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.contains("screenshot")
        || SCREENSHOT_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}
