use std::path::Path;

use chrono::{DateTime, TimeZone};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{ChangeSet, CommitMessage};

const LISTED_FILES: usize = 10;

const ENCOURAGEMENTS: &[&str] = &[
    "Working on features",
    "Progress update",
    "Development session",
    "Code improvements",
    "Feature development",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Code,
    Style,
    Markup,
    Data,
    Docs,
    Config,
}

impl Category {
    /// Header order.
    pub const ALL: [Category; 6] = [
        Category::Code,
        Category::Style,
        Category::Markup,
        Category::Data,
        Category::Docs,
        Category::Config,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            Category::Code => &["js", "py", "java", "cpp", "c", "go", "rs", "ts", "jsx", "tsx"],
            Category::Style => &["css", "scss", "sass", "less"],
            Category::Markup => &["html", "xml", "svg"],
            Category::Data => &["json", "yaml", "yml", "csv"],
            Category::Docs => &["md", "txt", "pdf"],
            Category::Config => &["config", "env", "gitignore"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Code => "code files",
            Category::Style => "styles",
            Category::Markup => "markup",
            Category::Data => "data files",
            Category::Docs => "documentation",
            Category::Config => "config",
        }
    }

    /// Bare dotfiles (`.env`, `.gitignore`) classify by name, which is the only way into `Config`.
    pub fn classify(path: &str) -> Option<Category> {
        let ext = extension(path)?;
        Category::ALL
            .into_iter()
            .find(|category| category.extensions().iter().any(|e| *e == ext))
    }
}

/// Lowercased extension; a bare dotfile such as `.env` counts as its own extension.
fn extension(path: &str) -> Option<String> {
    let path = Path::new(path);
    let ext = match path.extension() {
        Some(ext) => ext.to_str()?,
        None => path.file_name()?.to_str()?.strip_prefix('.')?,
    };
    Some(ext.to_lowercase())
}

/// `Update: styles (2), documentation (1)`, or `Update: N file(s)` when nothing classified.
pub fn header(changes: &ChangeSet) -> String {
    let mut counts = [0usize; 6];
    for path in &changes.paths {
        if let Some(category) = Category::classify(path) {
            counts[category as usize] += 1;
        }
    }

    let parts: Vec<String> = Category::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| format!("{} ({})", category.label(), count))
        .collect();

    if parts.is_empty() {
        format!("Update: {} file(s)", changes.len())
    } else {
        format!("Update: {}", parts.join(", "))
    }
}

pub fn synthesize<R, Tz>(changes: &ChangeSet, rng: &mut R, now: DateTime<Tz>) -> CommitMessage
where
    R: Rng + ?Sized,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let encouragement = ENCOURAGEMENTS.choose(rng).copied().unwrap_or("Progress update");

    let mut listing: Vec<String> = changes
        .paths
        .iter()
        .take(LISTED_FILES)
        .map(|path| format!("- {path}"))
        .collect();
    if changes.len() > LISTED_FILES {
        listing.push(format!("- ... and {} more", changes.len() - LISTED_FILES));
    }

    let text = format!(
        "{}\n\n{}\n\nModified files:\n{}\n\nAuto-committed: {}",
        header(changes),
        encouragement,
        listing.join("\n"),
        now.format("%Y-%m-%d %H:%M:%S %:z"),
    );

    CommitMessage::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn changes(paths: &[&str]) -> ChangeSet {
        ChangeSet::new(paths.iter().map(|p| p.to_string()).collect())
    }

    fn numbered(n: usize) -> ChangeSet {
        ChangeSet::new((0..n).map(|i| format!("file{i}.rs")).collect())
    }

    #[test]
    fn header_counts_categories_in_fixed_order() {
        assert_eq!(
            header(&changes(&["a.css", "b.css", "c.md"])),
            "Update: styles (2), documentation (1)"
        );
        assert_eq!(
            header(&changes(&["README.md", "main.rs", ".env", "data.JSON"])),
            "Update: code files (1), data files (1), documentation (1), config (1)"
        );
    }

    #[test]
    fn header_falls_back_to_file_count() {
        assert_eq!(header(&changes(&["Makefile", "logo.png"])), "Update: 2 file(s)");
    }

    #[test]
    fn unmatched_files_are_left_out_of_tally() {
        assert_eq!(header(&changes(&["logo.png", "index.html"])), "Update: markup (1)");
    }

    #[test]
    fn short_sets_list_every_path() {
        let mut rng = StdRng::seed_from_u64(7);
        let msg = synthesize(&numbered(10), &mut rng, Utc::now());

        for i in 0..10 {
            assert!(msg.as_str().contains(&format!("- file{i}.rs\n")));
        }
        assert!(!msg.as_str().contains("more"));
    }

    #[test]
    fn long_sets_are_truncated_with_overflow_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let msg = synthesize(&numbered(13), &mut rng, Utc::now());

        assert!(msg.as_str().contains("- file9.rs\n"));
        assert!(!msg.as_str().contains("file10.rs"));
        assert!(msg.as_str().contains("- ... and 3 more"));
    }

    #[test]
    fn same_seed_same_message() {
        let now = Utc.with_ymd_and_hms(2025, 12, 10, 9, 30, 0).unwrap();
        let set = changes(&["a.css"]);

        let first = synthesize(&set, &mut StdRng::seed_from_u64(42), now);
        let second = synthesize(&set, &mut StdRng::seed_from_u64(42), now);

        assert_eq!(first, second);
        assert_eq!(first.header(), "Update: styles (1)");
        assert!(first.as_str().ends_with("Auto-committed: 2025-12-10 09:30:00 +00:00"));
        let line = first.as_str().lines().nth(2).unwrap();
        assert!(ENCOURAGEMENTS.iter().any(|e| *e == line));
    }
}
