use clap::Parser;
use std::path::{Path, PathBuf};

use crate::filter::FilterOptions;

/// Archive name used when `-o` is not given.
pub const DEFAULT_OUTPUT: &str = "Manga_Batch.zip";

#[derive(Parser, Debug)]
#[command(name = "mhtzip")]
#[command(version)]
#[command(about = "Extract images from MHTML files into a ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  mhtzip *.mhtml                         pack every chapter into Manga_Batch.zip\n  \
  mhtzip -o vol1.cbz --min-size 20 a.mht  skip images under 20 KB\n  \
  mhtzip -l vol1.cbz                     list the contents of an archive")]
pub struct Cli {
    /// MHTML files (.mht, .mhtml) and loose images; with -l, ZIP archives
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Write the archive to this path
    #[arg(short = 'o', long, value_name = "ZIP", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Skip images smaller than this many kilobytes
    #[arg(long = "min-size", value_name = "KB", default_value_t = 0)]
    pub min_size_kb: usize,

    /// Skip GIF images
    #[arg(long)]
    pub no_gifs: bool,

    /// Reverse page order within each chapter
    #[arg(long)]
    pub reverse: bool,

    /// Overwrite the output archive if it exists
    #[arg(short = 'f', long)]
    pub force: bool,

    /// List archive contents instead of creating one
    #[arg(short = 'l')]
    pub list: bool,

    /// Verbose listing; also report each image the filters skip
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            min_size: self.min_size_kb.saturating_mul(1024),
            exclude_gifs: self.no_gifs,
            reverse: self.reverse,
        }
    }
}

/// Whether `path` names an MHTML file.
pub fn is_mhtml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mht") || e.eq_ignore_ascii_case("mhtml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_options() {
        let cli = Cli::try_parse_from([
            "mhtzip", "--min-size", "20", "--no-gifs", "--reverse", "-o", "out.cbz", "a.mhtml",
        ])
        .unwrap();

        assert_eq!(cli.output, PathBuf::from("out.cbz"));
        assert_eq!(cli.files, vec![PathBuf::from("a.mhtml")]);
        let options = cli.filter_options();
        assert_eq!(options.min_size, 20 * 1024);
        assert!(options.exclude_gifs);
        assert!(options.reverse);
        assert!(!cli.is_quiet());
    }

    #[test]
    fn defaults_and_quiet_levels() {
        let cli = Cli::try_parse_from(["mhtzip", "-qq", "x.mht"]).unwrap();
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(cli.is_very_quiet());

        let cli = Cli::try_parse_from(["mhtzip", "-q", "-l", "x.zip"]).unwrap();
        assert!(cli.is_quiet() && !cli.is_very_quiet());
        assert!(cli.list);
    }

    #[test]
    fn requires_input_files() {
        assert!(Cli::try_parse_from(["mhtzip"]).is_err());
    }

    #[test]
    fn recognizes_mhtml_paths() {
        assert!(is_mhtml(Path::new("dir/Chapter 1.MHTML")));
        assert!(is_mhtml(Path::new("a.mht")));
        assert!(!is_mhtml(Path::new("a.html")));
        assert!(!is_mhtml(Path::new("mht")));
    }
}
