use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "rgzinfo")]
#[command(version)]
#[command(about = "Inspect gzip header and trailer metadata without decompressing", long_about = None)]
#[command(after_help = "Examples:\n  \
  rgzinfo backup.tar.gz            show header, optional fields and trailer\n  \
  rgzinfo -T backup.tar.gz         show only the trailer (CRC32 and ISIZE)\n  \
  rgzinfo https://example.com/big.gz   inspect a remote file via Range requests")]
pub struct Cli {
    /// gzip file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Show only the member header and its optional fields
    #[arg(short = 'H', long = "header-only", conflicts_with = "trailer_only")]
    pub header_only: bool,

    /// Show only the trailer
    #[arg(short = 'T', long = "trailer-only")]
    pub trailer_only: bool,

    /// Quiet mode (suppress transfer statistics)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}
