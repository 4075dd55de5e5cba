//! Main entry point for the rgzinfo CLI application.
//!
//! This binary provides a command-line interface for inspecting the header
//! and trailer of gzip files on the local filesystem or behind HTTP URLs.
//! All human-readable rendering lives here; the library only produces
//! structured values.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use rgzinfo::{
    Cli, CompressionMethod, GzipHeader, GzipInspector, GzipTrailer, HttpRangeReader,
    LocalFileReader, OptionalFields, ReadAt,
};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate reader
/// based on whether the input is a local file or HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_http_url() {
        // Inspect a remote gzip file via HTTP Range requests
        let reader = HttpRangeReader::new(cli.file.clone()).await?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        inspect(reader.clone(), &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        // Inspect a local gzip file
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.file))?);
        inspect(reader, &cli).await?;
    }

    Ok(())
}

/// Run the requested inspection and render the results.
///
/// The header must decode before its optional fields; the trailer is
/// independent of both, so `-T` skips the header parse entirely and `-H`
/// never touches the end of the file.
async fn inspect<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let inspector = GzipInspector::new(reader);

    if cli.trailer_only {
        let trailer = inspector.read_trailer().await?;
        print_trailer(&trailer);
        return Ok(());
    }

    if cli.header_only {
        let (header, fields) = inspector.inspect_header().await?;
        print_header(&header, &fields);
        return Ok(());
    }

    let report = inspector.inspect().await?;
    print_header(&report.header, &report.fields);
    print_trailer(&report.trailer);

    Ok(())
}

/// Render the fixed header and its optional fields.
fn print_header(header: &GzipHeader, fields: &OptionalFields) {
    println!("valid gzip file");

    match header.method {
        CompressionMethod::Deflate => println!("standard gzip compression method \"deflate\""),
        CompressionMethod::Unknown(value) => {
            println!("unrecognized compression method 0x{:02x}", value)
        }
    }

    if !header.flags.is_empty() {
        let names: Vec<&str> = header.flags.iter_names().map(|(name, _)| name).collect();
        println!("flags set: {}", names.join(" | "));
    }

    if header.mtime != 0 {
        let (date, time) = format_timestamp(header.mtime);
        println!("creation time: {} {}", date, time);
    }

    println!("XFL: 0x{:x}", header.extra_flags);
    println!(
        "OS: {} (0x{:x})",
        if header.is_unix() { "UNIX" } else { "non-UNIX" },
        header.os
    );

    if let Some(extra) = &fields.extra {
        let dump: Vec<String> = extra.iter().map(|b| format!("0x{:x}", b)).collect();
        println!("extra field: {}", dump.join(" "));
    }

    if let Some(name) = &fields.file_name {
        println!("filename: {}", name);
    }

    if let Some(comment) = &fields.comment {
        println!("comment: {}", comment);
    }

    if let Some(crc) = fields.header_crc {
        println!("header checksum: 0x{:x}", crc);
    }
}

/// Render the trailer fields.
///
/// Both values are reported as stored; checking the CRC32 would require
/// decompressing the payload.
fn print_trailer(trailer: &GzipTrailer) {
    println!("checksum: 0x{:x}", trailer.crc32);
    println!(
        "isize: 0x{:x} ({} bytes)",
        trailer.uncompressed_size, trailer.uncompressed_size
    );
}

/// Convert a Unix timestamp to UTC date and time strings.
///
/// Uses integer civil-calendar math so the renderer does not need a
/// datetime dependency for a single field.
fn format_timestamp(mtime: u32) -> (String, String) {
    let secs = mtime as i64;
    let days = secs.div_euclid(86_400);
    let rem = secs.rem_euclid(86_400);
    let (hour, minute, second) = (rem / 3600, (rem % 3600) / 60, rem % 60);

    // Civil-from-days conversion over the proleptic Gregorian calendar
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    (
        format!("{:04}-{:02}-{:02}", year, month, day),
        format!("{:02}:{:02}:{:02} UTC", hour, minute, second),
    )
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
