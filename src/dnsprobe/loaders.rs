//! File loaders for dictionary and nameserver-list files (§6, §10.5):
//! newline-separated entries, blank lines and `#`-comments skipped.
use std::fs;
use std::net::IpAddr;

use dnslib::error::DNSResult;

use crate::args::parse_server_addr;

fn read_filtered_lines(path: &str) -> DNSResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Loads a dictionary file for batched actions (one entry per line).
pub fn load_dictionary(path: &str) -> DNSResult<Vec<String>> {
    read_filtered_lines(path)
}

/// Loads a nameserver-list file: each remaining line is `addr[:port]` or
/// `[v6addr]:port`.
pub fn load_nameserver_list(path: &str) -> DNSResult<Vec<(IpAddr, u16)>> {
    read_filtered_lines(path)?
        .iter()
        .map(|line| parse_server_addr(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_blank_lines_and_comments() {
        let mut file = tempfile_with_content("a.example.com\n\n# a comment\nb.example.com\n");
        let entries = load_dictionary(file.path_str()).unwrap();
        assert_eq!(entries, vec!["a.example.com".to_string(), "b.example.com".to_string()]);
        file.cleanup();
    }

    #[test]
    fn nameserver_list_parses_mixed_entries() {
        let mut file = tempfile_with_content("192.0.2.1\n# comment\n192.0.2.2:5353\n");
        let entries = load_nameserver_list(file.path_str()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].1, 5353);
        file.cleanup();
    }

    // Minimal scratch-file helper: avoids pulling in a `tempfile` dependency
    // the rest of the pack doesn't use for this kind of fixture.
    struct ScratchFile {
        path: std::path::PathBuf,
    }

    impl ScratchFile {
        fn path_str(&self) -> &str {
            self.path.to_str().unwrap()
        }

        fn cleanup(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn tempfile_with_content(content: &str) -> ScratchFile {
        let mut path = std::env::temp_dir();
        path.push(format!("dnsprobe-test-{}-{}.txt", std::process::id(), content.len()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        ScratchFile { path }
    }
}
