use crate::handle::{Handle, HandleOption};
use crate::heartbeat::Heartbeat;

/// Rewrites path-like fields on every heartbeat before forwarding.
/// A pure transform; never fails.
pub fn with_formatting<'a>() -> HandleOption<'a> {
    Box::new(|next: Handle<'a>| {
        Box::new(move |heartbeats: Vec<Heartbeat>| {
            tracing::debug!("formatting heartbeat file paths");
            let formatted = heartbeats.into_iter().map(format_heartbeat).collect();
            next(formatted)
        })
    })
}

/// Near-identity transform. Windows path normalization is opt-in via
/// [`format_windows_file_path`] and not applied here.
pub fn format_heartbeat(heartbeat: Heartbeat) -> Heartbeat {
    heartbeat
}

/// Normalize a windows file path: collapse runs of backslashes and slashes
/// into a single forward slash, and uppercase a lowercase drive letter.
///
/// The drive rule only fires when the colon is already followed by a
/// forward slash.
pub fn format_windows_file_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let uppercase_drive =
        bytes.len() >= 3 && bytes[0].is_ascii_lowercase() && bytes[1] == b':' && bytes[2] == b'/';

    let mut out = String::with_capacity(path.len());
    let mut prev_separator = false;
    for (i, c) in path.chars().enumerate() {
        if c == '\\' || c == '/' {
            if !prev_separator {
                out.push('/');
            }
            prev_separator = true;
            continue;
        }
        prev_separator = false;
        if i == 0 && uppercase_drive {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
