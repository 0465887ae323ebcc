//! Common directory prefix of file ids, used to shorten displayed paths.

use crate::graph::build::FileGraph;

/// Longest directory prefix shared by every value.
///
/// Only the directory part of each value (everything up to its last `/`)
/// takes part. The candidate starts as the first value's directory and
/// loses one trailing segment at a time until it is a string prefix of
/// every value's directory. Fewer than two values yield `""`.
#[must_use]
pub fn longest_common_prefix(values: &[&str]) -> String {
    let [first, ..] = values else {
        return String::new();
    };
    if values.len() == 1 {
        return String::new();
    }

    let mut prefix = parent(first);
    for value in values {
        let dir = directory(value);
        while !prefix.is_empty() && !dir.starts_with(prefix) {
            prefix = parent(prefix);
        }
        if prefix.is_empty() {
            break;
        }
    }

    prefix.to_string()
}

/// Longest common prefix of every file id in `graph`.
#[must_use]
pub fn longest_filename_prefix(graph: &FileGraph) -> String {
    let ids: Vec<&str> = graph.files().map(|f| f.id.as_str()).collect();
    longest_common_prefix(&ids)
}

/// Strip `prefix/` from the front of `id`. An empty prefix leaves `id` as is.
#[must_use]
pub fn trim_prefix<'a>(id: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return id;
    }
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(id)
}

/// Directory part including the trailing `/`, or `""`.
fn directory(value: &str) -> &str {
    value.rfind('/').map_or("", |pos| &value[..=pos])
}

/// Directory part without the trailing `/`.
fn parent(value: &str) -> &str {
    let dir = directory(value);
    dir.strip_suffix('/').unwrap_or(dir)
}
