//! Object key layout.
//!
//! Every key a room owns lives under `{room}/`. A file's key is the room
//! prefix, the names of its ancestor folders, and its own name, joined by
//! `/`. Folders have no object of their own; an empty folder is kept
//! visible by a marker object named [`MARKER_NAME`].

use websharex_entity::entry::MARKER_NAME;

/// Prefix owning every object of a room.
pub fn room_prefix(room: &str) -> String {
    format!("{room}/")
}

/// Key of a file named `name` inside the folder at `segments`.
pub fn object_key(room: &str, segments: &[String], name: &str) -> String {
    let mut key = folder_prefix(room, segments);
    key.push_str(name);
    key
}

/// Prefix owning every object below the folder at `segments`.
pub fn folder_prefix(room: &str, segments: &[String]) -> String {
    let mut prefix = room_prefix(room);
    for segment in segments {
        prefix.push_str(segment);
        prefix.push('/');
    }
    prefix
}

/// Key of the marker object of the folder at `segments`.
pub fn marker_key(room: &str, segments: &[String]) -> String {
    object_key(room, segments, MARKER_NAME)
}

/// Strip the room prefix. Returns `None` for keys outside the room.
pub fn relative_key<'a>(room: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(room)?.strip_prefix('/')
}

/// Whether a relative or full key names a marker object. A directory
/// placeholder (a key ending in `/`) is a marker too.
pub fn is_marker(key: &str) -> bool {
    key.ends_with('/') || key.rsplit('/').next() == Some(MARKER_NAME)
}

/// Replace the last segment of a key, keeping its folder prefix.
pub fn sibling_key(key: &str, name: &str) -> String {
    match key.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(room_prefix("demo"), "demo/");
        assert_eq!(object_key("demo", &[], "f1.txt"), "demo/f1.txt");
        assert_eq!(object_key("demo", &segs(&["docs", "2024"]), "f2.txt"), "demo/docs/2024/f2.txt");
        assert_eq!(folder_prefix("demo", &segs(&["docs"])), "demo/docs/");
        assert_eq!(marker_key("demo", &segs(&["docs"])), "demo/docs/.keepfolder");
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(relative_key("demo", "demo/docs/f2.txt"), Some("docs/f2.txt"));
        assert_eq!(relative_key("demo", "demo2/f.txt"), None);
        assert_eq!(relative_key("demo", "other/f.txt"), None);
    }

    #[test]
    fn test_marker_and_sibling_keys() {
        assert!(is_marker("docs/.keepfolder"));
        assert!(is_marker(".keepfolder"));
        assert!(is_marker("docs/"));
        assert!(is_marker("docs/2024/"));
        assert!(!is_marker("docs/keepfolder.txt"));
        assert_eq!(sibling_key("demo/docs/a.txt", "b.txt"), "demo/docs/b.txt");
        assert_eq!(sibling_key("a.txt", "b.txt"), "b.txt");
    }
}
