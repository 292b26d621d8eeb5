use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::intake::upload::safe_component;

/// Caller id used when a request does not name one.
pub const ANONYMOUS_CALLER: &str = "anonymous";

/// Characters of the readable prefix kept in a folder name.
const FOLDER_PREFIX_LEN: usize = 32;

/// The authenticated requester and their private storage folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: String,
    folder: PathBuf,
}

impl CallerContext {
    /// The folder is `storage_root/<folder name>`; see [`folder_name`].
    pub fn new(user_id: impl Into<String>, storage_root: &Path) -> Self {
        let user_id = user_id.into();
        let folder = storage_root.join(folder_name(&user_id));
        Self { user_id, folder }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Caller-scoped storage root
    pub fn folder_path(&self) -> &Path {
        &self.folder
    }
}

/// One path component per caller id.
///
/// The SHA-256 of the raw id keeps distinct ids in distinct folders; the
/// sanitized id, when anything survives, is kept in front for readability.
pub fn folder_name(user_id: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(user_id.as_bytes()));
    let digest = &digest[..32];
    match safe_component(user_id) {
        Some(stem) => {
            let stem: String = stem.chars().take(FOLDER_PREFIX_LEN).collect();
            format!("{}-{}", stem, digest)
        }
        None => digest.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_folder_under_storage_root() {
        let caller = CallerContext::new("alice", Path::new("/srv/netgate"));
        assert_eq!(caller.user_id(), "alice");
        assert_eq!(caller.folder_path().parent(), Some(Path::new("/srv/netgate")));

        let name = caller.folder_path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("alice-"), "{}", name);
    }

    #[test]
    fn test_folder_is_stable() {
        let root = Path::new("/srv/netgate");
        assert_eq!(
            CallerContext::new("alice", root).folder_path(),
            CallerContext::new("alice", root).folder_path()
        );
    }

    #[test]
    fn test_hostile_user_id_cannot_escape() {
        let caller = CallerContext::new("../../root", Path::new("/srv/netgate"));
        assert_eq!(caller.folder_path().parent(), Some(Path::new("/srv/netgate")));
        let name = caller.folder_path().file_name().unwrap().to_str().unwrap();
        assert!(!name.contains('/') && !name.starts_with('.'));
    }

    #[test]
    fn test_distinct_ids_get_distinct_folders() {
        let root = Path::new("/srv/netgate");
        let ids = ["山田", "佐藤", "upload", "a/b", "a b", "a_b", "", "..", "anonymous"];

        let folders: HashSet<PathBuf> = ids
            .iter()
            .map(|id| CallerContext::new(*id, root).folder_path().to_path_buf())
            .collect();
        assert_eq!(folders.len(), ids.len());
        assert!(folders.iter().all(|f| f.parent() == Some(root)));
    }

    #[test]
    fn test_non_ascii_id_uses_digest_only() {
        let name = folder_name("山田");
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_long_id_stays_short() {
        let name = folder_name(&"z".repeat(500));
        assert_eq!(name.len(), FOLDER_PREFIX_LEN + 1 + 32);
    }
}
