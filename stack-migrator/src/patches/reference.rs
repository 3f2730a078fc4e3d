//! Patch references and their on-disk naming.

use crate::releases::CommitRecord;
use serde::Serialize;

/// One commit to download and apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchReference {
    /// Browser URL of the commit.
    pub source_url: String,

    /// Position in application order; also part of the file name.
    pub index: usize,

    /// Release tag the patch belongs to.
    pub tag: String,
}

impl PatchReference {
    /// File name of the downloaded patch: `<tag>-<index>.patch`.
    #[must_use]
    pub fn file_name(&self) -> String {
        patch_file_name(&self.tag, self.index)
    }
}

/// Builds `<tag>-<index>.patch`.
///
/// Path separators in the tag become `_` so the file stays in the
/// working directory.
#[must_use]
pub fn patch_file_name(tag: &str, index: usize) -> String {
    let tag: String = tag
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{tag}-{index}.patch")
}

/// Collects the commits a release introduces: the tag's own commit followed
/// by each of its parents, in discovery order.
#[must_use]
pub fn build_patch_references(commit: &CommitRecord, tag: &str) -> Vec<PatchReference> {
    let urls: Vec<String> = std::iter::once(commit.html_url.clone())
        .chain(commit.parents.iter().map(|parent| parent.html_url.clone()))
        .collect();
    assign_patch_indices(urls, tag)
}

/// Assigns each URL its application index: `count - 1 - position`.
///
/// References are discovered newest first, so the first URL (the tag's own
/// commit) gets the highest index and the last parent gets `0`. Applying in
/// ascending index order then replays oldest to newest.
#[must_use]
pub fn assign_patch_indices(urls: Vec<String>, tag: &str) -> Vec<PatchReference> {
    let count = urls.len();
    urls.into_iter()
        .enumerate()
        .map(|(position, source_url)| PatchReference {
            source_url,
            index: count - 1 - position,
            tag: tag.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releases::ParentRef;

    fn commit_with_parents(parents: usize) -> CommitRecord {
        CommitRecord {
            sha: "head".to_string(),
            node_id: "C_head".to_string(),
            html_url: "https://github.com/acme/tmpl/commit/head".to_string(),
            parents: (0..parents)
                .map(|i| ParentRef {
                    sha: format!("p{i}"),
                    url: format!("https://api.github.com/repos/acme/tmpl/commits/p{i}"),
                    html_url: format!("https://github.com/acme/tmpl/commit/p{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn own_commit_gets_highest_index() {
        for parents in 0..4 {
            let commit = commit_with_parents(parents);
            let references = build_patch_references(&commit, "v2");

            assert_eq!(references.len(), parents + 1);
            assert_eq!(references[0].source_url, commit.html_url);
            assert_eq!(references[0].index, parents);
            assert_eq!(references.last().unwrap().index, 0);

            let mut indices: Vec<usize> = references.iter().map(|r| r.index).collect();
            indices.sort_unstable();
            assert_eq!(indices, (0..=parents).collect::<Vec<_>>());
        }
    }

    #[test]
    fn last_parent_is_applied_first() {
        let commit = commit_with_parents(2);
        let references = build_patch_references(&commit, "v2");

        let first_applied = references.iter().find(|r| r.index == 0).unwrap();
        assert_eq!(
            first_applied.source_url,
            "https://github.com/acme/tmpl/commit/p1"
        );
    }

    #[test]
    fn file_names_follow_tag_and_index() {
        let references = build_patch_references(&commit_with_parents(1), "v2");
        let names: Vec<String> = references.iter().map(PatchReference::file_name).collect();
        assert_eq!(names, vec!["v2-1.patch", "v2-0.patch"]);
    }

    #[test]
    fn file_names_flatten_path_separators() {
        assert_eq!(patch_file_name("release/v1.2", 0), "release_v1.2-0.patch");
    }
}
