// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Human-readable output

use std::fmt::Write;

use vr_credentials::ValidateResult;
use vr_domain_types::{ChangedFile, CodeReview, Commit, Directory, EntryKind, Ref, RouterState};

pub fn router_state(state: &RouterState, external_link: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "page:   {}", state.page_type);
    let _ = writeln!(out, "repo:   {}", state.repo);
    let fields = [
        ("ref", state.git_ref.as_deref()),
        ("path", state.file_path.as_deref()),
        ("commit", state.commit_sha.as_deref()),
        ("review", state.code_review_id.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<7} {}", format!("{}:", label), value);
        }
    }
    if let (Some(start), Some(end)) = (state.start_line, state.end_line) {
        let _ = writeln!(out, "lines:  {}-{}", start, end);
    }
    let _ = writeln!(out, "link:   {}", external_link);
    out
}

pub fn directory(directory: &Directory) -> String {
    let mut out = String::new();
    for entry in &directory.entries {
        let marker = match entry.kind {
            EntryKind::Directory => "/",
            EntryKind::Submodule => "@",
            EntryKind::File => "",
        };
        let size = entry.size.map(|s| s.to_string()).unwrap_or_default();
        let _ = writeln!(out, "{:>10}  {}{}", size, entry.name(), marker);
    }
    if directory.truncated {
        out.push_str("(listing truncated by the provider)\n");
    }
    out
}

pub fn refs(refs: &[Ref]) -> String {
    refs.iter()
        .map(|r| format!("{}  {}\n", short_sha(&r.commit_sha), r.name))
        .collect()
}

pub fn commits(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(|c| {
            format!(
                "{}  {}  {}\n",
                short_sha(&c.sha),
                c.author_name,
                c.message.lines().next().unwrap_or_default()
            )
        })
        .collect()
}

pub fn commit(commit: &Commit, files: &[ChangedFile]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "commit {}", commit.sha);
    let _ = writeln!(out, "Author: {} <{}>", commit.author_name, commit.author_email);
    if let Some(created_at) = commit.created_at {
        let _ = writeln!(out, "Date:   {}", created_at.to_rfc3339());
    }
    if !commit.parent_shas.is_empty() {
        let _ = writeln!(out, "Parents: {}", commit.parent_shas.join(" "));
    }
    out.push('\n');
    for line in commit.message.lines() {
        let _ = writeln!(out, "    {}", line);
    }
    if !files.is_empty() {
        out.push('\n');
        out.push_str(&changed_files(files));
    }
    out
}

pub fn changed_files(files: &[ChangedFile]) -> String {
    files
        .iter()
        .map(|f| match &f.previous_path {
            Some(previous) => format!("{:<9} {} -> {}\n", f.status, previous, f.path),
            None => format!("{:<9} {}\n", f.status, f.path),
        })
        .collect()
}

pub fn reviews(reviews: &[CodeReview]) -> String {
    reviews
        .iter()
        .map(|r| format!("#{:<6} {:<7} {}  ({})\n", r.id, r.state.to_string(), r.title, r.creator))
        .collect()
}

pub fn review(review: &CodeReview, files: &[ChangedFile]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", review.id, review.title);
    let _ = writeln!(out, "state:  {}", review.state);
    let _ = writeln!(out, "author: {}", review.creator);
    let _ = writeln!(
        out,
        "branch: {} -> {}",
        review.source_branch, review.target_branch
    );
    if !files.is_empty() {
        out.push('\n');
        out.push_str(&changed_files(files));
    }
    out
}

pub fn validation(result: Option<&ValidateResult>) -> String {
    let Some(result) = result else {
        return "token is not valid\n".to_string();
    };
    let mut out = format!("valid token for {}\n", result.username);
    if let Some(rate) = &result.rate_limit {
        if let (Some(remaining), Some(limit)) = (rate.remaining, rate.limit) {
            let _ = writeln!(out, "rate limit: {}/{} remaining", remaining, limit);
        }
    }
    out
}

fn short_sha(sha: &str) -> &str {
    sha.get(..10).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vr_domain_types::{DirectoryEntry, PageType};

    #[test]
    fn test_router_state_lists_only_present_fields() {
        let state = RouterState::new(PageType::Blob, "o/r")
            .with_ref("main")
            .with_file_path("src/lib.rs")
            .with_lines(3, 7);
        let text = router_state(&state, "https://gitcode.com/o/r/blob/main/src/lib.rs");

        assert!(text.contains("page:   blob"));
        assert!(text.contains("ref:    main"));
        assert!(text.contains("path:   src/lib.rs"));
        assert!(text.contains("lines:  3-7"));
        assert!(!text.contains("commit:"));
    }

    #[test]
    fn test_directory_marks_kinds() {
        let listing = Directory {
            entries: vec![
                DirectoryEntry::directory("src"),
                DirectoryEntry::file("README.md", Some(42)),
                DirectoryEntry::submodule("vendor/lib", None),
            ],
            truncated: true,
        };
        let text = directory(&listing);

        assert!(text.contains("src/"));
        assert!(text.contains("        42  README.md\n"));
        assert!(text.contains("lib@"));
        assert!(text.ends_with("(listing truncated by the provider)\n"));
    }

    #[test]
    fn test_refs_shorten_sha() {
        let text = refs(&[Ref {
            name: "main".to_string(),
            commit_sha: "0123456789abcdef".to_string(),
        }]);
        assert_eq!(text, "0123456789  main\n");
    }

    #[test]
    fn test_invalid_token_message() {
        assert_eq!(validation(None), "token is not valid\n");
    }
}
