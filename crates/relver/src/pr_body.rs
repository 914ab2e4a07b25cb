//! Markdown description for the release pull request.

use relver_release::{BumpType, VersionFileTarget};
use std::path::Path;

/// Render the pull request body.
///
/// Lists the version file, every YAML target with its path, and a helm-docs
/// line when helm-docs ran.
#[must_use]
pub fn generate_pr_body(
    version: &str,
    bump_type: BumpType,
    version_file: &Path,
    targets: &[VersionFileTarget],
    ran_helm_docs: bool,
) -> String {
    let mut body = format!("## Release v{version}\n\n");
    body.push_str("### Version Bump\n\n");
    body.push_str(&format!("**{bump_type}** release\n\n"));

    body.push_str("### Files Updated\n\n");
    body.push_str(&format!("- `{}`\n", version_file.display()));
    for target in targets {
        body.push_str(&format!(
            "- `{}` (path: `{}`)\n",
            target.file.display(),
            target.path
        ));
    }
    if ran_helm_docs {
        body.push_str("- Helm chart docs (via helm-docs)\n");
    }

    body.push_str("\n### Next Steps\n\n");
    body.push_str("1. Review this PR\n");
    body.push_str("2. Merge to main\n");
    body.push_str("3. Release automation will handle the rest\n\n");

    body.push_str("### Checklist\n\n");
    body.push_str("- [ ] Version bump is correct\n");
    body.push_str("- [ ] All CI checks pass\n");
    body
}
